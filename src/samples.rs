// 🎲 Sample Rows - Demo transactions and applicants
// Shaped like the uploads the fraud and credit endpoints expect

use crate::records::{round_to, Record};
use chrono::{Duration, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;

const MERCHANTS: [&str; 8] = [
    "Amazon",
    "Walmart",
    "Target",
    "Best Buy",
    "Apple Store",
    "Unknown Merchant",
    "Foreign ATM",
    "Gas Station",
];

const CATEGORIES: [&str; 8] = ["electronics", "grocery", "gas", "restaurant", "online", "atm", "jewelry", "gift_cards"];

/// The last two entries only appear on fraud-shaped rows
const LOCATIONS: [&str; 7] = ["New York", "Los Angeles", "Chicago", "Houston", "Phoenix", "Unknown", "Foreign"];

const CARD_TYPES: [&str; 4] = ["Visa", "Mastercard", "Amex", "Discover"];

fn pick<'a, R: Rng>(rng: &mut R, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

/// Card transactions from the past week; roughly 15% look fraudulent
pub fn sample_transactions<R: Rng>(rng: &mut R, count: usize) -> Vec<Record> {
    let now = Utc::now();

    (0..count)
        .map(|i| {
            let is_fraud = rng.random::<f64>() > 0.85;
            let base_amount = if is_fraud {
                rng.random::<f64>() * 8000.0 + 500.0
            } else {
                rng.random::<f64>() * 500.0 + 10.0
            };

            let location = if is_fraud && rng.random_bool(0.5) {
                "Foreign"
            } else {
                pick(rng, &LOCATIONS[..LOCATIONS.len() - 2])
            };

            let seconds_ago = rng.random_range(0..7 * 24 * 60 * 60);
            let time = now - Duration::seconds(seconds_ago);

            Record::new()
                .with("id", format!("TXN-{:05}", i + 1))
                .with("amount", round_to(base_amount, 2))
                .with("merchant", pick(rng, &MERCHANTS))
                .with("category", pick(rng, &CATEGORIES))
                .with("location", location)
                .with("time", time.to_rfc3339())
                .with("cardType", pick(rng, &CARD_TYPES))
                .with("cardLast4", rng.random_range(1000..10000).to_string())
        })
        .collect()
}

/// Loan applicants; roughly 60% have a good credit profile
pub fn sample_applicants<R: Rng>(rng: &mut R, count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let good = rng.random::<f64>() > 0.4;
            let mut unit = || rng.random::<f64>();

            let income = if good {
                60_000.0 + unit() * 80_000.0
            } else {
                25_000.0 + unit() * 40_000.0
            };
            let loan_amount = 10_000.0 + unit() * 40_000.0;
            let employment = if good { 3.0 + unit() * 15.0 } else { unit() * 5.0 };
            let history = if good {
                650.0 + unit() * 150.0
            } else {
                500.0 + unit() * 150.0
            };
            let dti = if good {
                0.15 + unit() * 0.2
            } else {
                0.3 + unit() * 0.3
            };
            let age_of_credit = if good { 5.0 + unit() * 15.0 } else { unit() * 5.0 };
            let accounts = 2.0 + unit() * 8.0;

            Record::new()
                .with("id", format!("APP-{:05}", i + 1))
                .with("income", income.round() as i64)
                .with("loanAmount", loan_amount.round() as i64)
                .with("employmentLength", employment.round() as i64)
                .with("creditHistory", history.round() as i64)
                .with("debtToIncome", round_to(dti, 2))
                .with("ageOfCredit", age_of_credit.round() as i64)
                .with("numAccounts", accounts.round() as i64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fraud::transaction_hour;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sample_transactions_shape() {
        let mut rng = StdRng::seed_from_u64(21);
        let rows = sample_transactions(&mut rng, 30);

        assert_eq!(rows.len(), 30);
        assert_eq!(rows[0].id(), Some("TXN-00001".to_string()));
        assert_eq!(rows[29].id(), Some("TXN-00030".to_string()));

        for row in &rows {
            let amount = row.number("amount").unwrap();
            assert!((10.0..=8500.0).contains(&amount));
            assert!(transaction_hour(row).is_some());
            assert_eq!(row.text("cardLast4").len(), 4);
            assert_ne!(row.text("location"), "Unknown");
        }
    }

    #[test]
    fn test_sample_applicants_shape() {
        let mut rng = StdRng::seed_from_u64(22);
        let rows = sample_applicants(&mut rng, 25);

        assert_eq!(rows.len(), 25);
        assert_eq!(rows[4].id(), Some("APP-00005".to_string()));
        for row in &rows {
            let history = row.number("creditHistory").unwrap();
            assert!((500.0..=800.0).contains(&history));
            let dti = row.number("debtToIncome").unwrap();
            assert!((0.15..=0.6).contains(&dti));
        }
    }
}
