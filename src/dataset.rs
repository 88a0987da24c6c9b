// 🏦 Home Credit Dataset - Entities + synthetic generator
// Mirrors the Kaggle "Home Credit Default Risk" tables the dashboard works with

use crate::records::{round_to, RiskLevel};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// `DAYS_EMPLOYED` value the dataset uses for "not employed"
pub const UNEMPLOYED_MARKER: i64 = 365243;

pub const FIRST_APPLICATION_ID: i64 = 100_000;

pub const DEFAULT_APPLICATION_COUNT: usize = 100;
pub const DEFAULT_BUREAU_COUNT: usize = 5;
pub const DEFAULT_PREVIOUS_COUNT: usize = 3;

// ============================================================================
// ENTITIES
// ============================================================================

/// One row of `application_train` plus derived analysis columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct HomeCreditApplication {
    pub sk_id_curr: i64,
    /// 1 = defaulted, 0 = repaid
    pub target: u8,
    pub name_contract_type: String,
    pub code_gender: String,
    pub flag_own_car: String,
    pub flag_own_realty: String,
    pub cnt_children: u32,
    pub amt_income_total: f64,
    pub amt_credit: f64,
    pub amt_annuity: f64,
    pub amt_goods_price: f64,
    pub name_income_type: String,
    pub name_education_type: String,
    pub name_family_status: String,
    pub name_housing_type: String,
    pub days_birth: i64,
    pub days_employed: i64,
    pub days_registration: i64,
    pub occupation_type: String,
    pub cnt_fam_members: u32,
    pub ext_source_1: f64,
    pub ext_source_2: f64,
    pub ext_source_3: f64,
    pub days_last_phone_change: i64,

    // Derived fields
    pub age_years: i64,
    pub employed_years: i64,
    pub credit_income_ratio: f64,
    pub annuity_income_ratio: f64,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BureauRecord {
    pub sk_id_curr: i64,
    pub sk_id_bureau: i64,
    pub credit_active: String,
    pub credit_currency: String,
    pub days_credit: i64,
    pub credit_day_overdue: i64,
    pub amt_credit_max_overdue: f64,
    pub cnt_credit_prolong: u32,
    pub amt_credit_sum: f64,
    pub amt_credit_sum_debt: f64,
    pub amt_credit_sum_limit: f64,
    pub amt_credit_sum_overdue: f64,
    pub credit_type: String,
    pub days_credit_enddate: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PreviousApplication {
    pub sk_id_curr: i64,
    pub sk_id_prev: i64,
    pub name_contract_type: String,
    pub amt_annuity: f64,
    pub amt_application: f64,
    pub amt_credit: f64,
    pub amt_down_payment: f64,
    pub amt_goods_price: f64,
    pub name_contract_status: String,
    pub days_decision: i64,
    pub name_payment_type: String,
    pub code_reject_reason: Option<String>,
    pub name_client_type: String,
    pub name_goods_category: String,
    pub name_product_type: String,
    pub cnt_payment: u32,
}

// ============================================================================
// DEFAULT RISK SCORE
// ============================================================================

/// Inputs of the 0-100 default-risk composite
#[derive(Debug, Clone, Copy)]
pub struct RiskFactors {
    pub credit_income_ratio: f64,
    pub annuity_income_ratio: f64,
    pub employed_years: i64,
    pub age_years: i64,
    pub ext_sources: [f64; 3],
}

/// Weighted threshold composite, higher = riskier, capped at 100
pub fn default_risk_score(f: &RiskFactors) -> u32 {
    let mut score = 0;

    score += if f.credit_income_ratio > 5.0 {
        25
    } else if f.credit_income_ratio > 3.0 {
        15
    } else {
        5
    };

    score += if f.annuity_income_ratio > 0.5 {
        20
    } else if f.annuity_income_ratio > 0.3 {
        10
    } else {
        5
    };

    score += if f.employed_years < 1 {
        20
    } else if f.employed_years < 3 {
        10
    } else {
        0
    };

    score += if f.age_years < 25 {
        15
    } else if f.age_years > 60 {
        10
    } else {
        0
    };

    for ext in f.ext_sources {
        score += if ext < 0.3 {
            15
        } else if ext < 0.5 {
            8
        } else {
            0
        };
    }

    score.min(100)
}

pub fn risk_level_for_score(score: u32) -> RiskLevel {
    if score < 30 {
        RiskLevel::Low
    } else if score < 60 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

// ============================================================================
// CATEGORICAL VOCABULARY
// ============================================================================

pub const CONTRACT_TYPES: [&str; 2] = ["Cash loans", "Revolving loans"];

pub const INCOME_TYPES: [&str; 8] = [
    "Working",
    "Commercial associate",
    "Pensioner",
    "State servant",
    "Student",
    "Unemployed",
    "Maternity leave",
    "Businessman",
];

pub const EDUCATION_TYPES: [&str; 5] = [
    "Secondary / secondary special",
    "Higher education",
    "Incomplete higher",
    "Lower secondary",
    "Academic degree",
];

pub const FAMILY_STATUS: [&str; 5] = ["Married", "Single / not married", "Civil marriage", "Separated", "Widow"];

pub const HOUSING_TYPES: [&str; 6] = [
    "House / apartment",
    "With parents",
    "Municipal apartment",
    "Rented apartment",
    "Office apartment",
    "Co-op apartment",
];

pub const OCCUPATION_TYPES: [&str; 18] = [
    "Laborers",
    "Core staff",
    "Sales staff",
    "Managers",
    "Drivers",
    "High skill tech staff",
    "Accountants",
    "Medicine staff",
    "Security staff",
    "Cooking staff",
    "Cleaning staff",
    "Private service staff",
    "Low-skill Laborers",
    "Secretaries",
    "Waiters/barmen staff",
    "HR staff",
    "Realty agents",
    "IT staff",
];

pub const CREDIT_TYPES: [&str; 5] = ["Consumer credit", "Credit card", "Mortgage", "Car loan", "Microloan"];

pub const CONTRACT_STATUS: [&str; 4] = ["Approved", "Canceled", "Refused", "Unused offer"];

pub const REJECT_REASONS: [&str; 8] = ["XAP", "LIMIT", "SCO", "HC", "VERIF", "CLIENT", "SCOFR", "XNA"];

pub const CLIENT_TYPES: [&str; 3] = ["Repeater", "New", "Refreshed"];

pub const PRODUCT_TYPES: [&str; 3] = ["x-sell", "walk-in", "XNA"];

pub const GOODS_CATEGORIES: [&str; 10] = [
    "XNA",
    "Mobile",
    "Consumer Electronics",
    "Computers",
    "Audio/Video",
    "Furniture",
    "Construction Materials",
    "Clothing and Accessories",
    "Auto Accessories",
    "Medical Supplies",
];

// ============================================================================
// GENERATORS
// ============================================================================

fn choice<R: Rng>(rng: &mut R, options: &[&str]) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}

/// Uniform float in [min, max) rounded to `decimals`
fn random_float<R: Rng>(rng: &mut R, min: f64, max: f64, decimals: i32) -> f64 {
    round_to(rng.random_range(min..max), decimals)
}

fn chance<R: Rng>(rng: &mut R, threshold: f64) -> bool {
    rng.random::<f64>() > threshold
}

/// Synthetic `application_train` rows with derived risk columns
pub fn generate_applications<R: Rng>(rng: &mut R, count: usize) -> Vec<HomeCreditApplication> {
    (0..count)
        .map(|i| generate_application(rng, FIRST_APPLICATION_ID + i as i64))
        .collect()
}

fn generate_application<R: Rng>(rng: &mut R, sk_id_curr: i64) -> HomeCreditApplication {
    let income = rng.random_range(20_000..=500_000) as f64;
    let credit = rng.random_range(50_000..=2_000_000) as f64;
    let annuity = (credit / rng.random_range(12..=60) as f64).round();
    let goods_price = (credit * random_float(rng, 0.8, 1.0, 2)).round();

    // 20-70 years old
    let days_birth = -rng.random_range(7_300..=25_550i64);
    let days_employed = if chance(rng, 0.1) {
        let max_days = (-days_birth - 6_570).min(15_000);
        -rng.random_range(30..=max_days)
    } else {
        UNEMPLOYED_MARKER
    };

    let ext_sources = [
        random_float(rng, 0.0, 1.0, 4),
        random_float(rng, 0.0, 1.0, 4),
        random_float(rng, 0.0, 1.0, 4),
    ];

    let credit_income_ratio = credit / income;
    let annuity_income_ratio = annuity / income;
    let age_years = (days_birth as f64 / 365.0).round().abs() as i64;
    let employed_years = if days_employed == UNEMPLOYED_MARKER {
        0
    } else {
        (days_employed as f64 / 365.0).round().abs() as i64
    };

    let risk_score = default_risk_score(&RiskFactors {
        credit_income_ratio,
        annuity_income_ratio,
        employed_years,
        age_years,
        ext_sources,
    });

    let target = if risk_score > 60 {
        chance(rng, 0.3)
    } else {
        chance(rng, 0.92)
    };

    HomeCreditApplication {
        sk_id_curr,
        target: u8::from(target),
        name_contract_type: choice(rng, &CONTRACT_TYPES),
        code_gender: if chance(rng, 0.35) { "F" } else { "M" }.to_string(),
        flag_own_car: if chance(rng, 0.6) { "Y" } else { "N" }.to_string(),
        flag_own_realty: if chance(rng, 0.3) { "Y" } else { "N" }.to_string(),
        cnt_children: rng.random_range(0..=4),
        amt_income_total: income,
        amt_credit: credit,
        amt_annuity: annuity,
        amt_goods_price: goods_price,
        name_income_type: choice(rng, &INCOME_TYPES),
        name_education_type: choice(rng, &EDUCATION_TYPES),
        name_family_status: choice(rng, &FAMILY_STATUS),
        name_housing_type: choice(rng, &HOUSING_TYPES),
        days_birth,
        days_employed,
        days_registration: -rng.random_range(365..=10_000i64),
        occupation_type: choice(rng, &OCCUPATION_TYPES),
        cnt_fam_members: rng.random_range(1..=6),
        ext_source_1: ext_sources[0],
        ext_source_2: ext_sources[1],
        ext_source_3: ext_sources[2],
        days_last_phone_change: -rng.random_range(0..=3_650i64),
        age_years,
        employed_years,
        credit_income_ratio: round_to(credit_income_ratio, 2),
        annuity_income_ratio: round_to(annuity_income_ratio, 4),
        risk_score,
        risk_level: risk_level_for_score(risk_score),
    }
}

/// Credit-bureau history rows for one applicant
pub fn generate_bureau_records<R: Rng>(rng: &mut R, sk_id_curr: i64, count: usize) -> Vec<BureauRecord> {
    (0..count)
        .map(|i| {
            let credit_sum = rng.random_range(10_000..=500_000);
            let credit_debt = if chance(rng, 0.3) {
                rng.random_range(0..=credit_sum)
            } else {
                0
            };

            BureauRecord {
                sk_id_curr,
                sk_id_bureau: 5_000_000 + sk_id_curr * 10 + i as i64,
                credit_active: if chance(rng, 0.4) { "Active" } else { "Closed" }.to_string(),
                credit_currency: "currency 1".to_string(),
                days_credit: -rng.random_range(30..=3_650i64),
                credit_day_overdue: if chance(rng, 0.85) {
                    rng.random_range(1..=90)
                } else {
                    0
                },
                amt_credit_max_overdue: if chance(rng, 0.8) {
                    rng.random_range(1_000..=50_000) as f64
                } else {
                    0.0
                },
                cnt_credit_prolong: if chance(rng, 0.9) {
                    rng.random_range(1..=3)
                } else {
                    0
                },
                amt_credit_sum: credit_sum as f64,
                amt_credit_sum_debt: credit_debt as f64,
                amt_credit_sum_limit: if chance(rng, 0.5) {
                    rng.random_range(50_000..=200_000) as f64
                } else {
                    0.0
                },
                amt_credit_sum_overdue: if chance(rng, 0.9) {
                    rng.random_range(1_000..=20_000) as f64
                } else {
                    0.0
                },
                credit_type: choice(rng, &CREDIT_TYPES),
                days_credit_enddate: rng.random_range(-365..=1_825),
            }
        })
        .collect()
}

/// Earlier loan applications for one applicant
pub fn generate_previous_applications<R: Rng>(
    rng: &mut R,
    sk_id_curr: i64,
    count: usize,
) -> Vec<PreviousApplication> {
    (0..count)
        .map(|i| {
            let credit = rng.random_range(30_000..=800_000) as f64;
            let status = choice(rng, &CONTRACT_STATUS);
            let code_reject_reason = if status == "Refused" {
                Some(choice(rng, &REJECT_REASONS))
            } else {
                None
            };

            PreviousApplication {
                sk_id_curr,
                sk_id_prev: 1_000_000 + sk_id_curr * 10 + i as i64,
                name_contract_type: choice(rng, &CONTRACT_TYPES),
                amt_annuity: (credit / rng.random_range(12..=48) as f64).round(),
                amt_application: credit,
                amt_credit: (credit * random_float(rng, 0.9, 1.1, 2)).round(),
                amt_down_payment: (credit * random_float(rng, 0.0, 0.2, 2)).round(),
                amt_goods_price: (credit * random_float(rng, 0.85, 1.0, 2)).round(),
                name_contract_status: status,
                days_decision: -rng.random_range(30..=2_000i64),
                name_payment_type: if chance(rng, 0.5) {
                    "Cash through the bank"
                } else {
                    "XNA"
                }
                .to_string(),
                code_reject_reason,
                name_client_type: choice(rng, &CLIENT_TYPES),
                name_goods_category: choice(rng, &GOODS_CATEGORIES),
                name_product_type: choice(rng, &PRODUCT_TYPES),
                cnt_payment: rng.random_range(6..=60),
            }
        })
        .collect()
}

/// A full synthetic dataset: applications plus their bureau and previous-application rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDataset {
    pub applications: Vec<HomeCreditApplication>,
    pub bureau_records: Vec<BureauRecord>,
    pub previous_apps: Vec<PreviousApplication>,
}

pub fn generate_dataset<R: Rng>(rng: &mut R, count: usize) -> GeneratedDataset {
    let applications = generate_applications(rng, count);
    let mut bureau_records = Vec::with_capacity(count * DEFAULT_BUREAU_COUNT);
    let mut previous_apps = Vec::with_capacity(count * DEFAULT_PREVIOUS_COUNT);

    for app in &applications {
        bureau_records.extend(generate_bureau_records(rng, app.sk_id_curr, DEFAULT_BUREAU_COUNT));
        previous_apps.extend(generate_previous_applications(rng, app.sk_id_curr, DEFAULT_PREVIOUS_COUNT));
    }

    GeneratedDataset {
        applications,
        bureau_records,
        previous_apps,
    }
}

// ============================================================================
// REFERENCE DATA (published competition statistics)
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeShare {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenderDistribution {
    pub male: f64,
    pub female: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStats {
    pub total_applications: u32,
    pub train_applications: u32,
    pub test_applications: u32,
    pub default_rate: f64,
    pub avg_income: f64,
    pub avg_credit: f64,
    pub avg_annuity: f64,
    pub gender_distribution: GenderDistribution,
    pub own_car_rate: f64,
    pub own_realty_rate: f64,
    pub avg_age: f64,
    pub avg_employment_years: f64,
    pub top_income_types: &'static [TypeShare],
    pub top_education_types: &'static [TypeShare],
}

pub const DATASET_STATS: DatasetStats = DatasetStats {
    total_applications: 307_511,
    train_applications: 307_511,
    test_applications: 48_744,
    default_rate: 0.0807,
    avg_income: 168_797.9,
    avg_credit: 599_025.9,
    avg_annuity: 27_108.5,
    gender_distribution: GenderDistribution { male: 0.34, female: 0.66 },
    own_car_rate: 0.34,
    own_realty_rate: 0.69,
    avg_age: 43.9,
    avg_employment_years: 6.2,
    top_income_types: &[
        TypeShare { kind: "Working", percentage: 52.0 },
        TypeShare { kind: "Commercial associate", percentage: 23.2 },
        TypeShare { kind: "Pensioner", percentage: 18.0 },
        TypeShare { kind: "State servant", percentage: 6.3 },
    ],
    top_education_types: &[
        TypeShare { kind: "Secondary / secondary special", percentage: 71.0 },
        TypeShare { kind: "Higher education", percentage: 24.3 },
        TypeShare { kind: "Incomplete higher", percentage: 3.3 },
        TypeShare { kind: "Lower secondary", percentage: 1.2 },
    ],
};

#[derive(Debug, Clone, Serialize)]
pub struct FeatureWeight {
    pub feature: &'static str,
    pub importance: f64,
    pub description: &'static str,
}

/// Feature importance reported by winning competition solutions
pub const FEATURE_IMPORTANCE: [FeatureWeight; 15] = [
    FeatureWeight { feature: "EXT_SOURCE_2", importance: 0.156, description: "External source score 2 (credit bureau)" },
    FeatureWeight { feature: "EXT_SOURCE_3", importance: 0.142, description: "External source score 3 (credit bureau)" },
    FeatureWeight { feature: "EXT_SOURCE_1", importance: 0.098, description: "External source score 1 (credit bureau)" },
    FeatureWeight { feature: "DAYS_BIRTH", importance: 0.067, description: "Client age in days" },
    FeatureWeight { feature: "DAYS_EMPLOYED", importance: 0.058, description: "Employment duration in days" },
    FeatureWeight { feature: "AMT_CREDIT", importance: 0.045, description: "Credit amount of the loan" },
    FeatureWeight { feature: "AMT_ANNUITY", importance: 0.042, description: "Loan annuity" },
    FeatureWeight { feature: "AMT_GOODS_PRICE", importance: 0.038, description: "Price of goods for which loan is given" },
    FeatureWeight { feature: "DAYS_REGISTRATION", importance: 0.033, description: "Days since client changed registration" },
    FeatureWeight { feature: "DAYS_ID_PUBLISH", importance: 0.031, description: "Days since ID document was published" },
    FeatureWeight { feature: "AMT_INCOME_TOTAL", importance: 0.029, description: "Income of the client" },
    FeatureWeight { feature: "REGION_POPULATION_RELATIVE", importance: 0.025, description: "Normalized population of region" },
    FeatureWeight { feature: "CREDIT_INCOME_RATIO", importance: 0.024, description: "Ratio of credit to income" },
    FeatureWeight { feature: "ANNUITY_INCOME_RATIO", importance: 0.022, description: "Ratio of annuity to income" },
    FeatureWeight { feature: "DAYS_LAST_PHONE_CHANGE", importance: 0.019, description: "Days since phone change" },
];

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn factors() -> RiskFactors {
        RiskFactors {
            credit_income_ratio: 2.0,
            annuity_income_ratio: 0.1,
            employed_years: 10,
            age_years: 40,
            ext_sources: [0.8, 0.8, 0.8],
        }
    }

    #[test]
    fn test_risk_score_minimum() {
        // only the two "else 5" bands contribute
        assert_eq!(default_risk_score(&factors()), 10);
    }

    #[test]
    fn test_risk_score_bands() {
        let mut f = factors();
        f.credit_income_ratio = 4.0;
        f.annuity_income_ratio = 0.4;
        f.employed_years = 2;
        f.age_years = 65;
        f.ext_sources = [0.4, 0.9, 0.2];
        // 15 + 10 + 10 + 10 + 8 + 0 + 15
        assert_eq!(default_risk_score(&f), 68);
    }

    #[test]
    fn test_risk_score_is_capped() {
        let f = RiskFactors {
            credit_income_ratio: 9.0,
            annuity_income_ratio: 0.9,
            employed_years: 0,
            age_years: 21,
            ext_sources: [0.1, 0.1, 0.1],
        };
        // 25 + 20 + 20 + 15 + 45 = 125
        assert_eq!(default_risk_score(&f), 100);
    }

    #[test]
    fn test_risk_level_bands() {
        assert_eq!(risk_level_for_score(29), RiskLevel::Low);
        assert_eq!(risk_level_for_score(30), RiskLevel::Medium);
        assert_eq!(risk_level_for_score(59), RiskLevel::Medium);
        assert_eq!(risk_level_for_score(60), RiskLevel::High);
    }

    #[test]
    fn test_generated_applications_are_consistent() {
        let mut rng = StdRng::seed_from_u64(42);
        let apps = generate_applications(&mut rng, 200);

        assert_eq!(apps.len(), 200);
        assert_eq!(apps[0].sk_id_curr, FIRST_APPLICATION_ID);
        assert_eq!(apps[199].sk_id_curr, FIRST_APPLICATION_ID + 199);

        for app in &apps {
            assert!(app.risk_score <= 100);
            assert_eq!(app.risk_level, risk_level_for_score(app.risk_score));
            assert!((20..=70).contains(&app.age_years));
            assert!((20_000.0..=500_000.0).contains(&app.amt_income_total));
            assert!(app.target <= 1);
            if app.days_employed == UNEMPLOYED_MARKER {
                assert_eq!(app.employed_years, 0);
            } else {
                assert!(app.days_employed < 0);
            }
            for ext in [app.ext_source_1, app.ext_source_2, app.ext_source_3] {
                assert!((0.0..=1.0).contains(&ext));
            }
        }
    }

    #[test]
    fn test_generation_is_reproducible() {
        let a = generate_applications(&mut StdRng::seed_from_u64(9), 10);
        let b = generate_applications(&mut StdRng::seed_from_u64(9), 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_kaggle_column_names() {
        let mut rng = StdRng::seed_from_u64(1);
        let app = generate_applications(&mut rng, 1).remove(0);
        let json = serde_json::to_value(&app).unwrap();

        assert!(json.get("SK_ID_CURR").is_some());
        assert!(json.get("EXT_SOURCE_2").is_some());
        assert!(json.get("AMT_INCOME_TOTAL").is_some());
        assert!(json.get("RISK_LEVEL").is_some());

        let back: HomeCreditApplication = serde_json::from_value(json).unwrap();
        assert_eq!(back, app);
    }

    #[test]
    fn test_related_records() {
        let mut rng = StdRng::seed_from_u64(5);
        let bureau = generate_bureau_records(&mut rng, 100_007, 5);
        assert_eq!(bureau.len(), 5);
        assert_eq!(bureau[2].sk_id_bureau, 5_000_000 + 1_000_070 + 2);
        assert!(bureau.iter().all(|b| b.amt_credit_sum_debt <= b.amt_credit_sum));

        let previous = generate_previous_applications(&mut rng, 100_007, 40);
        for p in &previous {
            assert_eq!(p.code_reject_reason.is_some(), p.name_contract_status == "Refused");
        }
    }

    #[test]
    fn test_generate_dataset_links_rows() {
        let mut rng = StdRng::seed_from_u64(11);
        let dataset = generate_dataset(&mut rng, 4);

        assert_eq!(dataset.applications.len(), 4);
        assert_eq!(dataset.bureau_records.len(), 4 * DEFAULT_BUREAU_COUNT);
        assert_eq!(dataset.previous_apps.len(), 4 * DEFAULT_PREVIOUS_COUNT);
        assert!(dataset
            .bureau_records
            .iter()
            .all(|b| dataset.applications.iter().any(|a| a.sk_id_curr == b.sk_id_curr)));
    }

    #[test]
    fn test_reference_tables() {
        let total: f64 = FEATURE_IMPORTANCE.iter().map(|f| f.importance).sum();
        assert!(total > 0.8 && total < 0.9);
        assert_eq!(FEATURE_IMPORTANCE[0].feature, "EXT_SOURCE_2");
        assert_eq!(DATASET_STATS.default_rate, 0.0807);
    }
}
