// Route handlers, one module per area

pub mod analysis;
pub mod dataset;
pub mod health;
pub mod samples;
pub mod simulation;
