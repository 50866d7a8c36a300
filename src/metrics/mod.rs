/// Regression error metrics
pub mod errors;
