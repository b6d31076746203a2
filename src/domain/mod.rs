//! Pure closeout domain: records, display formatting, totals and form rules.

pub mod aggregators;
pub mod errors;
pub mod formatters;
pub mod models;
pub mod schemas;
pub mod validation;

pub use aggregators::*;
pub use errors::*;
pub use formatters::*;
pub use models::*;
pub use schemas::*;
pub use validation::*;
