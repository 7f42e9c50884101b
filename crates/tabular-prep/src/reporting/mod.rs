//! Report generation module.
//!
//! This module provides the text audit log written by the cleaning stage
//! and the raw vs. cleaned distribution comparison.
//!
//! # Example
//!
//! ```rust,ignore
//! use tabular_prep::reporting::DistributionComparison;
//!
//! let comparison = DistributionComparison::from_files(
//!     Path::new("data/raw/car_details.csv"),
//!     Path::new("data/processed/car_details_clean.csv"),
//!     "selling_price",
//!     0.005,
//!     0.995,
//! )?;
//! println!("{}", comparison);
//! comparison.write_json(Path::new("reports/selling_price.json"))?;
//! ```

mod cleaning_log;
mod comparison;

pub use cleaning_log::render_cleaning_log;
pub use comparison::DistributionComparison;
