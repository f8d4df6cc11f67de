//! soat-exec
//!
//! Executes a [`soat_core::types::Plan`] against the vehicle portfolio:
//! dataset loading, per-plate premium re-estimation and portfolio statistics.
pub mod dataset;
pub mod executor;
pub mod tariff;

pub use dataset::{VehicleDataset, VehicleRecord};
pub use executor::{ExecutionReport, Executor, PlateOutcome, PortfolioStats, PremiumQuote, TypeStats};
pub use tariff::{estimate_premium, PremiumBreakdown, VehicleType};
