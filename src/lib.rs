//! Representative-sample estimation for numeric tabular data.
//!
//! Two questions are answered:
//! * how small a random sample of a dataset can be while its column
//!   distributions still match the full data ([`SingleDatasetScanner`]);
//! * whether two datasets look drawn from the same distribution
//!   ([`PairDatasetScanner`]).
//!
//! Both rely on the two-sample Kolmogorov-Smirnov test and a critical value
//! scaled to the sample sizes.

pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod scan;
pub mod stats;

pub use config::{ProbeConfig, SaturationPolicy};
pub use data::loader::{list_datasets, load_file, DatasetCatalog};
pub use data::model::{Dataset, NumericColumn};
pub use error::{Result, ScanError};
pub use scan::pair::{PairDatasetScanner, PairScanReport, TrialSample, TrialSummary};
pub use scan::sampler::FractionSampler;
pub use scan::single::{AggregateRow, FractionSeries, SingleDatasetScanner, SingleScanReport};
pub use stats::knee::{CurveDirection, CurveShape, CurveSpec, KneeFinder, KneePoint};
pub use stats::ks::{compare, ComparisonResult};
pub use stats::threshold::{threshold, StatThreshold};
