/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  drop rows with missing cells, keep numeric columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  aligned named f64 columns, fed to the scanners
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
