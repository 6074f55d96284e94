/// Scanners: repeated subsampling plus per-column comparison.
///
/// ```text
///   Dataset ──► FractionSampler ──► subset ──► ks::compare (per column)
///                                                 │
///                      StatThreshold ─────────────┤
///                                                 ▼
///                              AggregateRow / TrialSample
/// ```
pub mod pair;
pub mod sampler;
pub mod single;
