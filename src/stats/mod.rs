/// Statistical building blocks: the KS comparison, the size-adjusted
/// critical value, and knee detection on the resulting curves.
pub mod knee;
pub mod ks;
pub mod threshold;
