use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::scan::pair::{PairScanReport, TrialSummary};
use crate::scan::single::SingleScanReport;

// ---------------------------------------------------------------------------
// Sink trait
// ---------------------------------------------------------------------------

/// Receives finished scan results for export or display.
pub trait ReportSink {
    fn single(&mut self, label: &str, report: &SingleScanReport) -> Result<()>;
    fn pair(&mut self, label: &str, report: &PairScanReport) -> Result<()>;
}

// ---------------------------------------------------------------------------
// JSON files
// ---------------------------------------------------------------------------

/// Writes one pretty-printed JSON file per report into a directory.
pub struct JsonSink {
    dir: PathBuf,
}

#[derive(Serialize)]
struct PairDocument<'a> {
    label: &'a str,
    summary: TrialSummary,
    #[serde(flatten)]
    report: &'a PairScanReport,
}

impl JsonSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        Ok(JsonSink { dir })
    }

    fn write<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let text = serde_json::to_string_pretty(value).context("serializing report")?;
        fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        info!("wrote {}", path.display());
        Ok(())
    }
}

/// File-system friendly version of a label.
fn file_stem(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl ReportSink for JsonSink {
    fn single(&mut self, label: &str, report: &SingleScanReport) -> Result<()> {
        self.write(&single_report_path(&self.dir, label), report)
    }

    fn pair(&mut self, label: &str, report: &PairScanReport) -> Result<()> {
        let doc = PairDocument {
            label,
            summary: report.summary(),
            report,
        };
        self.write(&pair_report_path(&self.dir, label), &doc)
    }
}

// ---------------------------------------------------------------------------
// Plain-text summary
// ---------------------------------------------------------------------------

/// Prints a compact table per report.
pub struct SummarySink<W: Write> {
    out: W,
}

impl<W: Write> SummarySink<W> {
    pub fn new(out: W) -> Self {
        SummarySink { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for SummarySink<W> {
    fn single(&mut self, label: &str, report: &SingleScanReport) -> Result<()> {
        let out = &mut self.out;
        writeln!(out, "== {label} ({} rows)", report.row_count)?;
        writeln!(
            out,
            "{:>8} {:>8} {:>10} {:>10} {:>10} {:>10}",
            "fraction", "rows", "ks_stat", "threshold", "signif", "adj_alpha"
        )?;
        for row in &report.rows {
            writeln!(
                out,
                "{:>8.3} {:>8} {:>10.5} {:>10.5} {:>10.5} {:>10.5}",
                row.fraction,
                row.sample_rows,
                row.statistic,
                row.threshold,
                row.significance,
                row.adjusted_alpha
            )?;
        }
        match report.representative_fraction() {
            Some(f) => writeln!(out, "representative fraction: {f:.3}")?,
            None => writeln!(out, "representative fraction: no clear knee")?,
        }
        Ok(())
    }

    fn pair(&mut self, label: &str, report: &PairScanReport) -> Result<()> {
        let s = report.summary();
        let out = &mut self.out;
        writeln!(
            out,
            "== {label} ({} vs {} rows, {} trials, {} shared columns)",
            report.small_rows,
            report.big_rows,
            report.trials.len(),
            report.shared_columns.len()
        )?;
        writeln!(out, "threshold: {:.5}", report.threshold)?;
        writeln!(
            out,
            "ks_stat: mean {:.5} sd {:.5} [{:.5}, {:.5}]",
            s.statistic.mean, s.statistic.std_dev, s.statistic.min, s.statistic.max
        )?;
        writeln!(
            out,
            "signif:  mean {:.5} sd {:.5} [{:.5}, {:.5}]",
            s.significance.mean, s.significance.std_dev, s.significance.min, s.significance.max
        )?;
        writeln!(out, "trials above threshold: {:.1}%", s.exceed_rate * 100.0)?;
        Ok(())
    }
}

/// Path of the JSON file [`JsonSink`] writes for a single-dataset report.
pub fn single_report_path(dir: &Path, label: &str) -> PathBuf {
    dir.join(format!("{}.single.json", file_stem(label)))
}

/// Path of the JSON file [`JsonSink`] writes for a pair report.
pub fn pair_report_path(dir: &Path, label: &str) -> PathBuf {
    dir.join(format!("{}.pair.json", file_stem(label)))
}
