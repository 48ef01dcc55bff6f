//! Formatted terminal output.
//!
//! Formatting lives here so the pipeline code only deals with tables, and
//! output changes stay in one file.

use crate::buckets::BucketScheme;
use crate::io::RunManifest;

/// Format the run summary: parameters, stage ledger, cleanup removals.
pub fn format_run_summary(manifest: &RunManifest) -> String {
    let mut out = String::new();

    out.push_str("=== abs-features - Census feature table ===\n");
    out.push_str(&format!(
        "Granularity: {} | key: {}\n",
        manifest.granularity, manifest.index_code
    ));
    out.push_str(&format!("Generated: {}\n", manifest.generated_at.format("%Y-%m-%d %H:%M:%S UTC")));
    out.push_str(&format!(
        "Output: {} ({} rows x {} columns)\n",
        manifest.output.display(),
        manifest.rows,
        manifest.columns.len() + 1
    ));

    out.push_str("\nStages:\n");
    out.push_str(
        format!(
            "{:<26} {:>9} {:>9} {:>8} {:>10}",
            "stage", "rows_in", "rows_out", "dropped", "ms"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<26} {:-<9} {:-<9} {:-<8} {:-<10}", "", "", "", "", "").trim_end());
    out.push('\n');
    for s in &manifest.stages {
        out.push_str(
            format!(
                "{:<26} {:>9} {:>9} {:>8} {:>10.1}",
                s.stage.display_name(),
                s.rows_in,
                s.rows_out,
                s.dropped(),
                s.elapsed_ms
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if !manifest.removed_by_cleanup.is_empty() {
        out.push_str(&format!(
            "\nRemoved (zero population): {}\n",
            fmt_keys(&manifest.removed_by_cleanup, 10)
        ));
    }

    out
}

/// Format a bucket scheme as a label / interval / midpoint table.
pub fn format_bucket_scheme(scheme: &BucketScheme) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({} buckets)\n", scheme.name, scheme.len()));
    out.push_str(format!("{:<26} {:>16} {:>9}", "label", "interval", "midpoint").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<26} {:-<16} {:-<9}", "", "", "").trim_end());
    out.push('\n');

    for b in scheme.buckets() {
        let interval = match b.upper {
            Some(upper) => format!("[{}, {})", b.lower, upper),
            None => format!("[{}, inf)", b.lower),
        };
        out.push_str(&format!("{:<26} {:>16} {:>9}\n", truncate(b.label, 26), interval, b.midpoint));
    }
    out
}

fn fmt_keys(keys: &[String], max: usize) -> String {
    let shown: Vec<&str> = keys.iter().take(max).map(String::as_str).collect();
    if keys.len() > max {
        format!("{} ... (+{} more)", shown.join(", "), keys.len() - max)
    } else {
        shown.join(", ")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
