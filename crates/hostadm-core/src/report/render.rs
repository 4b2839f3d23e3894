use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;

use super::{Report, ReportFormat};

/// Timestamp format used in report headers
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a report in the requested format
pub fn render(report: &Report, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Csv => render_csv(report),
        ReportFormat::Html => Ok(render_html(report)),
        ReportFormat::Json => render_json(report),
    }
}

/// Plain-text report: warnings, header block, total, one line per entry
fn render_text(report: &Report) -> String {
    let mut out = String::new();

    for warning in &report.warnings {
        let _ = writeln!(out, "warning: {}", warning);
    }
    if !report.warnings.is_empty() {
        out.push('\n');
    }

    out.push_str("Disk Usage Report\n");
    let _ = writeln!(
        out,
        "Generated: {}",
        report.generated_at.format(TIMESTAMP_FORMAT)
    );
    let _ = writeln!(
        out,
        "Target: {}  Unit: {}  Sort: {}",
        report.target,
        report.unit,
        report.sort.display_name()
    );
    let depth = if report.max_depth == 0 {
        "unlimited".to_string()
    } else {
        report.max_depth.to_string()
    };
    let _ = writeln!(
        out,
        "Threshold: >= {} {}  Depth: {}",
        report.size_threshold, report.unit, depth
    );
    if let Some(days) = report.modified_within_days {
        let _ = writeln!(out, "Modified within: last {} days", days);
    }
    out.push('\n');

    let _ = writeln!(out, "Total Space: {} {}", report.total_size, report.unit);
    for entry in &report.entries {
        let _ = writeln!(
            out,
            "{} {} - {} ({:.2}%)",
            entry.size, report.unit, entry.path, entry.percentage
        );
    }

    out
}

/// CSV report: header row, one row per entry, trailing total row.
/// No title block - the output must round-trip through CSV tooling.
fn render_csv(report: &Report) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer
        .write_record([
            format!("Size ({})", report.unit),
            "Path".to_string(),
            "Percentage".to_string(),
        ])
        .context("Failed to write csv header")?;

    for entry in &report.entries {
        writer
            .write_record([
                entry.size.to_string(),
                entry.path.clone(),
                format!("{:.2}", entry.percentage),
            ])
            .context("Failed to write csv row")?;
    }

    writer
        .write_record([format!("Total Space: {} {}", report.total_size, report.unit)])
        .context("Failed to write csv total row")?;

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush csv writer: {}", e))?;
    String::from_utf8(bytes).context("csv output was not valid UTF-8")
}

/// Minimal self-contained HTML document with the three-column table
fn render_html(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Disk Usage Report</title>\n<style>\n");
    out.push_str("body { font-family: sans-serif; margin: 2em; }\n");
    out.push_str("table { border-collapse: collapse; }\n");
    out.push_str("th, td { border: 1px solid #ccc; padding: 4px 10px; text-align: left; }\n");
    out.push_str("th { background: #eee; }\n");
    out.push_str(".total td { font-weight: bold; }\n");
    out.push_str(".warning { color: #a60; }\n");
    out.push_str("</style>\n</head>\n<body>\n");

    out.push_str("<h1>Disk Usage Report</h1>\n");
    let _ = writeln!(
        out,
        "<p>Generated: {} &middot; Target: {}</p>",
        report.generated_at.format(TIMESTAMP_FORMAT),
        escape_html(&report.target)
    );
    for warning in &report.warnings {
        let _ = writeln!(out, "<p class=\"warning\">{}</p>", escape_html(warning));
    }

    out.push_str("<table>\n");
    let _ = writeln!(
        out,
        "<tr><th>Size ({})</th><th>Path</th><th>Percentage</th></tr>",
        report.unit
    );
    for entry in &report.entries {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{:.2}%</td></tr>",
            entry.size,
            escape_html(&entry.path),
            entry.percentage
        );
    }
    let _ = writeln!(
        out,
        "<tr class=\"total\"><td colspan=\"2\">Total Space</td><td>{} {}</td></tr>",
        report.total_size, report.unit
    );
    out.push_str("</table>\n</body>\n</html>\n");

    out
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    size: u64,
    path: &'a str,
    percentage: f64,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    report: &'static str,
    generated_at: String,
    target: &'a str,
    entries: Vec<JsonEntry<'a>>,
    total_space: String,
}

/// One well-formed JSON document carrying the entries and the total
fn render_json(report: &Report) -> Result<String> {
    let doc = JsonReport {
        report: "Disk Usage",
        generated_at: report.generated_at.format(TIMESTAMP_FORMAT).to_string(),
        target: &report.target,
        entries: report
            .entries
            .iter()
            .map(|e| JsonEntry {
                size: e.size,
                path: &e.path,
                percentage: e.percentage,
            })
            .collect(),
        total_space: format!("{} {}", report.total_size, report.unit),
    };

    serde_json::to_string_pretty(&doc).context("Failed to serialize report")
}

/// Escape the characters HTML treats specially
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
