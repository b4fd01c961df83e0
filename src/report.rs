//! Plain-text rendering of dashboard views for the CLI.
//!
//! Output goes to stdout; `--json` prints the same payload the HTTP API
//! returns instead.

use anyhow::Result;

use crate::aggregate::{CorrelationMatrix, TrendPoint};
use crate::config::Config;
use crate::filter::FilteredView;
use crate::loader::DatasetCache;
use crate::models::Sentiment;
use crate::views::{render, SummaryPayload, ViewKind, ViewPayload, ViewRequest};
use std::collections::BTreeMap;

/// CLI entry point for every view subcommand.
pub async fn run_view(
    cache: &DatasetCache,
    config: &Config,
    kind: ViewKind,
    request: &ViewRequest,
    json: bool,
) -> Result<()> {
    let dataset = cache.get_or_load(config).await?;
    let payload = render(&dataset, kind, request);

    if json {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", format_payload(&payload));
    }
    Ok(())
}

pub fn format_payload(payload: &ViewPayload<'_>) -> String {
    match payload {
        ViewPayload::Summary(s) => format_summary(s),
        ViewPayload::Trend { points, .. } => format_trend(points),
        ViewPayload::Sentiment { counts } => format_distribution(counts),
        ViewPayload::Correlation(m) => format_correlation(m),
        ViewPayload::Data { total, records } => format_records(*total, records),
    }
}

/// Formats a float with two decimals, or `n/a` for NaN.
fn fmt_avg(v: f64) -> String {
    if v.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.2}", v)
    }
}

pub fn format_summary(s: &SummaryPayload) -> String {
    let mut out = String::new();
    out.push_str("Comment Summary\n");
    out.push_str("===============\n\n");
    out.push_str(&format!("  Comments:        {}\n", s.summary.count));
    out.push_str(&format!("  Avg likes:       {}\n", fmt_avg(s.summary.avg_likes)));
    out.push_str(&format!("  Avg replies:     {}\n", fmt_avg(s.summary.avg_replies)));
    out.push_str(&format!(
        "  Sentiment index: {}  ({}, threshold ±{})\n",
        fmt_avg(s.summary.avg_sentiment_score),
        s.label,
        s.threshold
    ));
    out
}

pub fn format_trend(points: &[TrendPoint]) -> String {
    if points.is_empty() {
        return "No comments.\n".to_string();
    }
    let mut out = format!("{:<12} {:>7}\n", "DATE", "COUNT");
    out.push_str(&format!("{}\n", "-".repeat(20)));
    for p in points {
        out.push_str(&format!("{:<12} {:>7}\n", p.date.format("%Y-%m-%d").to_string(), p.count));
    }
    out
}

pub fn format_distribution(counts: &BTreeMap<Sentiment, usize>) -> String {
    if counts.is_empty() {
        return "No comments.\n".to_string();
    }
    let total: usize = counts.values().sum();
    let mut out = format!("{:<12} {:>7} {:>8}\n", "SENTIMENT", "COUNT", "SHARE");
    out.push_str(&format!("{}\n", "-".repeat(29)));
    for (sentiment, count) in counts {
        out.push_str(&format!(
            "{:<12} {:>7} {:>7.1}%\n",
            sentiment.as_str(),
            count,
            *count as f64 * 100.0 / total as f64
        ));
    }
    out
}

pub fn format_correlation(m: &CorrelationMatrix) -> String {
    let mut out = format!("{:<16}", "");
    for c in &m.columns {
        out.push_str(&format!(" {:>15}", c.as_str()));
    }
    out.push('\n');
    for (c, row) in m.columns.iter().zip(m.matrix.iter()) {
        out.push_str(&format!("{:<16}", c.as_str()));
        for v in row {
            let cell = if v.is_nan() {
                "nan".to_string()
            } else {
                format!("{:.3}", v)
            };
            out.push_str(&format!(" {:>15}", cell));
        }
        out.push('\n');
    }
    out
}

pub fn format_records(total: usize, records: &FilteredView<'_>) -> String {
    if records.is_empty() {
        return "No comments.\n".to_string();
    }
    let mut out = format!(
        "{:<12} {:>6} {:>7} {:<10} {:>5} {:>3} {:>3} {:>3}  {}\n",
        "DATE", "LIKES", "REPLIES", "SENTIMENT", "SCORE", "IMG", "VID", "LNK", "TEXT"
    );
    out.push_str(&format!("{}\n", "-".repeat(76)));
    let flag = |b: bool| if b { "1" } else { "0" };
    for r in records.iter() {
        out.push_str(&format!(
            "{:<12} {:>6} {:>7} {:<10} {:>5} {:>3} {:>3} {:>3}  {}\n",
            r.date.format("%Y-%m-%d").to_string(),
            r.like_count,
            r.reply_count,
            r.sentiment.as_str(),
            r.sentiment_score,
            flag(r.has_image),
            flag(r.has_video),
            flag(r.has_link),
            r.text.as_deref().unwrap_or("")
        ));
    }
    if records.len() < total {
        out.push_str(&format!("\n({} of {} comments shown)\n", records.len(), total));
    } else {
        out.push_str(&format!(
            "\n({} comment{})\n",
            total,
            if total == 1 { "" } else { "s" }
        ));
    }
    out
}
