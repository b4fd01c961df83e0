//! Export the filtered comment table.
//!
//! Writes the records of a filtered (and optionally searched) view as CSV
//! with the canonical source headers, so the output can be fed back in as
//! a `csv` source, or as pretty JSON.

use anyhow::{bail, Result};
use std::path::Path;
use std::str::FromStr;

use crate::config::Config;
use crate::filter::{apply, search, FilteredView};
use crate::loader::DatasetCache;
use crate::models::FilterCriteria;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => bail!("Unknown export format: {}. Use csv or json.", other),
        }
    }
}

const CSV_HEADERS: [&str; 9] = [
    "tanggal",
    "jumlah_like",
    "jumlah_reply",
    "sentimen",
    "skor_sentimen",
    "memiliki_gambar",
    "memiliki_video",
    "memiliki_tautan",
    "komentar",
];

pub fn to_csv(view: &FilteredView<'_>) -> Result<String> {
    let mut output = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut output);
        writer.write_record(CSV_HEADERS)?;
        let flag = |b: bool| if b { "1" } else { "0" }.to_string();
        for r in view.iter() {
            writer.write_record([
                r.date.format("%Y-%m-%d").to_string(),
                r.like_count.to_string(),
                r.reply_count.to_string(),
                r.sentiment.source_label().to_string(),
                r.sentiment_score.to_string(),
                flag(r.has_image),
                flag(r.has_video),
                flag(r.has_link),
                r.text.clone().unwrap_or_default(),
            ])?;
        }
        writer.flush()?;
    }
    Ok(String::from_utf8(output)?)
}

pub fn to_json(view: &FilteredView<'_>) -> Result<String> {
    Ok(serde_json::to_string_pretty(view)?)
}

/// Export filtered records.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub async fn run_export(
    cache: &DatasetCache,
    config: &Config,
    criteria: &FilterCriteria,
    keyword: Option<&str>,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let dataset = cache.get_or_load(config).await?;
    let view = search(&apply(&dataset, criteria), keyword.unwrap_or(""));

    let body = match format {
        ExportFormat::Csv => to_csv(&view)?,
        ExportFormat::Json => to_json(&view)?,
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &body)?;
            eprintln!("Exported {} comments to {}", view.len(), path.display());
        }
        None => {
            print!("{}", body);
        }
    }

    Ok(())
}
