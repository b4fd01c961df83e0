//! Flat-file CSV source.
//!
//! `source.path` may name a single CSV file or a directory. In directory
//! mode every file matching `include_globs` is read in path order and the
//! tables are concatenated, aligning columns by header name.

use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::SourceConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::schema::RawTable;
use crate::traits::DataSource;

pub struct CsvSource {
    path: PathBuf,
    label: String,
    include_globs: Vec<String>,
    delimiter: u8,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            label: path.display().to_string(),
            path,
            include_globs: vec!["**/*.csv".to_string()],
            delimiter: b',',
        }
    }

    pub fn from_config(config: &SourceConfig) -> DashboardResult<Self> {
        let path = config
            .path
            .clone()
            .ok_or_else(|| DashboardError::unavailable("csv", "source.path is not configured"))?;
        Ok(Self {
            include_globs: config.include_globs.clone(),
            delimiter: config.delimiter_byte(),
            ..Self::new(path)
        })
    }

    /// Files to read, sorted for deterministic concatenation.
    fn files(&self) -> DashboardResult<Vec<PathBuf>> {
        if !self.path.exists() {
            return Err(DashboardError::unavailable(
                &self.label,
                "path does not exist",
            ));
        }
        if self.path.is_file() {
            return Ok(vec![self.path.clone()]);
        }

        let include = build_globset(&self.include_globs)
            .map_err(|e| DashboardError::unavailable(&self.label, e))?;
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.path) {
            let entry = entry.map_err(|e| DashboardError::unavailable(&self.label, e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.path).unwrap_or(entry.path());
            if include.is_match(relative) {
                files.push(entry.path().to_path_buf());
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(DashboardError::unavailable(
                &self.label,
                format!("no files match {:?}", self.include_globs),
            ));
        }
        Ok(files)
    }

    fn read_file(&self, path: &Path) -> DashboardResult<RawTable> {
        let label = path.display().to_string();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_path(path)
            .map_err(|e| DashboardError::unavailable(&label, e))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| DashboardError::unavailable(&label, e))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut table = RawTable::new(headers);
        for record in reader.records() {
            let record = record.map_err(|e| DashboardError::unavailable(&label, e))?;
            table.rows.push(record.iter().map(str::to_string).collect());
        }
        debug!(file = %label, rows = table.rows.len(), "read csv file");
        Ok(table)
    }
}

#[async_trait]
impl DataSource for CsvSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn kind(&self) -> &str {
        "csv"
    }

    async fn fetch(&self) -> DashboardResult<RawTable> {
        let mut files = self.files()?.into_iter();
        let mut table = match files.next() {
            Some(first) => self.read_file(&first)?,
            None => return Err(DashboardError::unavailable(&self.label, "no input files")),
        };
        for path in files {
            table.append(self.read_file(&path)?);
        }
        Ok(table)
    }

    async fn health_check(&self) -> DashboardResult<()> {
        self.files().map(|_| ())
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}
