//! Dataset loading and process-lifetime caching.
//!
//! ```text
//! ┌──────────────┐   ┌──────────┐   ┌──────────────┐   ┌─────────┐
//! │ DataSource   │──▶│ RawTable │──▶│ schema parse │──▶│ Dataset │
//! │ csv/remote/… │   │ strings  │   │ + validation │   │ sorted  │
//! └──────────────┘   └──────────┘   └──────────────┘   └─────────┘
//! ```
//!
//! The dataset is static: it is read once, never refreshed, and a failed
//! load is not retried.

use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config::{Config, SourceKind};
use crate::connector_csv::CsvSource;
use crate::connector_remote::RemoteSource;
use crate::connector_sample::SampleSource;
use crate::error::DashboardResult;
use crate::models::Dataset;
use crate::schema::parse_table;
use crate::traits::DataSource;

/// Instantiates the source named by `[source].kind`.
pub fn build_source(config: &Config) -> DashboardResult<Box<dyn DataSource>> {
    let source: Box<dyn DataSource> = match config.source.kind {
        SourceKind::Csv => Box::new(CsvSource::from_config(&config.source)?),
        SourceKind::Remote => Box::new(RemoteSource::from_config(&config.source)?),
        SourceKind::Sample => Box::new(SampleSource::from_config(&config.source)?),
    };
    Ok(source)
}

/// Reads, parses, and sorts the configured dataset.
pub async fn load(config: &Config) -> DashboardResult<Dataset> {
    let source = build_source(config)?;
    load_from(source.as_ref()).await
}

/// Reads, parses, and sorts a dataset from any [`DataSource`].
pub async fn load_from(source: &dyn DataSource) -> DashboardResult<Dataset> {
    let table = source.fetch().await?;
    let records = parse_table(&table)?;
    let dataset = Dataset::from_records(records);

    match dataset.date_span() {
        Some((first, last)) => info!(
            source = %source.label(),
            records = dataset.len(),
            first = %first,
            last = %last,
            "dataset loaded"
        ),
        None => info!(source = %source.label(), "dataset loaded with no records"),
    }
    Ok(dataset)
}

/// Loads the dataset on first use and hands out the same `Arc` afterwards.
#[derive(Default)]
pub struct DatasetCache {
    cell: OnceCell<Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_load(&self, config: &Config) -> DashboardResult<Arc<Dataset>> {
        self.cell
            .get_or_try_init(|| async { load(config).await.map(Arc::new) })
            .await
            .cloned()
    }

    /// Returns the dataset if it has already been loaded.
    pub fn get(&self) -> Option<Arc<Dataset>> {
        self.cell.get().cloned()
    }
}
