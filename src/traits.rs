//! Data source abstraction.
//!
//! Each configured source (CSV files, a remote document collection, or the
//! synthetic sample) implements [`DataSource`]. The loader only talks to
//! this trait, so custom sources can be plugged in from Rust code through
//! [`crate::loader::load_from`].
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use comment_dashboard::error::DashboardResult;
//! use comment_dashboard::schema::RawTable;
//! use comment_dashboard::traits::DataSource;
//!
//! pub struct FixedSource;
//!
//! #[async_trait]
//! impl DataSource for FixedSource {
//!     fn name(&self) -> &str { "fixed" }
//!     fn kind(&self) -> &str { "custom" }
//!
//!     async fn fetch(&self) -> DashboardResult<RawTable> {
//!         Ok(RawTable::new(vec!["tanggal".into(), "like".into(), "balasan".into(), "sentimen".into()]))
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::DashboardResult;
use crate::schema::RawTable;

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human-readable location (file path, collection URL, ...).
    fn name(&self) -> &str;

    /// Source type identifier (`"csv"`, `"remote"`, `"sample"`, `"custom"`).
    fn kind(&self) -> &str {
        "custom"
    }

    /// Reads the whole source as string cells.
    ///
    /// Must fail with `DataUnavailable` rather than return partial data.
    async fn fetch(&self) -> DashboardResult<RawTable>;

    /// Cheap reachability probe used by `cdash sources`.
    async fn health_check(&self) -> DashboardResult<()> {
        self.fetch().await.map(|_| ())
    }

    /// Label combining type and name, e.g. `"csv:./data/comments.csv"`.
    fn label(&self) -> String {
        format!("{}:{}", self.kind(), self.name())
    }
}
