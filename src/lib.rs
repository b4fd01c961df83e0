//! # Comment Dashboard
//!
//! Filter-and-aggregate engine for public comment datasets, with a CLI and
//! a JSON HTTP API for dashboard front-ends.
//!
//! A dataset of comments (date, likes, replies, sentiment, media flags) is
//! loaded once from a CSV file, a remote document collection, or a seeded
//! sample. Each interaction filters it by sentiment and date range and
//! derives summary scalars, a daily trend, a sentiment distribution, a
//! correlation matrix, or a searchable record table.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────┐   ┌───────────────┐
//! │ Data sources │──▶│  Loader  │──▶│ Dataset (Arc) │
//! │ CSV/Remote/… │   │ + schema │   │ sorted, r/o   │
//! └──────────────┘   └──────────┘   └───────┬───────┘
//!                                           │ filter + aggregate
//!                      ┌────────────────────┤
//!                      ▼                    ▼
//!                 ┌──────────┐        ┌──────────┐
//!                 │   CLI    │        │   HTTP   │
//!                 │ (cdash)  │        │  (JSON)  │
//!                 └──────────┘        └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! cdash sources                         # check the configured source
//! cdash summary --sentiment positive    # KPI block
//! cdash trend --since 2024-01-01 --zero-fill
//! cdash data --search harga --limit 20
//! cdash serve                           # start the JSON API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Typed load and filter errors |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`models`] | Records, dataset, filter criteria |
//! | [`schema`] | Column aliases and row parsing |
//! | [`traits`] | Data source abstraction |
//! | [`connector_csv`] | CSV file/directory source |
//! | [`connector_remote`] | Remote document-collection source |
//! | [`connector_sample`] | Seeded synthetic source |
//! | [`loader`] | Load, sort, and cache the dataset |
//! | [`filter`] | Filtered views and keyword search |
//! | [`aggregate`] | Summary, trend, distribution, correlation |
//! | [`views`] | View selection and payloads |
//! | [`report`] | Text rendering for the CLI |
//! | [`export`] | CSV/JSON export |
//! | [`sources`] | Source health check |
//! | [`server`] | JSON HTTP API |

pub mod aggregate;
pub mod config;
pub mod connector_csv;
pub mod connector_remote;
pub mod connector_sample;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod logging;
pub mod models;
pub mod report;
pub mod schema;
pub mod server;
pub mod sources;
pub mod traits;
pub mod views;
