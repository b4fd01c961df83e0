//! Remote document-collection source.
//!
//! Reads a collection of comment documents over HTTP with a single
//! `GET {url}/{collection}` per page. The response may be a bare JSON array
//! or an object wrapping the array under `documents`, `records`, `items`, or
//! `data`. A `nextPageToken` in the response is followed with
//! `?pageToken=...` until exhausted.
//!
//! # Configuration
//!
//! ```toml
//! [source]
//! kind = "remote"
//! url = "https://store.example.com/v1/projects/demo"
//! collection = "comments"
//! token_env = "CDASH_SOURCE_TOKEN"   # optional bearer token
//! timeout_secs = 30
//! ```
//!
//! # Document shape
//!
//! Each document is a flat object whose keys are column names. Documents
//! carrying a `fields` object use that object instead, and typed wrappers
//! such as `{"integerValue": "4"}` or `{"timestampValue": "..."}` are
//! unwrapped to their inner value. Columns are the union of all document
//! keys in order of first appearance (keys sort alphabetically within a
//! document); documents missing a key get an empty cell.
//!
//! Any transport error, non-success status, or undecodable body fails the
//! whole load; partial collections are never returned.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::SourceConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::schema::RawTable;
use crate::traits::DataSource;

const ARRAY_KEYS: &[&str] = &["documents", "records", "items", "data"];
const MAX_PAGES: usize = 10_000;

pub struct RemoteSource {
    endpoint: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl RemoteSource {
    pub fn new(url: &str, collection: &str, token: Option<String>, timeout: Duration) -> DashboardResult<Self> {
        let endpoint = format!(
            "{}/{}",
            url.trim_end_matches('/'),
            collection.trim_start_matches('/')
        );
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::unavailable(&endpoint, e))?;
        Ok(Self {
            endpoint,
            token,
            client,
        })
    }

    /// Builds the source from config, resolving the bearer token from the
    /// environment variable named by `token_env`.
    pub fn from_config(config: &SourceConfig) -> DashboardResult<Self> {
        let url = config.url.as_deref().unwrap_or_default();
        let collection = config.collection.as_deref().unwrap_or_default();
        let token = match &config.token_env {
            Some(var) => Some(std::env::var(var).map_err(|_| {
                DashboardError::unavailable(
                    format!("{}/{}", url, collection),
                    format!("environment variable {} is not set", var),
                )
            })?),
            None => None,
        };
        Self::new(url, collection, token, Duration::from_secs(config.timeout_secs))
    }

    async fn fetch_page(&self, page_token: Option<&str>) -> DashboardResult<Value> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(t) = page_token {
            request = request.query(&[("pageToken", t)]);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DashboardError::unavailable(&self.endpoint, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::unavailable(
                &self.endpoint,
                format!("HTTP {}", status),
            ));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| DashboardError::unavailable(&self.endpoint, e))
    }
}

#[async_trait]
impl DataSource for RemoteSource {
    fn name(&self) -> &str {
        &self.endpoint
    }

    fn kind(&self) -> &str {
        "remote"
    }

    async fn fetch(&self) -> DashboardResult<RawTable> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..MAX_PAGES {
            let body = self.fetch_page(page_token.as_deref()).await?;
            let next = body
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            let batch = extract_documents(body)
                .ok_or_else(|| DashboardError::unavailable(&self.endpoint, "response holds no document array"))?;
            debug!(page, documents = batch.len(), "fetched remote page");
            documents.extend(batch);

            match next {
                Some(t) => page_token = Some(t),
                None => return documents_to_table(&self.endpoint, documents),
            }
        }

        Err(DashboardError::unavailable(
            &self.endpoint,
            format!("more than {} pages", MAX_PAGES),
        ))
    }
}

fn extract_documents(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(docs) => Some(docs),
        Value::Object(mut obj) => ARRAY_KEYS.iter().find_map(|k| match obj.remove(*k) {
            Some(Value::Array(docs)) => Some(docs),
            _ => None,
        }),
        _ => None,
    }
}

fn document_fields(doc: Value) -> Option<Map<String, Value>> {
    match doc {
        Value::Object(mut obj) => match obj.remove("fields") {
            Some(Value::Object(fields)) => Some(fields),
            Some(other) => {
                obj.insert("fields".to_string(), other);
                Some(obj)
            }
            None => Some(obj),
        },
        _ => None,
    }
}

/// Renders a JSON value as a table cell.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Object(obj) if obj.len() == 1 => {
            let (key, inner) = obj.iter().next().map(|(k, v)| (k.as_str(), v)).unwrap_or(("", value));
            if key.ends_with("Value") {
                cell_text(inner)
            } else {
                value.to_string()
            }
        }
        other => other.to_string(),
    }
}

fn documents_to_table(endpoint: &str, documents: Vec<Value>) -> DashboardResult<RawTable> {
    let mut rows: Vec<Map<String, Value>> = Vec::with_capacity(documents.len());
    for (i, doc) in documents.into_iter().enumerate() {
        let fields = document_fields(doc).ok_or_else(|| {
            DashboardError::unavailable(endpoint, format!("document {} is not an object", i + 1))
        })?;
        rows.push(fields);
    }

    let mut headers: Vec<String> = Vec::new();
    for fields in &rows {
        for key in fields.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let mut table = RawTable::new(headers);
    for fields in &rows {
        let row = table
            .headers
            .iter()
            .map(|h| fields.get(h).map(cell_text).unwrap_or_default())
            .collect();
        table.rows.push(row);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_cell_text_variants() {
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!(4)), "4");
        assert_eq!(cell_text(&json!(4.0)), "4");
        assert_eq!(cell_text(&json!(0.5)), "0.5");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&json!({"integerValue": "7"})), "7");
        assert_eq!(cell_text(&json!({"other": 1})), "{\"other\":1}");
    }

    #[test]
    fn test_documents_to_table_unions_keys() {
        let docs = vec![
            json!({"tanggal": "2024-01-01", "like": 3}),
            json!({"fields": {"tanggal": {"stringValue": "2024-01-02"}, "balasan": 1}}),
        ];
        let table = documents_to_table("test", docs).unwrap();
        assert_eq!(table.headers, vec!["like", "tanggal", "balasan"]);
        assert_eq!(table.rows[0], vec!["3", "2024-01-01", ""]);
        assert_eq!(table.rows[1], vec!["", "2024-01-02", "1"]);
    }

    #[test]
    fn test_non_object_document_rejected() {
        assert!(documents_to_table("test", vec![json!(42)]).is_err());
    }

    #[tokio::test]
    async fn test_fetch_follows_pages_with_token() {
        let app = Router::new().route(
            "/v1/comments",
            get(
                |headers: axum::http::HeaderMap, Query(q): Query<HashMap<String, String>>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    assert_eq!(auth, "Bearer secret");
                    match q.get("pageToken").map(String::as_str) {
                        None => Json(json!({
                            "documents": [{"tanggal": "2024-01-01", "like": 1, "balasan": 0, "sentimen": "Positif"}],
                            "nextPageToken": "p2"
                        })),
                        Some(_) => Json(json!({
                            "documents": [{"tanggal": "2024-01-02", "like": 2, "balasan": 1, "sentimen": "Netral"}]
                        })),
                    }
                },
            ),
        );
        let base = serve(app).await;

        let source = RemoteSource::new(
            &format!("{}/v1/", base),
            "comments",
            Some("secret".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        let table = source.fetch().await.unwrap();
        assert_eq!(table.rows.len(), 2);
        let col = table.headers.iter().position(|h| h == "sentimen").unwrap();
        assert_eq!(table.rows[1][col], "Netral");
    }

    #[tokio::test]
    async fn test_http_error_is_unavailable() {
        let app = Router::new().route(
            "/comments",
            get(|| async { (axum::http::StatusCode::FORBIDDEN, "denied") }),
        );
        let base = serve(app).await;
        let source = RemoteSource::new(&base, "comments", None, Duration::from_secs(5)).unwrap();
        let err = source.fetch().await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_bare_array_response() {
        let app = Router::new().route(
            "/comments",
            get(|| async { Json(json!([{"tanggal": "2024-01-05", "like": 0}])) }),
        );
        let base = serve(app).await;
        let source = RemoteSource::new(&base, "comments", None, Duration::from_secs(5)).unwrap();
        let table = source.fetch().await.unwrap();
        assert_eq!(table.headers, vec!["like", "tanggal"]);
        assert_eq!(table.rows, vec![vec!["0".to_string(), "2024-01-05".to_string()]]);
    }
}
