use anyhow::Result;
use serde::Serialize;

use crate::config::Config;
use crate::loader::build_source;

/// Health of the configured data source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub kind: String,
    pub name: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn check_source(config: &Config) -> SourceStatus {
    let source = match build_source(config) {
        Ok(s) => s,
        Err(e) => {
            return SourceStatus {
                kind: format!("{:?}", config.source.kind).to_lowercase(),
                name: config.source.describe(),
                healthy: false,
                error: Some(e.to_string()),
            }
        }
    };

    let result = source.health_check().await;
    SourceStatus {
        kind: source.kind().to_string(),
        name: source.name().to_string(),
        healthy: result.is_ok(),
        error: result.err().map(|e| e.to_string()),
    }
}

pub async fn list_sources(config: &Config) -> Result<()> {
    let status = check_source(config).await;

    println!("{:<10} {:<48} HEALTHY", "KIND", "SOURCE");
    println!("{:<10} {:<48} {}", status.kind, status.name, status.healthy);
    if let Some(err) = &status.error {
        println!();
        println!("  {}", err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceKind;

    #[tokio::test]
    async fn test_sample_source_healthy() {
        let status = check_source(&Config::minimal()).await;
        assert!(status.healthy);
        assert_eq!(status.kind, "sample");
    }

    #[tokio::test]
    async fn test_missing_csv_unhealthy() {
        let mut cfg = Config::minimal();
        cfg.source.kind = SourceKind::Csv;
        cfg.source.path = Some("/nonexistent/comments.csv".into());
        let status = check_source(&cfg).await;
        assert!(!status.healthy);
        assert!(status.error.unwrap().contains("does not exist"));
    }
}
