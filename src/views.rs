//! View selection and payload assembly.
//!
//! The dashboard's five views are selected explicitly per call (by CLI
//! subcommand or by the `view` query parameter) and carry their own filter
//! state in a [`ViewRequest`]. Nothing here is remembered between calls.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::aggregate::{
    classify_sentiment_label, correlation_matrix, daily_trend, sentiment_distribution, summarize,
    zero_fill, CorrelationMatrix, NumericColumn, SentimentLabel, Summary, TrendPoint,
};
use crate::config::Config;
use crate::filter::{apply, search, FilteredView};
use crate::models::{Dataset, FilterCriteria, Sentiment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Summary,
    Trend,
    Sentiment,
    Correlation,
    Data,
}

impl ViewKind {
    pub const ALL: [ViewKind; 5] = [
        ViewKind::Summary,
        ViewKind::Trend,
        ViewKind::Sentiment,
        ViewKind::Correlation,
        ViewKind::Data,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewKind::Summary => "summary",
            ViewKind::Trend => "trend",
            ViewKind::Sentiment => "sentiment",
            ViewKind::Correlation => "correlation",
            ViewKind::Data => "data",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown view '{}'. Use summary, trend, sentiment, correlation, or data.",
                    s
                )
            })
    }
}

/// Everything one view computation depends on.
#[derive(Debug, Clone)]
pub struct ViewRequest {
    pub criteria: FilterCriteria,
    pub keyword: Option<String>,
    pub limit: Option<usize>,
    pub zero_fill: bool,
    pub threshold: f64,
}

impl ViewRequest {
    /// Default request: no filter, settings from `[analysis]`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            criteria: FilterCriteria::default(),
            keyword: None,
            limit: None,
            zero_fill: config.analysis.trend_zero_fill,
            threshold: config.analysis.sentiment_threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryPayload {
    #[serde(flatten)]
    pub summary: Summary,
    pub label: SentimentLabel,
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewPayload<'a> {
    Summary(SummaryPayload),
    Trend {
        zero_filled: bool,
        points: Vec<TrendPoint>,
    },
    Sentiment {
        counts: BTreeMap<Sentiment, usize>,
    },
    Correlation(CorrelationMatrix),
    Data {
        total: usize,
        records: FilteredView<'a>,
    },
}

pub fn summary_payload(view: &FilteredView<'_>, threshold: f64) -> SummaryPayload {
    let summary = summarize(view);
    SummaryPayload {
        label: classify_sentiment_label(summary.avg_sentiment_score, threshold),
        summary,
        threshold,
    }
}

/// Filters the dataset and derives the requested view.
pub fn render<'a>(dataset: &'a Dataset, kind: ViewKind, request: &ViewRequest) -> ViewPayload<'a> {
    let view = apply(dataset, &request.criteria);
    match kind {
        ViewKind::Summary => ViewPayload::Summary(summary_payload(&view, request.threshold)),
        ViewKind::Trend => {
            let trend = daily_trend(&view);
            ViewPayload::Trend {
                zero_filled: request.zero_fill,
                points: if request.zero_fill {
                    zero_fill(&trend)
                } else {
                    trend
                },
            }
        }
        ViewKind::Sentiment => ViewPayload::Sentiment {
            counts: sentiment_distribution(&view),
        },
        ViewKind::Correlation => {
            ViewPayload::Correlation(correlation_matrix(&view, &NumericColumn::ALL))
        }
        ViewKind::Data => {
            let hits = search(&view, request.keyword.as_deref().unwrap_or(""));
            let total = hits.len();
            let records = match request.limit {
                Some(n) => hits.truncated(n),
                None => hits,
            };
            ViewPayload::Data { total, records }
        }
    }
}
