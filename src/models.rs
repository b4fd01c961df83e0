//! Core data models used throughout the dashboard.
//!
//! These types represent the comment records, the loaded dataset, and the
//! filter criteria that flow from the loader through the aggregation engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

/// Three-way sentiment classification attached to each comment.
///
/// Ordering (`Positive < Negative < Neutral`) fixes the iteration order of
/// distributions and category sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    /// Integer encoding used for numeric aggregation.
    pub fn score(self) -> i8 {
        match self {
            Sentiment::Positive => 1,
            Sentiment::Neutral => 0,
            Sentiment::Negative => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }

    /// Label used in the Indonesian source datasets and CSV export.
    pub fn source_label(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positif",
            Sentiment::Negative => "Negatif",
            Sentiment::Neutral => "Netral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "positif" | "pos" => Ok(Sentiment::Positive),
            "negative" | "negatif" | "neg" => Ok(Sentiment::Negative),
            "neutral" | "netral" | "net" => Ok(Sentiment::Neutral),
            other => Err(format!(
                "unknown sentiment '{}'. Must be positive, negative, or neutral.",
                other
            )),
        }
    }
}

/// One row of the source dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    pub date: NaiveDate,
    pub like_count: u64,
    pub reply_count: u64,
    pub sentiment: Sentiment,
    pub sentiment_score: i8,
    pub has_image: bool,
    pub has_video: bool,
    pub has_link: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CommentRecord {
    /// Builds a record whose score is derived from its sentiment.
    pub fn new(date: NaiveDate, like_count: u64, reply_count: u64, sentiment: Sentiment) -> Self {
        Self {
            date,
            like_count,
            reply_count,
            sentiment,
            sentiment_score: sentiment.score(),
            has_image: false,
            has_video: false,
            has_link: false,
            text: None,
        }
    }

    /// String form of every field, as matched by keyword search.
    pub fn field_strings(&self) -> Vec<String> {
        let flag = |b: bool| if b { "1" } else { "0" }.to_string();
        let mut fields = vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.like_count.to_string(),
            self.reply_count.to_string(),
            self.sentiment.as_str().to_string(),
            self.sentiment.source_label().to_string(),
            self.sentiment_score.to_string(),
            flag(self.has_image),
            flag(self.has_video),
            flag(self.has_link),
        ];
        if let Some(text) = &self.text {
            fields.push(text.clone());
        }
        fields
    }
}

/// The loaded dataset: records ascending by date, immutable after load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<CommentRecord>,
}

impl Dataset {
    /// Sorts the records by date. The sort is stable, so same-day records
    /// keep their source order.
    pub fn from_records(mut records: Vec<CommentRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    pub fn records(&self) -> &[CommentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last date present, if any.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}

/// User-selected filter for one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub sentiments: BTreeSet<Sentiment>,
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            sentiments: Sentiment::ALL.into_iter().collect(),
            since: None,
            until: None,
        }
    }
}

impl FilterCriteria {
    /// Builds criteria, rejecting an inverted date range.
    ///
    /// An empty `sentiments` set is accepted and selects nothing.
    pub fn new(
        sentiments: impl IntoIterator<Item = Sentiment>,
        since: Option<NaiveDate>,
        until: Option<NaiveDate>,
    ) -> Result<Self, DashboardError> {
        if let (Some(s), Some(u)) = (since, until) {
            if s > u {
                return Err(DashboardError::InvalidFilter(format!(
                    "since ({}) is after until ({})",
                    s, u
                )));
            }
        }
        Ok(Self {
            sentiments: sentiments.into_iter().collect(),
            since,
            until,
        })
    }

    pub fn matches(&self, record: &CommentRecord) -> bool {
        self.sentiments.contains(&record.sentiment)
            && self.since.map_or(true, |s| record.date >= s)
            && self.until.map_or(true, |u| record.date <= u)
    }
}

/// Parse a `YYYY-MM-DD` filter bound.
pub fn parse_filter_date(value: &str) -> Result<NaiveDate, DashboardError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        DashboardError::InvalidFilter(format!("date '{}' is not YYYY-MM-DD", value))
    })
}

/// Parse a list of sentiment names, each entry possibly comma separated.
pub fn parse_sentiments<S: AsRef<str>>(values: &[S]) -> Result<Vec<Sentiment>, DashboardError> {
    values
        .iter()
        .flat_map(|v| v.as_ref().split(','))
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<Sentiment>().map_err(DashboardError::InvalidFilter))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_sentiment_scores() {
        assert_eq!(Sentiment::Positive.score(), 1);
        assert_eq!(Sentiment::Neutral.score(), 0);
        assert_eq!(Sentiment::Negative.score(), -1);
    }

    #[test]
    fn test_sentiment_parse_both_languages() {
        assert_eq!("Positif".parse::<Sentiment>().unwrap(), Sentiment::Positive);
        assert_eq!("NEGATIVE".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert_eq!(" netral ".parse::<Sentiment>().unwrap(), Sentiment::Neutral);
        assert!("mixed".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_dataset_sorted_stable() {
        let mut a = CommentRecord::new(d("2024-01-02"), 1, 0, Sentiment::Positive);
        a.text = Some("first".into());
        let mut b = CommentRecord::new(d("2024-01-02"), 2, 0, Sentiment::Negative);
        b.text = Some("second".into());
        let c = CommentRecord::new(d("2024-01-01"), 3, 0, Sentiment::Neutral);

        let ds = Dataset::from_records(vec![a, b, c]);
        let dates: Vec<_> = ds.records().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d("2024-01-01"), d("2024-01-02"), d("2024-01-02")]);
        assert_eq!(ds.records()[1].text.as_deref(), Some("first"));
        assert_eq!(ds.date_span(), Some((d("2024-01-01"), d("2024-01-02"))));
    }

    #[test]
    fn test_criteria_rejects_inverted_range() {
        let err = FilterCriteria::new(Sentiment::ALL, Some(d("2024-02-01")), Some(d("2024-01-01")));
        assert!(matches!(err, Err(DashboardError::InvalidFilter(_))));
    }

    #[test]
    fn test_criteria_range_inclusive() {
        let c = FilterCriteria::new(Sentiment::ALL, Some(d("2024-01-02")), Some(d("2024-01-03")))
            .unwrap();
        assert!(!c.matches(&CommentRecord::new(d("2024-01-01"), 0, 0, Sentiment::Positive)));
        assert!(c.matches(&CommentRecord::new(d("2024-01-02"), 0, 0, Sentiment::Positive)));
        assert!(c.matches(&CommentRecord::new(d("2024-01-03"), 0, 0, Sentiment::Positive)));
    }

    #[test]
    fn test_parse_sentiments_comma_and_repeat() {
        let parsed = parse_sentiments(&["positive,netral", "Negatif"]).unwrap();
        assert_eq!(
            parsed,
            vec![Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative]
        );
        assert!(parse_sentiments(&["happy"]).is_err());
    }

    #[test]
    fn test_field_strings_include_text() {
        let mut r = CommentRecord::new(d("2024-03-05"), 12, 1, Sentiment::Negative);
        r.has_link = true;
        r.text = Some("Harga naik lagi".into());
        let fields = r.field_strings();
        assert!(fields.contains(&"2024-03-05".to_string()));
        assert!(fields.contains(&"-1".to_string()));
        assert!(fields.contains(&"Negative".to_string()));
        assert!(fields.contains(&"Negatif".to_string()));
        assert_eq!(fields.last().unwrap(), "Harga naik lagi");
    }
}
