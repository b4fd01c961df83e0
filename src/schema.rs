//! Column resolution and row normalization.
//!
//! Every data source produces a [`RawTable`] of string cells. This module
//! maps the source's column names onto [`CommentRecord`] fields, parses
//! each cell, and validates the sentiment/score invariant.
//!
//! # Column aliases
//!
//! | Field | Accepted headers | Required |
//! |-------|------------------|----------|
//! | date | `tanggal`, `date` | yes |
//! | like_count | `jumlah_like`, `like`, `likes`, `like_count` | yes |
//! | reply_count | `jumlah_reply`, `balasan`, `replies`, `reply_count` | yes |
//! | sentiment | `sentimen`, `sentiment` | yes |
//! | sentiment_score | `skor_sentimen`, `sentiment_score` | no |
//! | has_image | `memiliki_gambar`, `has_image` | no |
//! | has_video | `memiliki_video`, `has_video` | no |
//! | has_link | `memiliki_tautan`, `has_link` | no |
//! | text | `komentar`, `teks`, `text`, `comment` | no |
//!
//! Header matching is case-insensitive and ignores surrounding whitespace.
//! The first alias present wins.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{DashboardError, DashboardResult};
use crate::models::{CommentRecord, Sentiment};

pub const DATE_COLUMNS: &[&str] = &["tanggal", "date"];
pub const LIKE_COLUMNS: &[&str] = &["jumlah_like", "like", "likes", "like_count"];
pub const REPLY_COLUMNS: &[&str] = &["jumlah_reply", "balasan", "replies", "reply_count"];
pub const SENTIMENT_COLUMNS: &[&str] = &["sentimen", "sentiment"];
pub const SCORE_COLUMNS: &[&str] = &["skor_sentimen", "sentiment_score"];
pub const IMAGE_COLUMNS: &[&str] = &["memiliki_gambar", "has_image"];
pub const VIDEO_COLUMNS: &[&str] = &["memiliki_video", "has_video"];
pub const LINK_COLUMNS: &[&str] = &["memiliki_tautan", "has_link"];
pub const TEXT_COLUMNS: &[&str] = &["komentar", "teks", "text", "comment"];

/// String cells as read from a source, before typing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Appends another table's rows, aligning columns by header name.
    /// Columns unknown to `self` are added; missing cells become empty.
    pub fn append(&mut self, other: RawTable) {
        let mut mapping = Vec::with_capacity(other.headers.len());
        for h in &other.headers {
            let idx = match self.headers.iter().position(|x| x == h) {
                Some(i) => i,
                None => {
                    self.headers.push(h.clone());
                    for row in &mut self.rows {
                        row.push(String::new());
                    }
                    self.headers.len() - 1
                }
            };
            mapping.push(idx);
        }
        for row in other.rows {
            let mut aligned = vec![String::new(); self.headers.len()];
            for (cell, &idx) in row.into_iter().zip(mapping.iter()) {
                aligned[idx] = cell;
            }
            self.rows.push(aligned);
        }
    }
}

/// Resolved column positions for one table.
#[derive(Debug, Clone)]
struct ColumnMap {
    date: Column,
    likes: Column,
    replies: Column,
    sentiment: Column,
    score: Option<Column>,
    image: Option<Column>,
    video: Option<Column>,
    link: Option<Column>,
    text: Option<Column>,
}

#[derive(Debug, Clone)]
struct Column {
    index: usize,
    name: String,
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<Column> {
    aliases.iter().find_map(|alias| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(alias))
            .map(|index| Column {
                index,
                name: headers[index].trim().to_string(),
            })
    })
}

fn require_column(headers: &[String], field: &str, aliases: &[&str]) -> DashboardResult<Column> {
    find_column(headers, aliases).ok_or_else(|| DashboardError::MissingColumn {
        column: field.to_string(),
        accepted: aliases.join(", "),
    })
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> DashboardResult<Self> {
        Ok(Self {
            date: require_column(headers, "date", DATE_COLUMNS)?,
            likes: require_column(headers, "like_count", LIKE_COLUMNS)?,
            replies: require_column(headers, "reply_count", REPLY_COLUMNS)?,
            sentiment: require_column(headers, "sentiment", SENTIMENT_COLUMNS)?,
            score: find_column(headers, SCORE_COLUMNS),
            image: find_column(headers, IMAGE_COLUMNS),
            video: find_column(headers, VIDEO_COLUMNS),
            link: find_column(headers, LINK_COLUMNS),
            text: find_column(headers, TEXT_COLUMNS),
        })
    }
}

/// Converts a raw table into typed records, in source order.
pub fn parse_table(table: &RawTable) -> DashboardResult<Vec<CommentRecord>> {
    let columns = ColumnMap::resolve(&table.headers)?;
    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| parse_row(&columns, i + 1, row))
        .collect()
}

fn cell<'a>(row: &'a [String], column: &Column) -> &'a str {
    row.get(column.index).map(|s| s.trim()).unwrap_or("")
}

fn parse_row(columns: &ColumnMap, row_no: usize, row: &[String]) -> DashboardResult<CommentRecord> {
    let raw_date = cell(row, &columns.date);
    let date = parse_date(raw_date).ok_or_else(|| DashboardError::MalformedDate {
        row: row_no,
        column: columns.date.name.clone(),
        value: raw_date.to_string(),
    })?;

    let like_count = parse_count(row_no, &columns.likes, cell(row, &columns.likes))?;
    let reply_count = parse_count(row_no, &columns.replies, cell(row, &columns.replies))?;

    let raw_sentiment = cell(row, &columns.sentiment);
    let sentiment: Sentiment =
        raw_sentiment
            .parse()
            .map_err(|_| DashboardError::MalformedValue {
                row: row_no,
                column: columns.sentiment.name.clone(),
                value: raw_sentiment.to_string(),
                expected: "Positif/Negatif/Netral or Positive/Negative/Neutral",
            })?;

    if let Some(score_col) = &columns.score {
        let raw = cell(row, score_col);
        if !raw.is_empty() {
            let found = parse_integer(raw).ok_or_else(|| DashboardError::MalformedValue {
                row: row_no,
                column: score_col.name.clone(),
                value: raw.to_string(),
                expected: "integer -1, 0, or 1",
            })?;
            if found != i64::from(sentiment.score()) {
                return Err(DashboardError::SentimentMismatch {
                    row: row_no,
                    category: raw_sentiment.to_string(),
                    expected: sentiment.score(),
                    found,
                });
            }
        }
    }

    let text = columns
        .text
        .as_ref()
        .map(|c| cell(row, c))
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    Ok(CommentRecord {
        date,
        like_count,
        reply_count,
        sentiment,
        sentiment_score: sentiment.score(),
        has_image: parse_optional_flag(row_no, columns.image.as_ref(), row)?,
        has_video: parse_optional_flag(row_no, columns.video.as_ref(), row)?,
        has_link: parse_optional_flag(row_no, columns.link.as_ref(), row)?,
        text,
    })
}

/// Parses a date cell in any of the accepted formats.
///
/// Timestamps keep only their calendar date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return Some(d);
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Integer parser tolerant of pandas' float export (`"4.0"`).
fn parse_integer(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    let (whole, frac) = value.split_once('.')?;
    if !frac.is_empty() && frac.bytes().all(|b| b == b'0') {
        whole.parse::<i64>().ok()
    } else {
        None
    }
}

fn parse_count(row_no: usize, column: &Column, raw: &str) -> DashboardResult<u64> {
    parse_integer(raw)
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| DashboardError::MalformedValue {
            row: row_no,
            column: column.name.clone(),
            value: raw.to_string(),
            expected: "non-negative integer",
        })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "" | "0" | "0.0" | "false" | "no" | "tidak" => Some(false),
        "1" | "1.0" | "true" | "yes" | "ya" => Some(true),
        _ => None,
    }
}

fn parse_optional_flag(
    row_no: usize,
    column: Option<&Column>,
    row: &[String],
) -> DashboardResult<bool> {
    let Some(column) = column else {
        return Ok(false);
    };
    let raw = cell(row, column);
    parse_flag(raw).ok_or_else(|| DashboardError::MalformedValue {
        row: row_no,
        column: column.name.clone(),
        value: raw.to_string(),
        expected: "0/1 or true/false",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_indonesian_headers_with_derived_score() {
        let t = table(
            &["tanggal", "like", "balasan", "sentimen"],
            &[&["2024-01-01", "4", "0", "Positif"], &["2024-01-02", "2", "1", "Negatif"]],
        );
        let records = parse_table(&t).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sentiment, Sentiment::Positive);
        assert_eq!(records[0].sentiment_score, 1);
        assert_eq!(records[1].sentiment_score, -1);
        assert!(!records[1].has_image);
    }

    #[test]
    fn test_alias_and_case_insensitive_headers() {
        let t = table(
            &[" Tanggal ", "JUMLAH_LIKE", "jumlah_reply", "Sentimen", "memiliki_video", "komentar"],
            &[&["2024-01-01 08:30:00", "4.0", "0", "netral", "1", "Mantap sekali"]],
        );
        let records = parse_table(&t).unwrap();
        assert_eq!(records[0].like_count, 4);
        assert!(records[0].has_video);
        assert_eq!(records[0].text.as_deref(), Some("Mantap sekali"));
        assert_eq!(
            records[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_missing_required_column_named() {
        let t = table(&["tanggal", "like", "sentimen"], &[]);
        match parse_table(&t) {
            Err(DashboardError::MissingColumn { column, accepted }) => {
                assert_eq!(column, "reply_count");
                assert!(accepted.contains("balasan"));
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_date_reports_row() {
        let t = table(
            &["tanggal", "like", "balasan", "sentimen"],
            &[&["2024-01-01", "1", "0", "Positif"], &["kemarin", "1", "0", "Positif"]],
        );
        match parse_table(&t) {
            Err(DashboardError::MalformedDate { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "tanggal");
                assert_eq!(value, "kemarin");
            }
            other => panic!("expected MalformedDate, got {:?}", other),
        }
    }

    #[test]
    fn test_score_mismatch_flagged() {
        let t = table(
            &["tanggal", "like", "balasan", "sentimen", "skor_sentimen"],
            &[&["2024-01-01", "1", "0", "Positif", "-1"]],
        );
        assert!(matches!(
            parse_table(&t),
            Err(DashboardError::SentimentMismatch {
                expected: 1,
                found: -1,
                ..
            })
        ));
    }

    #[test]
    fn test_matching_score_accepted() {
        let t = table(
            &["tanggal", "like", "balasan", "sentimen", "skor_sentimen"],
            &[&["2024-01-01", "1", "0", "Netral", "0"]],
        );
        assert_eq!(parse_table(&t).unwrap()[0].sentiment_score, 0);
    }

    #[test]
    fn test_negative_count_rejected() {
        let t = table(
            &["tanggal", "like", "balasan", "sentimen"],
            &[&["2024-01-01", "-3", "0", "Positif"]],
        );
        assert!(matches!(
            parse_table(&t),
            Err(DashboardError::MalformedValue { .. })
        ));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(parse_date("2024-02-29"), Some(expected));
        assert_eq!(parse_date("29/02/2024"), Some(expected));
        assert_eq!(parse_date("2024-02-29T23:10:00"), Some(expected));
        assert_eq!(parse_date("2024-02-29T10:00:00+07:00"), Some(expected));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn test_append_aligns_columns() {
        let mut a = table(&["tanggal", "like"], &[&["2024-01-01", "1"]]);
        let b = table(&["like", "tanggal", "balasan"], &[&["5", "2024-01-02", "1"]]);
        a.append(b);
        assert_eq!(a.headers, vec!["tanggal", "like", "balasan"]);
        assert_eq!(a.rows[0], vec!["2024-01-01", "1", ""]);
        assert_eq!(a.rows[1], vec!["2024-01-02", "5", "1"]);
    }
}
