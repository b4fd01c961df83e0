//! Aggregate views derived from a [`FilteredView`].
//!
//! Every function here is pure: the same view always yields the same
//! result, and an empty view yields zero counts and NaN averages rather
//! than an error. NaN serializes as `null` in JSON output.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::filter::FilteredView;
use crate::models::{CommentRecord, Sentiment};

/// Average sentiment above `+threshold` (or below `-threshold`) is labelled
/// dominantly positive (negative). Overridable via
/// `analysis.sentiment_threshold`.
pub const DEFAULT_SENTIMENT_THRESHOLD: f64 = 0.05;

/// Headline scalars for a view.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Summary {
    pub count: usize,
    pub avg_likes: f64,
    pub avg_replies: f64,
    pub avg_sentiment_score: f64,
}

pub fn summarize(view: &FilteredView<'_>) -> Summary {
    Summary {
        count: view.len(),
        avg_likes: mean(view.iter().map(|r| r.like_count as f64)),
        avg_replies: mean(view.iter().map(|r| r.reply_count as f64)),
        avg_sentiment_score: mean(view.iter().map(|r| f64::from(r.sentiment_score))),
    }
}

/// Arithmetic mean; NaN for an empty input.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentimentLabel {
    #[serde(rename = "Dominantly Positive")]
    DominantlyPositive,
    #[serde(rename = "Dominantly Negative")]
    DominantlyNegative,
    #[serde(rename = "Neutral/Mixed")]
    NeutralMixed,
}

impl SentimentLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::DominantlyPositive => "Dominantly Positive",
            SentimentLabel::DominantlyNegative => "Dominantly Negative",
            SentimentLabel::NeutralMixed => "Neutral/Mixed",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labels an average sentiment score. NaN (empty view) is Neutral/Mixed.
pub fn classify_sentiment_label(avg_sentiment_score: f64, threshold: f64) -> SentimentLabel {
    if avg_sentiment_score > threshold {
        SentimentLabel::DominantlyPositive
    } else if avg_sentiment_score < -threshold {
        SentimentLabel::DominantlyNegative
    } else {
        SentimentLabel::NeutralMixed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: usize,
}

/// Records per date, ascending, one entry per date present in the view.
///
/// Dates without records are left out; use [`zero_fill`] to materialize them.
pub fn daily_trend(view: &FilteredView<'_>) -> Vec<TrendPoint> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for r in view.iter() {
        *counts.entry(r.date).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(date, count)| TrendPoint { date, count })
        .collect()
}

/// Inserts zero-count points for each missing day between the first and
/// last point of an ascending trend.
pub fn zero_fill(trend: &[TrendPoint]) -> Vec<TrendPoint> {
    let (Some(first), Some(last)) = (trend.first(), trend.last()) else {
        return Vec::new();
    };
    let mut filled = Vec::new();
    let mut existing = trend.iter().peekable();
    let mut day = first.date;
    loop {
        let count = match existing.peek() {
            Some(p) if p.date == day => {
                let c = p.count;
                existing.next();
                c
            }
            _ => 0,
        };
        filled.push(TrendPoint { date: day, count });
        match day.succ_opt() {
            Some(next) if next <= last.date => day = next,
            _ => break,
        }
    }
    filled
}

/// Count per sentiment category present in the view.
pub fn sentiment_distribution(view: &FilteredView<'_>) -> BTreeMap<Sentiment, usize> {
    let mut counts = BTreeMap::new();
    for r in view.iter() {
        *counts.entry(r.sentiment).or_insert(0) += 1;
    }
    counts
}

/// Numeric columns entering the correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    HasImage,
    HasVideo,
    HasLink,
    LikeCount,
    ReplyCount,
    SentimentScore,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 6] = [
        NumericColumn::HasImage,
        NumericColumn::HasVideo,
        NumericColumn::HasLink,
        NumericColumn::LikeCount,
        NumericColumn::ReplyCount,
        NumericColumn::SentimentScore,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NumericColumn::HasImage => "has_image",
            NumericColumn::HasVideo => "has_video",
            NumericColumn::HasLink => "has_link",
            NumericColumn::LikeCount => "like_count",
            NumericColumn::ReplyCount => "reply_count",
            NumericColumn::SentimentScore => "sentiment_score",
        }
    }

    pub fn value(self, r: &CommentRecord) -> f64 {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match self {
            NumericColumn::HasImage => flag(r.has_image),
            NumericColumn::HasVideo => flag(r.has_video),
            NumericColumn::HasLink => flag(r.has_link),
            NumericColumn::LikeCount => r.like_count as f64,
            NumericColumn::ReplyCount => r.reply_count as f64,
            NumericColumn::SentimentScore => f64::from(r.sentiment_score),
        }
    }
}

/// Symmetric matrix of Pearson coefficients, row-major in `columns` order.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    pub matrix: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: NumericColumn, b: NumericColumn) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == a)?;
        let j = self.columns.iter().position(|c| *c == b)?;
        Some(self.matrix[i][j])
    }
}

/// Pairwise Pearson correlation over `columns`.
///
/// Entries involving a constant column (zero variance) are NaN, as is the
/// whole matrix when the view has fewer than two records. Non-constant
/// columns have exactly 1.0 on the diagonal.
pub fn correlation_matrix(view: &FilteredView<'_>, columns: &[NumericColumn]) -> CorrelationMatrix {
    let series: Vec<Vec<f64>> = columns
        .iter()
        .map(|c| view.iter().map(|r| c.value(r)).collect())
        .collect();

    let k = columns.len();
    let mut matrix = vec![vec![f64::NAN; k]; k];
    for i in 0..k {
        for j in i..k {
            let rho = if i == j {
                if variance_is_zero(&series[i]) {
                    f64::NAN
                } else {
                    1.0
                }
            } else {
                pearson(&series[i], &series[j])
            };
            matrix[i][j] = rho;
            matrix[j][i] = rho;
        }
    }

    CorrelationMatrix {
        columns: columns.to_vec(),
        matrix,
    }
}

fn variance_is_zero(xs: &[f64]) -> bool {
    match xs.first() {
        Some(first) => xs.len() < 2 || xs.iter().all(|x| x == first),
        None => true,
    }
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 || variance_is_zero(xs) || variance_is_zero(ys) {
        return f64::NAN;
    }
    let mx = xs.iter().sum::<f64>() / n as f64;
    let my = ys.iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}
