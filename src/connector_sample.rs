//! Deterministic synthetic dataset.
//!
//! Generates one comment per day starting at `start_date`, seeded so the
//! same config always yields the same table. Useful for demos and for
//! running the dashboard before a real dataset is wired in.
//!
//! | Column | Distribution |
//! |--------|--------------|
//! | `like` | Poisson(4) |
//! | `balasan` | Bernoulli(0.25) |
//! | `sentimen` | Positif 0.35, Negatif 0.45, Netral 0.20 |
//! | `memiliki_gambar` / `_video` / `_tautan` | Bernoulli(0.3 / 0.1 / 0.2) |

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use rand::distributions::{Bernoulli, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Poisson};

use crate::config::SourceConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::models::Sentiment;
use crate::schema::RawTable;
use crate::traits::DataSource;

/// Upper bound on `source.rows`.
pub const MAX_SAMPLE_ROWS: usize = 100_000;

const LIKE_MEAN: f64 = 4.0;
const REPLY_P: f64 = 0.25;
const IMAGE_P: f64 = 0.3;
const VIDEO_P: f64 = 0.1;
const LINK_P: f64 = 0.2;
const SENTIMENT_WEIGHTS: [(Sentiment, f64); 3] = [
    (Sentiment::Positive, 0.35),
    (Sentiment::Negative, 0.45),
    (Sentiment::Neutral, 0.20),
];

pub struct SampleSource {
    label: String,
    rows: usize,
    seed: u64,
    start: NaiveDate,
}

/// The per-column distributions, built once per generation.
struct Distributions {
    likes: Poisson<f64>,
    sentiment: WeightedIndex<f64>,
    reply: Bernoulli,
    image: Bernoulli,
    video: Bernoulli,
    link: Bernoulli,
}

impl Distributions {
    fn new(source: &str) -> DashboardResult<Self> {
        let fail = |e: String| DashboardError::unavailable(source, e);
        let bernoulli = |p: f64| Bernoulli::new(p).map_err(|e| fail(e.to_string()));
        Ok(Self {
            likes: Poisson::new(LIKE_MEAN).map_err(|e| fail(e.to_string()))?,
            sentiment: WeightedIndex::new(SENTIMENT_WEIGHTS.iter().map(|(_, w)| *w))
                .map_err(|e| fail(e.to_string()))?,
            reply: bernoulli(REPLY_P)?,
            image: bernoulli(IMAGE_P)?,
            video: bernoulli(VIDEO_P)?,
            link: bernoulli(LINK_P)?,
        })
    }
}

impl SampleSource {
    pub fn new(rows: usize, seed: u64, start: NaiveDate) -> Self {
        Self {
            label: format!("{}x{}", rows, seed),
            rows,
            seed,
            start,
        }
    }

    pub fn from_config(config: &SourceConfig) -> DashboardResult<Self> {
        let start = config
            .start_date()
            .map_err(|e| DashboardError::unavailable("sample", e))?;
        Ok(Self::new(config.rows, config.seed, start))
    }

    fn generate(&self) -> DashboardResult<RawTable> {
        let dist = Distributions::new(&self.label)?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut table = RawTable::new(
            [
                "tanggal",
                "like",
                "balasan",
                "sentimen",
                "skor_sentimen",
                "memiliki_gambar",
                "memiliki_video",
                "memiliki_tautan",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        );

        let flag = |b: bool| if b { "1" } else { "0" }.to_string();
        for i in 0..self.rows {
            let date = self.start.checked_add_days(Days::new(i as u64)).ok_or_else(|| {
                DashboardError::unavailable(
                    &self.label,
                    format!("{} rows from {} run past the last representable date", self.rows, self.start),
                )
            })?;
            let likes: f64 = dist.likes.sample(&mut rng);
            let sentiment = SENTIMENT_WEIGHTS[dist.sentiment.sample(&mut rng)].0;
            table.rows.push(vec![
                date.format("%Y-%m-%d").to_string(),
                (likes as u64).to_string(),
                flag(dist.reply.sample(&mut rng)),
                sentiment.source_label().to_string(),
                sentiment.score().to_string(),
                flag(dist.image.sample(&mut rng)),
                flag(dist.video.sample(&mut rng)),
                flag(dist.link.sample(&mut rng)),
            ]);
        }
        Ok(table)
    }
}

#[async_trait]
impl DataSource for SampleSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn kind(&self) -> &str {
        "sample"
    }

    async fn fetch(&self) -> DashboardResult<RawTable> {
        self.generate()
    }
}
