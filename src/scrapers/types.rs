use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;
use thiserror::Error;

/// Errors from a single page request
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

/// How the pause between detail requests is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailDelay {
    /// Draw one delay at the start of the run and reuse it
    #[allow(dead_code)]
    PerRun,
    /// Draw a fresh delay before every request
    PerRequest,
}

/// Hands out detail-page delays according to a [`DetailDelay`] policy
#[derive(Debug, Clone)]
pub struct DelaySampler {
    policy: DetailDelay,
    max_secs: f64,
    fixed: Duration,
}

impl DelaySampler {
    pub fn new(policy: DetailDelay, max_secs: f64) -> Self {
        let max_secs = max_secs.max(0.0);
        let fixed = uniform_secs(max_secs);
        Self {
            policy,
            max_secs,
            fixed,
        }
    }

    pub fn next_delay(&self) -> Duration {
        match self.policy {
            DetailDelay::PerRun => self.fixed,
            DetailDelay::PerRequest => uniform_secs(self.max_secs),
        }
    }
}

fn uniform_secs(max_secs: f64) -> Duration {
    if max_secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(rand::rng().random_range(0.0..=max_secs))
}

/// Whole-second pause drawn from an inclusive range
pub fn whole_second_delay(range: &RangeInclusive<u64>) -> Duration {
    if range.is_empty() {
        return Duration::ZERO;
    }
    Duration::from_secs(rand::rng().random_range(range.clone()))
}

/// Counters for one detail-fetch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub attempted: usize,
    pub parsed: usize,
    pub transport_failures: usize,
    pub parse_failures: usize,
}
