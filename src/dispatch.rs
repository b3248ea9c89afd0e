//! Alert dispatch policy: decides, per monitoring cycle, whether the AI
//! melody path or the cached result is presented.
//!
//! The policy owns the request throttle and the melody cache. The actual
//! network fetch is injected as an async closure, so the throttle contract
//! can be exercised without a live service. The policy never blocks the
//! deterministic fallback: a failed fetch yields advice with no melody and
//! the caller falls back to the mood-mapped tone.

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::ai::FetchError;
use crate::melody::{self, ParseOutcome};
use crate::models::ToneStep;

// ---

/// What to present this cycle. `melody: None` means the deterministic tone
/// path should be used; `message: None` means there is nothing cached yet
/// and the display falls back to the status-derived line.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertAdvice {
    // ---
    pub melody: Option<Vec<ToneStep>>,
    pub message: Option<String>,
}

impl AlertAdvice {
    fn empty() -> Self {
        Self {
            melody: None,
            message: None,
        }
    }
}

/// Throttled, cached gateway in front of the melody service.
pub struct AlertDispatchPolicy {
    // ---
    min_interval: Duration,
    last_fetch: Option<Instant>,
    cached: Option<(Vec<ToneStep>, String)>,
}

impl AlertDispatchPolicy {
    pub fn new(min_interval: Duration) -> Self {
        // ---
        Self {
            min_interval,
            last_fetch: None,
            cached: None,
        }
    }

    /// Advice from the cache alone, with no network activity. Used when the
    /// AI path is disabled entirely.
    pub fn cached(&self) -> AlertAdvice {
        // ---
        match &self.cached {
            Some((melody, message)) => AlertAdvice {
                melody: Some(melody.clone()),
                message: Some(message.clone()),
            },
            None => AlertAdvice::empty(),
        }
    }

    /// Whether the minimum request interval has elapsed since the last
    /// successful fetch.
    fn interval_elapsed(&self) -> bool {
        // ---
        match self.last_fetch {
            Some(at) => at.elapsed() >= self.min_interval,
            None => true,
        }
    }

    /// Decide this cycle's melody/message.
    ///
    /// Within the minimum request interval the cached pair is returned and
    /// `fetch` is never invoked; this bounds the outbound request rate
    /// regardless of loop frequency. On fetch success the reply is parsed
    /// and cached; on any failure the cache and timestamp stay untouched so
    /// the next eligible cycle retries.
    pub async fn decide<F, Fut>(&mut self, fetch: F) -> AlertAdvice
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, FetchError>>,
    {
        // ---
        if !self.interval_elapsed() {
            return self.cached();
        }

        match fetch().await {
            Ok(text) => {
                let reply = melody::parse(&text);
                if reply.outcome == ParseOutcome::Complete {
                    info!("AI reply: {}", reply.message);
                } else {
                    warn!(?reply.outcome, "AI reply only partially usable");
                }

                self.cached = Some((reply.melody.clone(), reply.message.clone()));
                self.last_fetch = Some(Instant::now());

                AlertAdvice {
                    melody: Some(reply.melody),
                    message: Some(reply.message),
                }
            }
            Err(e) => {
                warn!("Melody fetch failed: {}", e);
                AlertAdvice {
                    melody: None,
                    message: Some(e.display_label().to_string()),
                }
            }
        }
    }
}
