//! Shared chart-and-stats state for the currently charted ticker.
//!
//! One holder per process, owned by `AppState`. Every transition replaces the
//! whole snapshot under one lock, so consumers never observe a partial mix of
//! old and new statistics. A generation counter, bumped on each fetch start
//! and each reset, lets late-arriving responses be recognized as stale and
//! discarded instead of overwriting newer state.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use crate::models::{MarketStats, RangeTag};
use crate::services::market_service::upside_to_target;

#[derive(Debug)]
enum Phase {
    Idle,
    Fetching {
        ticker: String,
        range: RangeTag,
    },
    Ready {
        ticker: String,
        range: RangeTag,
        stats: MarketStats,
        chart: Option<Vec<u8>>,
    },
    Failed {
        message: String,
    },
}

struct Inner {
    generation: u64,
    phase: Phase,
    target_price: Option<f64>,
}

#[derive(Clone)]
pub struct MarketSnapshot {
    inner: Arc<Mutex<Inner>>,
}

impl Default for MarketSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketSnapshot {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                generation: 0,
                phase: Phase::Idle,
                target_price: None,
            })),
        }
    }

    /// Start a fetch: clears any previous result and returns the generation
    /// token the eventual commit must present.
    pub fn begin_fetch(&self, ticker: &str, range: RangeTag) -> u64 {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.phase = Phase::Fetching {
            ticker: ticker.to_string(),
            range,
        };
        inner.generation
    }

    /// Commit a successful fetch. Returns false (and changes nothing) when
    /// the generation has been superseded.
    pub fn commit_ready(
        &self,
        generation: u64,
        mut stats: MarketStats,
        chart: Option<Vec<u8>>,
    ) -> bool {
        let mut inner = self.inner.lock();
        if generation != inner.generation {
            return false;
        }
        let (ticker, range) = match &inner.phase {
            Phase::Fetching { ticker, range } => (ticker.clone(), *range),
            _ => return false,
        };

        stats.upside_to_target = inner
            .target_price
            .zip(stats.current_price)
            .and_then(|(target, current)| upside_to_target(current, target));

        inner.phase = Phase::Ready {
            ticker,
            range,
            stats,
            chart,
        };
        true
    }

    /// Commit a failed fetch: all four statistics and the chart image are
    /// cleared together. Stale generations are ignored.
    pub fn commit_failed(&self, generation: u64, message: &str) -> bool {
        let mut inner = self.inner.lock();
        if generation != inner.generation {
            return false;
        }
        inner.phase = Phase::Failed {
            message: message.to_string(),
        };
        true
    }

    /// Form reset: back to Idle from any phase, everything cleared. Also
    /// bumps the generation so an in-flight fetch cannot resurrect state.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.phase = Phase::Idle;
        inner.target_price = None;
    }

    /// Store the target price and recompute the upside reactively from the
    /// already-fetched current price. No refetch.
    pub fn set_target(&self, target_price: Option<f64>) {
        let mut inner = self.inner.lock();
        inner.target_price = target_price;
        if let Phase::Ready { stats, .. } = &mut inner.phase {
            stats.upside_to_target = target_price
                .zip(stats.current_price)
                .and_then(|(target, current)| upside_to_target(current, target));
        }
    }

    pub fn target_price(&self) -> Option<f64> {
        self.inner.lock().target_price
    }

    /// Stats and chart for merging into an equity section; None unless Ready.
    pub fn equity_data(&self) -> Option<(MarketStats, Option<Vec<u8>>)> {
        let inner = self.inner.lock();
        match &inner.phase {
            Phase::Ready { stats, chart, .. } => Some((*stats, chart.clone())),
            _ => None,
        }
    }

    /// Captured chart image, if the last fetch produced one.
    pub fn chart_image(&self) -> Option<Vec<u8>> {
        let inner = self.inner.lock();
        match &inner.phase {
            Phase::Ready { chart, .. } => chart.clone(),
            _ => None,
        }
    }

    pub fn view(&self) -> SnapshotView {
        let inner = self.inner.lock();
        match &inner.phase {
            Phase::Idle => SnapshotView {
                phase: "idle",
                ticker: None,
                range: None,
                stats: MarketStats::unavailable(),
                has_chart: false,
                target_price: inner.target_price,
                message: None,
            },
            Phase::Fetching { ticker, range } => SnapshotView {
                phase: "fetching",
                ticker: Some(ticker.clone()),
                range: Some(range.label()),
                stats: MarketStats::unavailable(),
                has_chart: false,
                target_price: inner.target_price,
                message: None,
            },
            Phase::Ready {
                ticker,
                range,
                stats,
                chart,
            } => SnapshotView {
                phase: "ready",
                ticker: Some(ticker.clone()),
                range: Some(range.label()),
                stats: *stats,
                has_chart: chart.is_some(),
                target_price: inner.target_price,
                message: None,
            },
            Phase::Failed { message } => SnapshotView {
                phase: "failed",
                ticker: None,
                range: None,
                stats: MarketStats::unavailable(),
                has_chart: false,
                target_price: inner.target_price,
                message: Some(message.clone()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotView {
    pub phase: &'static str,
    pub ticker: Option<String>,
    pub range: Option<&'static str>,
    pub stats: MarketStats,
    pub has_chart: bool,
    pub target_price: Option<f64>,
    pub message: Option<String>,
}
