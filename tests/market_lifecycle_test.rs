//! Chart-and-stats lifecycle driven end to end through the service layer:
//! a successful fetch populates the snapshot, a later fetch that filters down
//! to too few points clears every statistic instead of leaking stale values.

use async_trait::async_trait;
use chrono::{Duration, Local};

use cordoba_notes::errors::AppError;
use cordoba_notes::external::chart_renderer::DisabledChartRenderer;
use cordoba_notes::external::price_provider::{PriceProvider, PriceProviderError};
use cordoba_notes::models::{MarketStats, PricePoint, RangeTag};
use cordoba_notes::services::market_service;
use cordoba_notes::services::market_snapshot::MarketSnapshot;

/// Provider with a fixed series: twelve consecutive days starting ~300 days
/// ago, plus three points inside the last six months. A one-year window keeps
/// all fifteen points; a six-month window keeps only three.
struct ScriptedProvider;

#[async_trait]
impl PriceProvider for ScriptedProvider {
    async fn fetch_daily_history(
        &self,
        _ticker: &str,
    ) -> Result<Vec<PricePoint>, PriceProviderError> {
        let today = Local::now().date_naive();
        let mut series = Vec::new();

        for i in 0..12 {
            series.push(PricePoint {
                date: today - Duration::days(300 - i),
                close: 50.0 + i as f64,
            });
        }
        for (offset, close) in [(10, 70.0), (5, 72.0), (1, 75.0)] {
            series.push(PricePoint {
                date: today - Duration::days(offset),
                close,
            });
        }

        Ok(series)
    }
}

struct FailingProvider;

#[async_trait]
impl PriceProvider for FailingProvider {
    async fn fetch_daily_history(
        &self,
        _ticker: &str,
    ) -> Result<Vec<PricePoint>, PriceProviderError> {
        Err(PriceProviderError::Network("connection refused".to_string()))
    }
}

#[tokio::test]
async fn successful_fetch_populates_all_stats() {
    let snapshot = MarketSnapshot::new();
    snapshot.set_target(Some(90.0));

    let view = market_service::fetch_and_compute(
        &ScriptedProvider,
        &DisabledChartRenderer,
        &snapshot,
        "CRG.L",
        RangeTag::OneYear,
    )
    .await
    .unwrap();

    assert_eq!(view.phase, "ready");
    assert_eq!(view.stats.current_price, Some(75.0));
    // first close 50, last close 75
    assert!((view.stats.range_return.unwrap() - 0.5).abs() < 1e-12);
    assert!(view.stats.realised_vol_ann.unwrap() > 0.0);
    assert!((view.stats.upside_to_target.unwrap() - 0.2).abs() < 1e-12);
}

#[tokio::test]
async fn narrowing_the_range_below_minimum_clears_stats_wholesale() {
    let snapshot = MarketSnapshot::new();

    market_service::fetch_and_compute(
        &ScriptedProvider,
        &DisabledChartRenderer,
        &snapshot,
        "CRG.L",
        RangeTag::OneYear,
    )
    .await
    .unwrap();
    assert_eq!(snapshot.view().phase, "ready");

    let err = market_service::fetch_and_compute(
        &ScriptedProvider,
        &DisabledChartRenderer,
        &snapshot,
        "CRG.L",
        RangeTag::SixMonths,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Insufficient(_)));

    // No stale fifteen-point stats survive the failed narrower fetch.
    let view = snapshot.view();
    assert_eq!(view.phase, "failed");
    assert_eq!(view.stats, MarketStats::unavailable());
    assert!(!view.has_chart);
}

#[tokio::test]
async fn network_failure_clears_previous_success() {
    let snapshot = MarketSnapshot::new();

    market_service::fetch_and_compute(
        &ScriptedProvider,
        &DisabledChartRenderer,
        &snapshot,
        "CRG.L",
        RangeTag::OneYear,
    )
    .await
    .unwrap();

    let err = market_service::fetch_and_compute(
        &FailingProvider,
        &DisabledChartRenderer,
        &snapshot,
        "CRG.L",
        RangeTag::OneYear,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::External(_)));
    assert_eq!(snapshot.view().stats, MarketStats::unavailable());
}

#[tokio::test]
async fn reset_returns_to_idle_from_any_phase() {
    let snapshot = MarketSnapshot::new();

    market_service::fetch_and_compute(
        &ScriptedProvider,
        &DisabledChartRenderer,
        &snapshot,
        "CRG.L",
        RangeTag::OneYear,
    )
    .await
    .unwrap();

    snapshot.reset();
    let view = snapshot.view();
    assert_eq!(view.phase, "idle");
    assert_eq!(view.stats, MarketStats::unavailable());
    assert_eq!(view.target_price, None);
}
