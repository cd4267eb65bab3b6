//! Market statistics: pure functions from a daily price series (plus an
//! optional target price) to derived stats, and the fetch lifecycle that
//! feeds the shared snapshot.

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::external::chart_renderer::{ChartError, ChartRenderer};
use crate::external::price_provider::PriceProvider;
use crate::models::{MarketStats, PricePoint, RangeTag};
use crate::services::market_snapshot::{MarketSnapshot, SnapshotView};

/// Fewer filtered points than this and the whole computation fails as
/// insufficient data; no partial stats survive.
pub const MIN_FILTERED_POINTS: usize = 10;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Retain only points on or after the range cutoff.
pub fn filter_range(series: &[PricePoint], range: RangeTag, today: NaiveDate) -> Vec<PricePoint> {
    let cutoff = range.cutoff(today);
    series
        .iter()
        .filter(|p| p.date >= cutoff)
        .cloned()
        .collect()
}

/// Simple daily returns over adjacent closes. Pairs with a non-positive or
/// non-finite previous close are skipped.
pub fn daily_returns(series: &[PricePoint]) -> Vec<f64> {
    series
        .windows(2)
        .filter_map(|w| {
            let (prev, cur) = (w[0].close, w[1].close);
            if prev > 0.0 && prev.is_finite() && cur.is_finite() {
                Some(cur / prev - 1.0)
            } else {
                None
            }
        })
        .collect()
}

/// Annualized realised volatility: sample standard deviation of the daily
/// returns (n−1 divisor) scaled by √252. A single return has no dispersion
/// estimate, so the guarded result is 0. Empty input is unavailable.
pub fn realised_vol_ann(returns: &[f64]) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }
    if returns.len() == 1 {
        return Some(0.0);
    }

    let n = returns.len() as f64;
    let mean = returns.iter().copied().sum::<f64>() / n;
    let variance = returns
        .iter()
        .map(|r| (r - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);

    Some(variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Return over the whole filtered window: `last/first − 1`.
pub fn range_return(series: &[PricePoint]) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    let first = series.first()?.close;
    let last = series.last()?.close;
    if !first.is_finite() || !last.is_finite() || first <= 0.0 {
        return None;
    }
    Some(last / first - 1.0)
}

/// Proportional gap between the target and the current price. Needs only the
/// two scalars, so it is recomputed reactively on any target change without
/// refetching.
pub fn upside_to_target(current_price: f64, target_price: f64) -> Option<f64> {
    if !current_price.is_finite() || !target_price.is_finite() {
        return None;
    }
    if current_price <= 0.0 || target_price <= 0.0 {
        return None;
    }
    Some(target_price / current_price - 1.0)
}

/// All four statistics from an already range-filtered series. Fails wholesale
/// below the minimum point count.
pub fn compute_stats(
    filtered: &[PricePoint],
    target_price: Option<f64>,
) -> Result<MarketStats, AppError> {
    if filtered.len() < MIN_FILTERED_POINTS {
        return Err(AppError::Insufficient(format!(
            "only {} points in range, need at least {}",
            filtered.len(),
            MIN_FILTERED_POINTS
        )));
    }

    let current_price = filtered.last().map(|p| p.close).filter(|c| c.is_finite());
    let returns = daily_returns(filtered);

    Ok(MarketStats {
        current_price,
        range_return: range_return(filtered),
        realised_vol_ann: realised_vol_ann(&returns),
        upside_to_target: current_price
            .zip(target_price)
            .and_then(|(cur, target)| upside_to_target(cur, target)),
    })
}

/// Run one chart-and-stats fetch: stamp a generation, fetch, filter, compute,
/// render, commit. A commit whose generation has been superseded by a newer
/// fetch or a reset is discarded, so a late-arriving stale response can never
/// overwrite newer state.
pub async fn fetch_and_compute(
    provider: &dyn PriceProvider,
    renderer: &dyn ChartRenderer,
    snapshot: &MarketSnapshot,
    ticker: &str,
    range: RangeTag,
) -> Result<SnapshotView, AppError> {
    let generation = snapshot.begin_fetch(ticker, range);
    info!("Fetching {} over {} (generation {})", ticker, range.label(), generation);

    let series = match provider.fetch_daily_history(ticker).await {
        Ok(series) => series,
        Err(e) => {
            snapshot.commit_failed(generation, &e.to_string());
            return Err(e.into());
        }
    };

    let today = Local::now().date_naive();
    let filtered = filter_range(&series, range, today);

    let stats = match compute_stats(&filtered, snapshot.target_price()) {
        Ok(stats) => stats,
        Err(e) => {
            snapshot.commit_failed(generation, &e.to_string());
            return Err(e);
        }
    };

    // Chart failure is per-item: the stats stand, the image is just omitted.
    let chart = match renderer.render(&filtered).await {
        Ok(png) => Some(png),
        Err(ChartError::Unavailable(msg)) => {
            info!("Chart omitted for {}: {}", ticker, msg);
            None
        }
        Err(e) => {
            warn!("Chart rendering failed for {}: {}", ticker, e);
            None
        }
    };

    if !snapshot.commit_ready(generation, stats, chart) {
        info!("Discarding stale fetch result for {} (generation {})", ticker, generation);
        return Err(AppError::External(
            "fetch superseded by a newer request".to_string(),
        ));
    }

    info!("✓ Market stats ready for {} ({} points)", ticker, filtered.len());
    Ok(snapshot.view())
}
