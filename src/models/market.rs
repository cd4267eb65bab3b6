use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// One daily close for a ticker. Series are kept ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Derived statistics for the currently charted ticker.
///
/// `None` means "unavailable". The four fields are always replaced together:
/// a failed fetch or filter never leaves a partial mix of old and new values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketStats {
    pub current_price: Option<f64>,
    pub range_return: Option<f64>,
    pub realised_vol_ann: Option<f64>,
    pub upside_to_target: Option<f64>,
}

impl MarketStats {
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// Date-window restriction applied to a fetched series before any statistic
/// is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeTag {
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl RangeTag {
    pub fn label(&self) -> &'static str {
        match self {
            RangeTag::SixMonths => "6 months",
            RangeTag::OneYear => "1 year",
            RangeTag::TwoYears => "2 years",
            RangeTag::FiveYears => "5 years",
        }
    }

    fn months(&self) -> u32 {
        match self {
            RangeTag::SixMonths => 6,
            RangeTag::OneYear => 12,
            RangeTag::TwoYears => 24,
            RangeTag::FiveYears => 60,
        }
    }

    /// Cutoff date: `today` minus the calendar interval. Points on or after
    /// the cutoff survive the filter.
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(self.months()))
            .unwrap_or(NaiveDate::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_subtracts_calendar_months() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(
            RangeTag::SixMonths.cutoff(today),
            NaiveDate::from_ymd_opt(2026, 2, 6).unwrap()
        );
        assert_eq!(
            RangeTag::FiveYears.cutoff(today),
            NaiveDate::from_ymd_opt(2021, 8, 6).unwrap()
        );
    }

    #[test]
    fn range_tags_round_trip_wire_values() {
        let tag: RangeTag = serde_json::from_str("\"6m\"").unwrap();
        assert_eq!(tag, RangeTag::SixMonths);
        assert_eq!(serde_json::to_string(&RangeTag::TwoYears).unwrap(), "\"2y\"");
    }
}
