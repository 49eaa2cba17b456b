//! pipeline::report — the result of an analysis and its flat record.
use crate::{
    events::EventMatch,
    pipeline::options::ReportMode,
    summary::{EffectSize, PosteriorSummary},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// ImpactSummary — the break, its effect, and the associated event.
///
/// Fields
/// ------
/// - `change_date` / `tau`: date and index of the median break.
/// - `tau_low`, `tau_high` and their dates: credible interval bounds.
/// - `mu_before_mean`, `mu_after_mean`, `sigma_mean`: posterior means.
/// - `pct_change`: relative move of the mean return.
/// - `nearest_event` / `days_to_nearest_event`: advisory event association;
///   both `None` when the calendar is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactSummary {
    pub change_date: NaiveDate,
    pub tau: usize,
    pub tau_low: usize,
    pub tau_high: usize,
    pub tau_low_date: NaiveDate,
    pub tau_high_date: NaiveDate,
    pub mu_before_mean: f64,
    pub mu_after_mean: f64,
    pub sigma_mean: f64,
    pub pct_change: EffectSize,
    pub nearest_event: Option<String>,
    pub days_to_nearest_event: Option<i64>,
}

impl ImpactSummary {
    pub fn new(summary: &PosteriorSummary, event: Option<EventMatch>) -> Self {
        let interval = &summary.tau_interval;
        let (nearest_event, days_to_nearest_event) = match event {
            Some(hit) => (Some(hit.description), Some(hit.days)),
            None => (None, None),
        };
        ImpactSummary {
            change_date: summary.change_date,
            tau: summary.tau_median,
            tau_low: interval.low,
            tau_high: interval.high,
            tau_low_date: interval.low_date,
            tau_high_date: interval.high_date,
            mu_before_mean: summary.mu_before_mean,
            mu_after_mean: summary.mu_after_mean,
            sigma_mean: summary.sigma_mean,
            pct_change: summary.pct_change,
            nearest_event,
            days_to_nearest_event,
        }
    }

    /// Flatten into a serializable record.
    ///
    /// Interval dates are filled only in [`ReportMode::Range`].
    pub fn to_record(&self, mode: ReportMode) -> ImpactRecord {
        let (tau_low, tau_high) = match mode {
            ReportMode::Point => (None, None),
            ReportMode::Range => (Some(self.tau_low_date), Some(self.tau_high_date)),
        };
        ImpactRecord {
            change_date: self.change_date,
            tau_low,
            tau_high,
            mu_before_mean: self.mu_before_mean,
            mu_after_mean: self.mu_after_mean,
            pct_change: self.pct_change.value(),
            nearest_event: self.nearest_event.clone(),
            days_to_nearest_event: self.days_to_nearest_event,
        }
    }
}

/// ImpactRecord — one flat JSON object or CSV row per analysis.
///
/// Dates serialize as ISO `YYYY-MM-DD`; `None` becomes `null` in JSON and
/// an empty field in CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactRecord {
    pub change_date: NaiveDate,
    pub tau_low: Option<NaiveDate>,
    pub tau_high: Option<NaiveDate>,
    pub mu_before_mean: f64,
    pub mu_after_mean: f64,
    pub pct_change: Option<f64>,
    pub nearest_event: Option<String>,
    pub days_to_nearest_event: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date")
    }

    fn impact(pct_change: EffectSize, event: bool) -> ImpactSummary {
        ImpactSummary {
            change_date: ymd(2020, 3, 15),
            tau: 50,
            tau_low: 45,
            tau_high: 57,
            tau_low_date: ymd(2020, 3, 8),
            tau_high_date: ymd(2020, 3, 24),
            mu_before_mean: 0.001,
            mu_after_mean: -0.004,
            sigma_mean: 0.02,
            pct_change,
            nearest_event: event.then(|| "OPEC+ talks collapse".to_string()),
            days_to_nearest_event: event.then_some(7),
        }
    }

    #[test]
    // Purpose
    // -------
    // Point mode leaves interval bounds empty; range mode fills them.
    fn report_mode_controls_interval_fields() {
        // Arrange
        let summary = impact(EffectSize::Computable(-500.0), true);

        // Act
        let point = summary.to_record(ReportMode::Point);
        let range = summary.to_record(ReportMode::Range);

        // Assert
        assert_eq!(point.tau_low, None);
        assert_eq!(range.tau_low, Some(ymd(2020, 3, 8)));
        assert_eq!(range.tau_high, Some(ymd(2020, 3, 24)));
        assert_eq!(point.change_date, range.change_date);
    }

    #[test]
    // Purpose
    // -------
    // Missing values serialize as JSON `null` and ISO dates as strings.
    fn record_serializes_nullable_fields() {
        let record = impact(EffectSize::NotComputable, false).to_record(ReportMode::Point);

        let json = serde_json::to_value(&record).expect("serializable");

        assert_eq!(json["change_date"], "2020-03-15");
        assert!(json["pct_change"].is_null());
        assert!(json["nearest_event"].is_null());
        assert!(json["days_to_nearest_event"].is_null());
        assert!(json["tau_low"].is_null());
    }

    #[test]
    fn record_writes_one_csv_row() {
        let record = impact(EffectSize::Computable(-500.0), true).to_record(ReportMode::Range);
        let mut writer = csv::Writer::from_writer(vec![]);

        writer.serialize(&record).expect("csv row");
        let text = String::from_utf8(writer.into_inner().expect("flushed")).expect("utf-8");

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "change_date,tau_low,tau_high,mu_before_mean,mu_after_mean,pct_change,\
                 nearest_event,days_to_nearest_event"
            )
        );
        assert_eq!(
            lines.next(),
            Some("2020-03-15,2020-03-08,2020-03-24,0.001,-0.004,-500.0,OPEC+ talks collapse,7")
        );
    }
}
