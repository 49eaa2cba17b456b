//! Price and log-return containers for the change-point pipeline.
//!
//! Purpose
//! -------
//! Provide the two validated series types that flow into the change-point
//! model: a cleaned [`PriceSeries`] and the [`LogReturnSeries`] derived from
//! it. Cleaning is best-effort: malformed rows are dropped, never reported,
//! so that a single bad line in decades of historical data does not halt an
//! analysis.
//!
//! Key behaviors
//! -------------
//! - [`PriceSeries::from_raw_rows`] parses `(date, price)` string pairs,
//!   drops rows failing either parse, sorts by date and removes duplicate
//!   dates (first occurrence wins).
//! - [`PriceSeries::log_returns`] computes `r[i] = ln p[i+1] − ln p[i]`,
//!   dated with the later observation.
//! - Both types support inclusive date windows via `window`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Dates are strictly increasing in both series.
//! - Prices are finite and strictly positive; log-returns are finite.
//! - `LogReturnSeries` built from a `PriceSeries` of length `n` has length
//!   `n − 1` and its dates equal the trailing `n − 1` price dates.
//!
//! Conventions
//! -----------
//! - Values are stored as `ndarray::Array1<f64>` so the model layer can
//!   consume them without copying; dates as `Vec<NaiveDate>`.
//! - Indexing is 0-based throughout; a change-point index `tau` refers to a
//!   position in the log-return series.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the constant-price and two-price log-return cases,
//!   the single-price failure, row dropping, deduplication, idempotent
//!   re-cleaning, and windowing.
use crate::series::{
    errors::{SeriesError, SeriesResult},
    parse::{is_valid_price, parse_date, parse_price},
};
use chrono::NaiveDate;
use ndarray::Array1;
use tracing::debug;

/// `PriceSeries` — cleaned, chronologically ordered daily prices.
///
/// Fields
/// ------
/// - `dates`: `Vec<NaiveDate>`
///   Strictly increasing observation dates.
/// - `prices`: `Array1<f64>`
///   Prices aligned with `dates`; finite and > 0.
///
/// Invariants
/// ----------
/// - `dates.len() == prices.len()`.
/// - No duplicate dates.
///
/// Notes
/// -----
/// - A `PriceSeries` may hold fewer than two observations; the length
///   requirement is enforced by [`PriceSeries::log_returns`].
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    prices: Array1<f64>,
}

impl PriceSeries {
    /// Clean raw `(date, price)` string rows into a [`PriceSeries`].
    ///
    /// Parameters
    /// ----------
    /// - `rows`: any iterator of `(date, price)` pairs of string-like values,
    ///   typically straight from a CSV reader.
    ///
    /// Returns
    /// -------
    /// `SeriesResult<PriceSeries>`
    ///   The cleaned series, sorted ascending with duplicates removed.
    ///
    /// Errors
    /// ------
    /// - `SeriesError::DataFormat`
    ///   Returned when at least one row was supplied but none of them had
    ///   both a parseable date and a valid price.
    ///
    /// Notes
    /// -----
    /// - An empty iterator yields an empty series; the caller learns about
    ///   the shortage from [`PriceSeries::log_returns`].
    pub fn from_raw_rows<I, D, P>(rows: I) -> SeriesResult<Self>
    where
        I: IntoIterator<Item = (D, P)>,
        D: AsRef<str>,
        P: AsRef<str>,
    {
        let mut total = 0usize;
        let mut observations = Vec::new();
        for (row, (raw_date, raw_price)) in rows.into_iter().enumerate() {
            total += 1;
            match (parse_date(raw_date.as_ref()), parse_price(raw_price.as_ref())) {
                (Some(date), Some(price)) => observations.push((date, price)),
                _ => debug!(
                    row,
                    date = raw_date.as_ref(),
                    price = raw_price.as_ref(),
                    "dropping unparseable price row"
                ),
            }
        }
        if total > 0 && observations.is_empty() {
            return Err(SeriesError::DataFormat {
                reason: format!("none of the {total} rows had a parseable date and positive price"),
            });
        }
        Ok(Self::clean(observations))
    }

    /// Clean already-typed `(date, price)` observations.
    ///
    /// Rows with non-finite or non-positive prices are dropped; the rest are
    /// sorted and deduplicated exactly as in [`PriceSeries::from_raw_rows`].
    pub fn from_observations<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let kept = observations
            .into_iter()
            .filter(|&(date, price)| {
                let keep = is_valid_price(price);
                if !keep {
                    debug!(%date, price, "dropping invalid price observation");
                }
                keep
            })
            .collect();
        Self::clean(kept)
    }

    fn clean(mut observations: Vec<(NaiveDate, f64)>) -> Self {
        // Stable sort keeps file order among equal dates so the first wins.
        observations.sort_by_key(|&(date, _)| date);
        let before = observations.len();
        observations.dedup_by_key(|&mut (date, _)| date);
        if observations.len() < before {
            debug!(dropped = before - observations.len(), "dropped duplicate price dates");
        }
        let (dates, prices): (Vec<NaiveDate>, Vec<f64>) = observations.into_iter().unzip();
        PriceSeries { dates, prices: Array1::from(prices) }
    }

    /// Number of cleaned observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn prices(&self) -> &Array1<f64> {
        &self.prices
    }

    /// Iterate over `(date, price)` pairs in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.prices.iter().copied())
    }

    /// Render the series back into `(ISO date, price)` string rows.
    ///
    /// `f64`'s `Display` round-trips exactly, so cleaning these rows again
    /// reproduces `self`.
    pub fn to_raw_rows(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(date, price)| (date.format("%Y-%m-%d").to_string(), price.to_string()))
            .collect()
    }

    /// Restrict the series to `start ≤ date ≤ end` (either bound optional).
    ///
    /// Errors
    /// ------
    /// - `SeriesError::InvalidWindow` when both bounds are given and
    ///   `start > end`.
    pub fn window(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> SeriesResult<Self> {
        let keep = window_mask(&self.dates, start, end)?;
        let (dates, prices): (Vec<NaiveDate>, Vec<f64>) =
            self.iter().zip(keep).filter_map(|(obs, k)| k.then_some(obs)).unzip();
        Ok(PriceSeries { dates, prices: Array1::from(prices) })
    }

    /// Compute the log-return series.
    ///
    /// Returns
    /// -------
    /// `SeriesResult<LogReturnSeries>`
    ///   A series of length `self.len() − 1` with
    ///   `r[i] = ln p[i+1] − ln p[i]`, dated `dates[i+1]`.
    ///
    /// Errors
    /// ------
    /// - `SeriesError::InsufficientData { required: 2, found }`
    ///   Returned when fewer than two prices survived cleaning.
    pub fn log_returns(&self) -> SeriesResult<LogReturnSeries> {
        if self.len() < 2 {
            return Err(SeriesError::InsufficientData { required: 2, found: self.len() });
        }
        let log_prices = self.prices.mapv(f64::ln);
        let n = log_prices.len();
        let returns = &log_prices.slice(ndarray::s![1..]) - &log_prices.slice(ndarray::s![..n - 1]);
        Ok(LogReturnSeries { dates: self.dates[1..].to_vec(), values: returns })
    }
}

/// `LogReturnSeries` — dated log-returns, the observed data of the model.
///
/// Fields
/// ------
/// - `dates`: `Vec<NaiveDate>`
///   Strictly increasing dates; entry `i` is the date of the later price in
///   return `i`.
/// - `values`: `Array1<f64>`
///   Finite log-returns.
#[derive(Debug, Clone, PartialEq)]
pub struct LogReturnSeries {
    dates: Vec<NaiveDate>,
    values: Array1<f64>,
}

impl LogReturnSeries {
    /// Build a series from explicit dates and values.
    ///
    /// Useful for synthetic data and for callers that compute returns
    /// elsewhere. Unlike price cleaning, nothing is dropped: any violation is
    /// an error.
    ///
    /// Errors
    /// ------
    /// - `SeriesError::LengthMismatch` if the vectors differ in length.
    /// - `SeriesError::NonFiniteValue` for the first NaN/±∞ value.
    /// - `SeriesError::UnorderedDates` if dates are not strictly increasing.
    pub fn new(dates: Vec<NaiveDate>, values: Array1<f64>) -> SeriesResult<Self> {
        if dates.len() != values.len() {
            return Err(SeriesError::LengthMismatch { dates: dates.len(), values: values.len() });
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(SeriesError::NonFiniteValue { index, value });
        }
        for (index, pair) in dates.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(SeriesError::UnorderedDates {
                    index: index + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }
        Ok(LogReturnSeries { dates, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Date of the observation at `index`, if in range.
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        self.dates.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Restrict to `start ≤ date ≤ end` (either bound optional).
    pub fn window(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> SeriesResult<Self> {
        let keep = window_mask(&self.dates, start, end)?;
        let (dates, values): (Vec<NaiveDate>, Vec<f64>) =
            self.iter().zip(keep).filter_map(|(obs, k)| k.then_some(obs)).unzip();
        Ok(LogReturnSeries { dates, values: Array1::from(values) })
    }
}

fn window_mask(
    dates: &[NaiveDate], start: Option<NaiveDate>, end: Option<NaiveDate>,
) -> SeriesResult<Vec<bool>> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(SeriesError::InvalidWindow { start, end });
        }
    }
    Ok(dates
        .iter()
        .map(|d| start.map_or(true, |s| *d >= s) && end.map_or(true, |e| *d <= e))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Log-return arithmetic on constant and two-point price series.
    // - The single-price `InsufficientData` failure.
    // - Silent dropping of malformed rows and the whole-input `DataFormat`
    //   failure.
    // - Sorting, deduplication, idempotent re-cleaning, and windowing.
    // -------------------------------------------------------------------------

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date")
    }

    #[test]
    // Purpose
    // -------
    // A constant price path has identically zero log-returns.
    //
    // Given
    // -----
    // - Prices [100, 100, 100] on three consecutive days.
    //
    // Expect
    // ------
    // - Two log-returns, both exactly 0.
    fn log_returns_of_constant_prices_are_zero() {
        // Arrange
        let prices = PriceSeries::from_raw_rows([
            ("2020-01-01", "100"),
            ("2020-01-02", "100"),
            ("2020-01-03", "100"),
        ])
        .expect("clean input");

        // Act
        let returns = prices.log_returns().expect("three prices");

        // Assert
        assert_eq!(returns.len(), 2);
        assert!(returns.values().iter().all(|&r| r == 0.0));
    }

    #[test]
    // Purpose
    // -------
    // A 10% move yields ln(1.1) dated on the second observation.
    fn log_return_of_ten_percent_move_is_ln_1_1() {
        let prices =
            PriceSeries::from_observations([(ymd(2020, 1, 1), 100.0), (ymd(2020, 1, 2), 110.0)]);

        let returns = prices.log_returns().expect("two prices");

        assert_eq!(returns.len(), 1);
        assert_relative_eq!(returns.values()[0], 1.1_f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(returns.values()[0], 0.09531, epsilon = 1e-5);
        assert_eq!(returns.date_at(0), Some(ymd(2020, 1, 2)));
    }

    #[test]
    // Purpose
    // -------
    // A single surviving price cannot produce a return and must fail loudly.
    fn single_price_is_insufficient() {
        let prices = PriceSeries::from_raw_rows([("2020-01-01", "55.2")]).expect("one valid row");

        let err = prices.log_returns().unwrap_err();

        assert_eq!(err, SeriesError::InsufficientData { required: 2, found: 1 });
    }

    #[test]
    // Purpose
    // -------
    // Malformed rows are dropped silently while valid ones survive in date
    // order.
    fn malformed_rows_are_dropped_and_rest_sorted() {
        // Arrange
        let rows = vec![
            ("2020-01-03", "12.0"),
            ("garbage", "11.0"),
            ("2020-01-01", "10.0"),
            ("2020-01-02", "-1"),
            ("2020-01-04", "n/a"),
            ("02-Jan-20", "11.0"),
        ];

        // Act
        let prices = PriceSeries::from_raw_rows(rows).expect("some rows valid");

        // Assert
        assert_eq!(prices.dates(), &[ymd(2020, 1, 1), ymd(2020, 1, 2), ymd(2020, 1, 3)]);
        assert_eq!(prices.prices().to_vec(), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    // Purpose
    // -------
    // When every row is malformed the input as a whole is rejected.
    fn all_rows_malformed_is_a_data_format_error() {
        let err = PriceSeries::from_raw_rows([("x", "1"), ("2020-01-01", "abc")]).unwrap_err();

        assert!(matches!(err, SeriesError::DataFormat { .. }), "got {err:?}");
    }

    #[test]
    // Purpose
    // -------
    // Duplicate dates collapse to their first occurrence in input order.
    fn duplicate_dates_keep_first_occurrence() {
        let prices = PriceSeries::from_raw_rows([
            ("2020-01-02", "20"),
            ("2020-01-01", "10"),
            ("2020-01-02", "99"),
        ])
        .expect("valid rows");

        assert_eq!(prices.len(), 2);
        assert_eq!(prices.prices().to_vec(), vec![10.0, 20.0]);
    }

    #[test]
    // Purpose
    // -------
    // Re-cleaning already clean output drops nothing and reproduces it.
    fn recleaning_clean_output_is_idempotent() {
        // Arrange
        let first = PriceSeries::from_raw_rows([
            ("20-May-87", "18.63"),
            ("21-May-87", "18.45"),
            ("bad", "1"),
            ("Apr 22, 2020", "13.77"),
            ("2020-04-21", "9.12"),
        ])
        .expect("valid rows");

        // Act
        let second = PriceSeries::from_raw_rows(first.to_raw_rows()).expect("clean rows");

        // Assert
        assert_eq!(second.len(), first.len());
        assert_eq!(second, first);
    }

    #[test]
    // Purpose
    // -------
    // Windows are inclusive on both ends and reject inverted bounds.
    fn window_is_inclusive_and_validates_bounds() {
        let prices = PriceSeries::from_observations(
            (1..=5).map(|d| (ymd(2021, 3, d), 50.0 + d as f64)),
        );

        let windowed =
            prices.window(Some(ymd(2021, 3, 2)), Some(ymd(2021, 3, 4))).expect("valid window");
        let open_ended = prices.window(Some(ymd(2021, 3, 4)), None).expect("valid window");
        let err = prices.window(Some(ymd(2021, 3, 4)), Some(ymd(2021, 3, 2))).unwrap_err();

        assert_eq!(windowed.len(), 3);
        assert_eq!(open_ended.len(), 2);
        assert!(matches!(err, SeriesError::InvalidWindow { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Typed log-return construction rejects unordered dates and NaNs.
    fn log_return_series_new_validates_inputs() {
        let dates = vec![ymd(2020, 1, 2), ymd(2020, 1, 1)];

        let unordered = LogReturnSeries::new(dates, Array1::from(vec![0.0, 0.1])).unwrap_err();
        let non_finite =
            LogReturnSeries::new(vec![ymd(2020, 1, 1)], Array1::from(vec![f64::NAN])).unwrap_err();
        let mismatch = LogReturnSeries::new(vec![], Array1::from(vec![0.1])).unwrap_err();

        assert!(matches!(unordered, SeriesError::UnorderedDates { index: 1, .. }));
        assert!(matches!(non_finite, SeriesError::NonFiniteValue { index: 0, .. }));
        assert_eq!(mismatch, SeriesError::LengthMismatch { dates: 0, values: 1 });
    }
}
