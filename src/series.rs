use std::collections::BTreeMap;
use chrono::{Datelike, NaiveDate};
use crate::models::observation::{HistoryTable, Observation, SamplingHour};

/// Canonical year used for the day-of-year axis when a February 29 is observed
pub const LEAP_BASE_YEAR: i32 = 2000;

/// Canonical year used for the day-of-year axis otherwise
pub const COMMON_BASE_YEAR: i32 = 2001;

/// Temperature, humidity and weather arrays aligned to a label axis
///
/// Every array has exactly one slot per label, None (or an empty weather string)
/// marks a slot without observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourSeries {
    pub temperature: Vec<Option<f64>>,
    pub humidity: Vec<Option<f64>>,
    pub weather: Vec<String>,
}

impl HourSeries {
    /// Returns a series with the given number of empty slots
    ///
    /// # Arguments
    ///
    /// * 'len' - length of the label axis
    fn empty(len: usize) -> HourSeries {
        HourSeries {
            temperature: vec![None; len],
            humidity: vec![None; len],
            weather: vec![String::new(); len],
        }
    }

    fn set(&mut self, slot: usize, observation: &Observation) {
        self.temperature[slot] = Some(observation.temperature);
        self.humidity[slot] = observation.humidity;
        self.weather[slot] = observation.weather.clone();
    }

    /// Number of slots holding a temperature
    pub fn temperature_count(&self) -> usize {
        self.temperature.iter().filter(|t| t.is_some()).count()
    }
}

/// One series per sampling hour
pub type HourlySeries = BTreeMap<SamplingHour, HourSeries>;

fn empty_hourly(len: usize) -> HourlySeries {
    SamplingHour::ALL.iter().map(|h| (*h, HourSeries::empty(len))).collect()
}

fn temperature_counts(hourly: Option<&HourlySeries>) -> BTreeMap<SamplingHour, usize> {
    SamplingHour::ALL
        .iter()
        .map(|h| (*h, hourly.and_then(|s| s.get(h)).map_or(0, |s| s.temperature_count())))
        .collect()
}

/// All observations as one series per hour over the sorted observed dates
#[derive(Debug, Clone)]
pub struct FlatSeries {
    pub dates: Vec<NaiveDate>,
    pub hours: HourlySeries,
}

impl FlatSeries {
    /// ISO formatted dates of the label axis
    pub fn labels(&self) -> Vec<String> {
        self.dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect()
    }

    pub fn slot(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Number of temperature readings per hour over all dates
    pub fn temperature_counts(&self) -> BTreeMap<SamplingHour, usize> {
        temperature_counts(Some(&self.hours))
    }
}

/// Observations split per year, each aligned to the days of a canonical year
#[derive(Debug, Clone)]
pub struct YearlySeries {
    pub base_year: i32,
    pub days: Vec<NaiveDate>,
    pub years: BTreeMap<i32, HourlySeries>,
}

impl YearlySeries {
    /// "MM-DD" formatted days of the label axis
    pub fn labels(&self) -> Vec<String> {
        self.days.iter().map(|d| d.format("%m-%d").to_string()).collect()
    }

    /// Slot of a month and day on the label axis, None if the canonical year lacks that day
    ///
    /// # Arguments
    ///
    /// * 'month' - month (1-12)
    /// * 'day' - day of month
    pub fn slot(&self, month: u32, day: u32) -> Option<usize> {
        NaiveDate::from_ymd_opt(self.base_year, month, day).map(|d| d.ordinal0() as usize)
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.years.keys().next_back().copied()
    }

    /// Number of temperature readings per hour in the most recent year, zero when there are no years
    pub fn temperature_counts(&self) -> BTreeMap<SamplingHour, usize> {
        temperature_counts(self.latest_year().and_then(|y| self.years.get(&y)))
    }
}

/// Builds one series per hour over the sorted set of observed dates
///
/// # Arguments
///
/// * 'history' - the loaded history table
pub fn build_flat_series(history: &HistoryTable) -> FlatSeries {
    let dates = history.dates();
    let mut series = FlatSeries { hours: empty_hourly(dates.len()), dates };

    for (date, hour, observation) in history.iter() {
        if let (Some(slot), Some(hs)) = (series.slot(date), series.hours.get_mut(&hour)) {
            hs.set(slot, observation);
        }
    }

    series
}

/// Builds one series per year and hour over every day of a canonical year
///
/// The canonical year is a leap year if any observed date is February 29, which
/// gives a 366 entry axis, otherwise the axis has 365 entries.
///
/// # Arguments
///
/// * 'history' - the loaded history table
pub fn build_yearly_series(history: &HistoryTable) -> YearlySeries {
    let base_year = if history.has_leap_day() { LEAP_BASE_YEAR } else { COMMON_BASE_YEAR };
    let days = canonical_days(base_year);

    let years = history
        .years()
        .into_iter()
        .map(|y| (y, empty_hourly(days.len())))
        .collect::<BTreeMap<i32, HourlySeries>>();

    let mut series = YearlySeries { base_year, days, years };

    for (date, hour, observation) in history.iter() {
        let Some(slot) = series.slot(date.month(), date.day()) else {
            continue;
        };
        if let Some(hs) = series.years.get_mut(&date.year()).and_then(|s| s.get_mut(&hour)) {
            hs.set(slot, observation);
        }
    }

    series
}

/// Every day of the given year in calendar order
fn canonical_days(year: i32) -> Vec<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .map(|first| first.iter_days().take_while(|d| d.year() == year).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn obs(temperature: f64, humidity: Option<f64>, weather: &str) -> Observation {
        Observation { temperature, humidity, weather: weather.to_string() }
    }

    fn sample_history() -> HistoryTable {
        let mut history = HistoryTable::default();
        history.insert(date(2024, 3, 10), SamplingHour::Morning, obs(12.5, Some(60.0), "Sunny"));
        history.insert(date(2024, 3, 10), SamplingHour::Noon, obs(18.0, None, ""));
        history.insert(date(2023, 12, 31), SamplingHour::Evening, obs(-1.5, Some(88.0), "Snow"));
        history.insert(date(2024, 1, 2), SamplingHour::Evening, obs(0.0, Some(0.0), "Clear"));
        history
    }

    #[test]
    fn flat_series_round_trip() {
        let history = sample_history();
        let flat = build_flat_series(&history);

        assert_eq!(flat.labels(), vec!["2023-12-31", "2024-01-02", "2024-03-10"]);
        for hs in flat.hours.values() {
            assert_eq!(hs.temperature.len(), 3);
            assert_eq!(hs.humidity.len(), 3);
            assert_eq!(hs.weather.len(), 3);
        }

        for (d, hour, observation) in history.iter() {
            let slot = flat.slot(d).unwrap();
            let hs = &flat.hours[&hour];
            assert_eq!(hs.temperature[slot], Some(observation.temperature));
            assert_eq!(hs.humidity[slot], observation.humidity);
            assert_eq!(hs.weather[slot], observation.weather);
        }

        let morning = &flat.hours[&SamplingHour::Morning];
        assert_eq!(morning.temperature, vec![None, None, Some(12.5)]);
        assert_eq!(morning.weather, vec!["", "", "Sunny"]);
        assert_eq!(flat.hours[&SamplingHour::Evening].temperature[1], Some(0.0));
    }

    #[test]
    fn flat_counts_cover_all_dates() {
        let flat = build_flat_series(&sample_history());
        let counts = flat.temperature_counts();

        assert_eq!(counts[&SamplingHour::Morning], 1);
        assert_eq!(counts[&SamplingHour::Noon], 1);
        assert_eq!(counts[&SamplingHour::Evening], 2);
    }

    #[test]
    fn yearly_series_round_trip() {
        let history = sample_history();
        let yearly = build_yearly_series(&history);

        assert_eq!(yearly.base_year, COMMON_BASE_YEAR);
        assert_eq!(yearly.years.keys().copied().collect::<Vec<i32>>(), vec![2023, 2024]);
        assert_eq!(yearly.latest_year(), Some(2024));

        for (d, hour, observation) in history.iter() {
            let slot = yearly.slot(d.month(), d.day()).unwrap();
            let hs = &yearly.years[&d.year()][&hour];
            assert_eq!(hs.temperature[slot], Some(observation.temperature));
            assert_eq!(hs.humidity[slot], observation.humidity);
            assert_eq!(hs.weather[slot], observation.weather);
        }

        let slot = yearly.slot(3, 10).unwrap();
        assert_eq!(yearly.labels()[slot], "03-10");
        assert_eq!(yearly.years[&2023][&SamplingHour::Morning].temperature[slot], None);
        assert_eq!(yearly.years[&2024][&SamplingHour::Noon].humidity[slot], None);
    }

    #[test]
    fn yearly_counts_use_latest_year() {
        let yearly = build_yearly_series(&sample_history());
        let counts = yearly.temperature_counts();

        assert_eq!(counts[&SamplingHour::Morning], 1);
        assert_eq!(counts[&SamplingHour::Noon], 1);
        assert_eq!(counts[&SamplingHour::Evening], 1);
    }

    #[test]
    fn common_year_axis_has_365_days() {
        let yearly = build_yearly_series(&sample_history());
        let labels = yearly.labels();

        assert_eq!(labels.len(), 365);
        assert_eq!(labels.first().map(String::as_str), Some("01-01"));
        assert_eq!(labels.last().map(String::as_str), Some("12-31"));
        assert!(!labels.iter().any(|l| l == "02-29"));
        for hourly in yearly.years.values() {
            for hs in hourly.values() {
                assert_eq!(hs.temperature.len(), 365);
                assert_eq!(hs.weather.len(), 365);
            }
        }
    }

    #[test]
    fn leap_day_forces_366_days() {
        let mut history = sample_history();
        history.insert(date(2024, 2, 29), SamplingHour::Noon, obs(9.0, None, "Rain"));
        let yearly = build_yearly_series(&history);

        assert_eq!(yearly.base_year, LEAP_BASE_YEAR);
        assert_eq!(yearly.labels().len(), 366);
        assert_eq!(yearly.labels()[59], "02-29");
        assert_eq!(yearly.years[&2024][&SamplingHour::Noon].temperature[59], Some(9.0));
        assert_eq!(yearly.years[&2023][&SamplingHour::Noon].temperature.len(), 366);

        let slot = yearly.slot(3, 10).unwrap();
        assert_eq!(slot, 69);
        assert_eq!(yearly.years[&2024][&SamplingHour::Morning].temperature[slot], Some(12.5));
    }

    #[test]
    fn empty_history() {
        let history = HistoryTable::default();

        let yearly = build_yearly_series(&history);
        assert!(yearly.years.is_empty());
        assert_eq!(yearly.labels().len(), 365);
        assert!(yearly.temperature_counts().values().all(|c| *c == 0));

        let flat = build_flat_series(&history);
        assert!(flat.labels().is_empty());
        assert!(flat.hours.values().all(|hs| hs.temperature.is_empty()));
        assert!(flat.temperature_counts().values().all(|c| *c == 0));
    }
}
