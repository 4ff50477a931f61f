use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Formatter;
use chrono::{Datelike, NaiveDate};

/// The hours of the day at which snapshots are charted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SamplingHour {
    Morning,
    Noon,
    Evening,
}

impl SamplingHour {
    /// All sampling hours in chronological order
    pub const ALL: [SamplingHour; 3] = [SamplingHour::Morning, SamplingHour::Noon, SamplingHour::Evening];

    /// Returns the sampling hour matching the given hour of day, if any
    ///
    /// # Arguments
    ///
    /// * 'hour' - hour of day (0-23)
    pub fn from_hour(hour: u32) -> Option<SamplingHour> {
        match hour {
            6 => Some(SamplingHour::Morning),
            12 => Some(SamplingHour::Noon),
            20 => Some(SamplingHour::Evening),
            _ => None,
        }
    }

    pub fn hour(&self) -> u32 {
        match self {
            SamplingHour::Morning => 6,
            SamplingHour::Noon => 12,
            SamplingHour::Evening => 20,
        }
    }

    /// Key used for the hour in the embedded chart data
    pub fn key(&self) -> &'static str {
        match self {
            SamplingHour::Morning => "6",
            SamplingHour::Noon => "12",
            SamplingHour::Evening => "20",
        }
    }
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for SamplingHour {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:0>2}:00", self.hour())
    }
}

/// One sampled reading
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub temperature: f64,
    pub humidity: Option<f64>,
    pub weather: String,
}

/// Observations keyed by date and then by sampling hour
#[derive(Debug, Default, Clone)]
pub struct HistoryTable {
    days: BTreeMap<NaiveDate, BTreeMap<SamplingHour, Observation>>,
}

impl HistoryTable {
    /// Stores an observation, replacing any earlier one for the same date and hour
    ///
    /// # Arguments
    ///
    /// * 'date' - date of the observation
    /// * 'hour' - sampling hour of the observation
    /// * 'observation' - the observation to store
    pub fn insert(&mut self, date: NaiveDate, hour: SamplingHour, observation: Observation) -> Option<Observation> {
        self.days.entry(date).or_default().insert(hour, observation)
    }

    pub fn get(&self, date: NaiveDate, hour: SamplingHour) -> Option<&Observation> {
        self.days.get(&date).and_then(|hours| hours.get(&hour))
    }

    /// Returns all dates holding at least one observation, in ascending order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.days.keys().copied().collect()
    }

    /// Returns the distinct years present, in ascending order
    pub fn years(&self) -> Vec<i32> {
        let mut years = self.days.keys().map(|d| d.year()).collect::<Vec<i32>>();
        years.dedup();

        years
    }

    /// Whether any observed date is February 29
    pub fn has_leap_day(&self) -> bool {
        self.days.keys().any(|d| d.month() == 2 && d.day() == 29)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, SamplingHour, &Observation)> {
        self.days
            .iter()
            .flat_map(|(date, hours)| hours.iter().map(move |(hour, obs)| (*date, *hour, obs)))
    }

    /// Number of stored observations
    pub fn len(&self) -> usize {
        self.days.values().map(|hours| hours.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
