use std::fs;
use std::path::{Path, PathBuf};
use chrono::NaiveDate;
use glob::{glob, Pattern};
use log::{info, warn};
use crate::errors::SnapshotError;
use crate::models::observation::{HistoryTable, Observation, SamplingHour};
use crate::models::snapshot::Snapshot;

/// Length of a snapshot file name, "YYYY-MM-DD_HHMM.json"
const NAME_LEN: usize = 20;

/// Length of the timestamp part of a snapshot file name
const STAMP_LEN: usize = 15;

/// Loads all usable snapshots in a directory into a history table
///
/// Only files named "YYYY-MM-DD_HHMM.json" taken at one of the sampling hours are read.
/// A file that can't be read or parsed is logged and skipped. Files are processed in
/// ascending name order, so when two files map to the same date and hour the one
/// with the later minute wins.
///
/// # Arguments
///
/// * 'input_dir' - directory holding the snapshot files
pub fn load_history(input_dir: &Path) -> HistoryTable {
    let mut history = HistoryTable::default();

    if !input_dir.is_dir() {
        info!("no history directory at {}, nothing to load", input_dir.display());
        return history;
    }

    let mut read = 0;
    for path in snapshot_paths(input_dir) {
        let Some((date, hour)) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_snapshot_name)
        else {
            continue;
        };

        let Some(hour) = SamplingHour::from_hour(hour) else {
            continue;
        };

        match read_observation(&path) {
            Ok(observation) => {
                history.insert(date, hour, observation);
                read += 1;
            },
            Err(e) => warn!("skipping {}: {}", path.display(), e),
        }
    }

    info!("read {} snapshot files, {} observations over {} days", read, history.len(), history.dates().len());

    history
}

/// Lists candidate json files in the directory in ascending name order
///
/// # Arguments
///
/// * 'input_dir' - the directory to list
fn snapshot_paths(input_dir: &Path) -> Vec<PathBuf> {
    let Some(dir) = input_dir.to_str() else {
        warn!("history directory {} is not valid UTF-8", input_dir.display());
        return Vec::new();
    };

    let pattern = format!("{}/*.json", Pattern::escape(dir.trim_end_matches('/')));
    match glob(&pattern) {
        Ok(paths) => paths.filter_map(|entry| entry.ok()).collect(),
        Err(e) => {
            warn!("can't scan history directory {}: {}", dir, e);
            Vec::new()
        }
    }
}

/// Parses a snapshot file name into its date and hour of day
///
/// Returns None unless the name is exactly "YYYY-MM-DD_HHMM.json" naming a real calendar date.
/// Only the digit shape of the hour and minute is checked, the minute's value is ignored.
///
/// # Arguments
///
/// * 'name' - file name without any directory part
pub fn parse_snapshot_name(name: &str) -> Option<(NaiveDate, u32)> {
    let bytes = name.as_bytes();
    if bytes.len() != NAME_LEN || &bytes[STAMP_LEN..] != b".json" {
        return None;
    }

    let well_formed = bytes[..STAMP_LEN].iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        10 => *b == b'_',
        _ => b.is_ascii_digit(),
    });
    if !well_formed {
        return None;
    }

    let date = NaiveDate::parse_from_str(&name[..10], "%Y-%m-%d").ok()?;
    let hour = name[11..13].parse::<u32>().ok()?;

    Some((date, hour))
}

/// Reads the first live observation of a snapshot file
///
/// # Arguments
///
/// * 'path' - path to the snapshot file
fn read_observation(path: &Path) -> Result<Observation, SnapshotError> {
    let json = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&json)?;

    snapshot
        .lives
        .into_iter()
        .next()
        .map(Observation::from)
        .ok_or(SnapshotError::NoLiveObservation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn live(temperature: &str, humidity: &str, weather: &str) -> String {
        format!(
            r#"{{"status":"1","count":"1","lives":[{{"city":"杭州市","temperature":{},"humidity":{},"weather":{}}}]}}"#,
            temperature, humidity, weather
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn snapshot_names() {
        assert_eq!(parse_snapshot_name("2024-03-10_0600.json"), Some((date(2024, 3, 10), 6)));
        assert_eq!(parse_snapshot_name("2024-03-10_2059.json"), Some((date(2024, 3, 10), 20)));
        assert_eq!(parse_snapshot_name("2024-03-10_0675.json"), Some((date(2024, 3, 10), 6)));
        assert_eq!(parse_snapshot_name("2024-03-10_0999.json"), Some((date(2024, 3, 10), 9)));
        assert_eq!(parse_snapshot_name("2024-3-10_0600.json"), None);
        assert_eq!(parse_snapshot_name("2024-03-10_600.json"), None);
        assert_eq!(parse_snapshot_name("2024-03-10_0600.JSON"), None);
        assert_eq!(parse_snapshot_name("2024-03-10_0600.json.bak"), None);
        assert_eq!(parse_snapshot_name("2024-03-10T0600.json"), None);
        assert_eq!(parse_snapshot_name("+024-03-10_0600.json"), None);
        assert_eq!(parse_snapshot_name("2024-13-10_0600.json"), None);
        assert_eq!(parse_snapshot_name("2023-02-29_0600.json"), None);
        assert_eq!(parse_snapshot_name("schedule.json"), None);
        assert_eq!(parse_snapshot_name("2024-03-10_0600.jsön"), None);
    }

    #[test]
    fn missing_directory_gives_empty_history() {
        let dir = tempdir().unwrap();
        let history = load_history(&dir.path().join("weather_history"));
        assert!(history.is_empty());
    }

    #[test]
    fn loads_sampling_hours_only() {
        let dir = tempdir().unwrap();
        write(dir.path(), "2024-03-10_0600.json", &live("12.5", "60", r#""Sunny""#));
        write(dir.path(), "2024-03-10_1200.json", &live("18.0", "null", r#""""#));
        write(dir.path(), "2024-03-10_0900.json", &live("15.0", "55", r#""Cloudy""#));
        write(dir.path(), "2024-03-10_2000.txt", &live("9.0", "70", r#""Rain""#));
        write(dir.path(), "notes.json", &live("9.0", "70", r#""Rain""#));

        let history = load_history(dir.path());
        let day = date(2024, 3, 10);

        assert_eq!(history.len(), 2);
        assert_eq!(
            history.get(day, SamplingHour::Morning),
            Some(&Observation { temperature: 12.5, humidity: Some(60.0), weather: "Sunny".to_string() })
        );
        assert_eq!(
            history.get(day, SamplingHour::Noon),
            Some(&Observation { temperature: 18.0, humidity: None, weather: String::new() })
        );
        assert!(history.get(day, SamplingHour::Evening).is_none());
    }

    #[test]
    fn bad_files_are_skipped() {
        let dir = tempdir().unwrap();
        write(dir.path(), "2024-03-10_0600.json", "{not json");
        write(dir.path(), "2024-03-10_1200.json", &live("\"n/a\"", "50", r#""Fog""#));
        write(dir.path(), "2024-03-11_0600.json", r#"{"lives":[{"humidity":"40","weather":"Fog"}]}"#);
        write(dir.path(), "2024-03-11_1200.json", r#"{"lives":[]}"#);
        write(dir.path(), "2024-03-11_2000.json", r#"{"status":"0"}"#);
        fs::create_dir(dir.path().join("2024-03-12_0600.json")).unwrap();
        write(dir.path(), "2024-03-10_2000.json", &live("\"7\"", "\"81\"", r#""小雨""#));

        let history = load_history(dir.path());

        assert_eq!(history.len(), 1);
        assert_eq!(history.dates(), vec![date(2024, 3, 10)]);
        assert_eq!(
            history.get(date(2024, 3, 10), SamplingHour::Evening),
            Some(&Observation { temperature: 7.0, humidity: Some(81.0), weather: "小雨".to_string() })
        );
    }

    #[test]
    fn later_minute_wins_for_same_hour() {
        let dir = tempdir().unwrap();
        write(dir.path(), "2024-03-10_0615.json", &live("2.0", "null", r#""b""#));
        write(dir.path(), "2024-03-10_0600.json", &live("1.0", "null", r#""a""#));

        let history = load_history(dir.path());

        assert_eq!(history.len(), 1);
        assert_eq!(history.get(date(2024, 3, 10), SamplingHour::Morning).map(|o| o.temperature), Some(2.0));
    }

    #[test]
    fn minute_value_is_not_checked() {
        let dir = tempdir().unwrap();
        write(dir.path(), "2024-03-10_0675.json", &live("4.5", "77", r#""雾""#));
        write(dir.path(), "2024-03-10_1299.json", &live("11", "null", r#""阴""#));

        let history = load_history(dir.path());

        assert_eq!(history.len(), 2);
        assert_eq!(history.get(date(2024, 3, 10), SamplingHour::Morning).map(|o| o.temperature), Some(4.5));
        assert_eq!(history.get(date(2024, 3, 10), SamplingHour::Noon).map(|o| o.temperature), Some(11.0));
    }

    #[test]
    fn directory_name_with_glob_characters() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("history [hz]");
        fs::create_dir(&input).unwrap();
        write(&input, "2024-01-01_2000.json", &live("3", "90", r#""阴""#));

        let history = load_history(&input);

        assert_eq!(history.len(), 1);
    }
}
