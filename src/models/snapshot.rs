use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use crate::models::observation::Observation;

/// One stored weather snapshot, only the parts needed for charting
#[derive(Deserialize)]
pub struct Snapshot {
    pub lives: Vec<LiveRecord>,
}

/// A live observation record as found in a snapshot
///
/// Numeric fields are frequently delivered as strings, e.g. "12" or "60.0",
/// so they are coerced rather than strictly typed.
#[derive(Deserialize)]
pub struct LiveRecord {
    #[serde(deserialize_with = "decimal")]
    pub temperature: f64,
    #[serde(default, deserialize_with = "optional_decimal")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "label")]
    pub weather: String,
}

impl From<LiveRecord> for Observation {
    fn from(live: LiveRecord) -> Self {
        Observation {
            temperature: live.temperature,
            humidity: live.humidity,
            weather: live.weather,
        }
    }
}

/// Coerces a JSON number or numeric string into a finite decimal
///
/// # Arguments
///
/// * 'value' - the JSON value to coerce
fn to_decimal(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    number.is_finite().then_some(number)
}

fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    to_decimal(&value).ok_or_else(|| D::Error::custom(format!("not a decimal number: {}", value)))
}

fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        v => to_decimal(v)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("not a decimal number: {}", v))),
    }
}

fn label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        v => v.to_string(),
    })
}
