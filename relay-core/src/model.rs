use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RelayError;

/// Fixed observation point compiled into every provider request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, RelayError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(RelayError::Config(format!(
                "coordinates ({latitude}, {longitude}) out of range; \
                 latitude must be -90..=90 and longitude -180..=180"
            )));
        }

        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Temperature exactly as the provider reported it.
///
/// weather.gov sends a string, but a bare number is accepted too. Neither is
/// normalized, so the device receives the same JSON type the provider used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Temperature {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temperature::Text(s) => f.write_str(s),
            Temperature::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub temperature: Temperature,
    pub conditions: String,
}

/// Message handed to the device channel: `{"TEMPERATURE": .., "CONDITIONS": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    #[serde(rename = "TEMPERATURE")]
    pub temperature: Temperature,
    #[serde(rename = "CONDITIONS")]
    pub conditions: String,
}

// Byte sizes of the watch face text buffers, minus the terminator.
const DISPLAY_TEMPERATURE_MAX: usize = 7;
const DISPLAY_CONDITIONS_MAX: usize = 31;
const DISPLAY_LINE_MAX: usize = 31;

impl OutboundMessage {
    /// The line the watch face renders for this message, e.g. `"55, Overcast"`.
    pub fn display_line(&self) -> String {
        let temperature = self.temperature.to_string();
        let temperature = truncate_bytes(&temperature, DISPLAY_TEMPERATURE_MAX);
        let conditions = truncate_bytes(&self.conditions, DISPLAY_CONDITIONS_MAX);
        truncate_bytes(&format!("{temperature}, {conditions}"), DISPLAY_LINE_MAX).to_string()
    }
}

impl From<WeatherReading> for OutboundMessage {
    fn from(reading: WeatherReading) -> Self {
        Self {
            temperature: reading.temperature,
            conditions: reading.conditions,
        }
    }
}

/// Longest prefix of at most `max` bytes that ends on a char boundary.
fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }

    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(temperature: Temperature, conditions: &str) -> OutboundMessage {
        OutboundMessage { temperature, conditions: conditions.to_string() }
    }

    #[test]
    fn outbound_message_uses_device_keys() {
        let msg = message(Temperature::Text("72".into()), "Clear");
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json, serde_json::json!({"TEMPERATURE": "72", "CONDITIONS": "Clear"}));
    }

    #[test]
    fn numeric_temperature_stays_numeric() {
        let msg = message(Temperature::Number(55u64.into()), "Overcast");
        let json = serde_json::to_string(&msg).unwrap();

        assert_eq!(json, r#"{"TEMPERATURE":55,"CONDITIONS":"Overcast"}"#);
    }

    #[test]
    fn display_line_joins_fields() {
        let msg = message(Temperature::Text("55".into()), "Overcast");
        assert_eq!(msg.display_line(), "55, Overcast");
    }

    #[test]
    fn display_line_truncates_like_the_watch_face() {
        let msg = message(
            Temperature::Text("123456789".into()),
            "Thunderstorm in Vicinity and Heavy Rain Fog/Mist",
        );
        let line = msg.display_line();

        assert!(line.starts_with("1234567, Thunderstorm"));
        assert_eq!(line.len(), DISPLAY_LINE_MAX);
    }

    #[test]
    fn display_line_counts_bytes_not_chars() {
        // Conditions are 31 chars but 37 bytes; accented letters and "°" take two.
        let msg = message(Temperature::Text("12°F".into()), "Pluie légère, brume épaisse ééé");
        let line = msg.display_line();

        assert!(line.len() <= DISPLAY_LINE_MAX);
        assert!(line.starts_with("12°F, Pluie légère"));
        assert!(line.chars().count() < 31);
    }

    #[test]
    fn truncate_bytes_backs_off_to_char_boundary() {
        assert_eq!(truncate_bytes("abcé", 4), "abc");
        assert_eq!(truncate_bytes("abcé", 5), "abcé");
        assert_eq!(truncate_bytes("short", 31), "short");
    }

    #[test]
    fn location_rejects_out_of_range() {
        assert!(Location::new(91.0, 0.0).is_err());
        assert!(Location::new(0.0, -180.5).is_err());

        let loc = Location::new(42.358429, -71.059769).unwrap();
        assert_eq!(loc.latitude(), 42.358429);
        assert_eq!(loc.longitude(), -71.059769);
        assert_eq!(loc.to_string(), "42.358429,-71.059769");
    }
}
