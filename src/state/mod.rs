pub mod store;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use store::StateStore;

/// One complete snapshot of the inverter as broadcast by the GUI server.
///
/// The object is kept exactly as delivered: unknown keys survive and values
/// are never validated. A snapshot replaces the previous one wholesale, so
/// anything the server leaves out is simply absent afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceState(Map<String, Value>);

impl DeviceState {
    /// Decode one text frame. Only invalid JSON or a non-object document is
    /// rejected.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// A measurement such as `output_power`. `None` when absent or not a
    /// string or number.
    pub fn reading(&self, key: &str) -> Option<Reading> {
        match self.0.get(key)? {
            Value::String(s) => Some(Reading::Text(s.clone())),
            Value::Number(n) => n.as_f64().map(Reading::Number),
            _ => None,
        }
    }

    /// Entries of `led_map`. A missing or non-object map yields no LEDs, a
    /// value that isn't a known LED string reads as [`LedState::Unknown`].
    pub fn leds(&self) -> BTreeMap<&str, LedState> {
        self.0
            .get("led_map")
            .and_then(Value::as_object)
            .map(|leds| {
                leds.iter()
                    .map(|(name, value)| {
                        let led = value.as_str().map_or(LedState::Unknown, LedState::from_wire);
                        (name.as_str(), led)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<Map<String, Value>> for DeviceState {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// A measurement as sent on the wire. The server pre-formats most values as
/// strings ("230.00") but plain numbers are accepted as well.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Number(f64),
    Text(String),
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Number(n) => write!(f, "{n}"),
            Reading::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LedState {
    #[default]
    Off,
    Green,
    BlinkGreen,
    Red,
    BlinkRed,
    Unknown,
}

impl LedState {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "dot-off" => LedState::Off,
            "dot-green" => LedState::Green,
            "blink-green" => LedState::BlinkGreen,
            "dot-red" => LedState::Red,
            "blink-red" => LedState::BlinkRed,
            _ => LedState::Unknown,
        }
    }
}

/// Whether the stream is currently usable, plus the text shown when it isn't.
/// `error_message` carries no meaning while `has_error` is false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectivityStatus {
    pub has_error: bool,
    pub error_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_server_snapshot() {
        let text = json!({
            "errors": null,
            "date": "Mon, 02 Jan 2006 15:04:05 -0700",
            "output_current": "1.20",
            "output_voltage": "230.00",
            "output_power": "276.00",
            "battery_charge": 87.5,
            "led_map": {
                "led_mains": "dot-green",
                "led_float": "blink-green",
                "led_bat_low": "blink-red",
                "led_over_temp": "dot-off"
            }
        })
        .to_string();

        let state = DeviceState::from_json(&text).unwrap();
        assert_eq!(state.reading("output_voltage"), Some(Reading::Text("230.00".into())));
        assert_eq!(state.reading("battery_charge"), Some(Reading::Number(87.5)));
        assert_eq!(state.reading("input_power"), None);

        let leds = state.leds();
        assert_eq!(leds["led_mains"], LedState::Green);
        assert_eq!(leds["led_float"], LedState::BlinkGreen);
        assert_eq!(leds["led_bat_low"], LedState::BlinkRed);
        assert_eq!(leds["led_over_temp"], LedState::Off);
    }

    #[test]
    fn server_frame_is_kept_as_delivered() {
        let frame = json!({
            "errors": null,
            "date": "d",
            "output_current": "1.00",
            "InMinOut": "24.00",
            "led_map": {}
        });

        let state = DeviceState::from_json(&frame.to_string()).unwrap();
        assert_eq!(serde_json::to_value(&state).unwrap(), frame);
        assert_eq!(state.fields()["InMinOut"], json!("24.00"));
    }

    #[test]
    fn odd_field_contents_are_not_rejected() {
        let state =
            DeviceState::from_json(r#"{"output_power":"1.00","led_map":null}"#).unwrap();
        assert_eq!(state.reading("output_power"), Some(Reading::Text("1.00".into())));
        assert!(state.leds().is_empty());

        let state = DeviceState::from_json(r#"{"output_power":true,"led_map":{"led_bulk":1}}"#)
            .unwrap();
        assert_eq!(state.reading("output_power"), None);
        assert_eq!(state.leds()["led_bulk"], LedState::Unknown);
    }

    #[test]
    fn unknown_led_value_is_not_an_error() {
        let state = DeviceState::from_json(r#"{"led_map":{"led_bulk":"dot-purple"}}"#).unwrap();
        assert_eq!(state.leds()["led_bulk"], LedState::Unknown);
    }

    #[test]
    fn rejects_non_object_payloads() {
        assert!(DeviceState::from_json("not json").is_err());
        assert!(DeviceState::from_json("[1, 2, 3]").is_err());
        assert!(DeviceState::from_json("42").is_err());
        assert!(DeviceState::from_json("null").is_err());
    }

    #[test]
    fn reading_displays_as_received() {
        assert_eq!(Reading::Text("12.50".into()).to_string(), "12.50");
        assert_eq!(Reading::Number(3.0).to_string(), "3");
    }
}
