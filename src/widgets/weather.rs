//! Current weather at a configured location

use crate::fetch::provider::non_empty_str;
use crate::fetch::{InvalidUrl, Provider, RequestDescriptor, Resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const NAME: &str = "weather";

/// Geographic location for weather lookups
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        // Moscow
        Self {
            latitude: 55.75,
            longitude: 37.62,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub temperature_c: Option<f64>,
    pub description: String,
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.temperature_c {
            Some(t) => write!(f, "{:.1}°C, {}", t, self.description),
            None => f.write_str(&self.description),
        }
    }
}

pub fn fallback() -> Weather {
    Weather {
        temperature_c: None,
        description: "Weather unavailable".to_string(),
    }
}

/// WMO weather interpretation codes, as used by Open-Meteo
fn describe_wmo_code(code: u64) -> &'static str {
    match code {
        0 => "clear sky",
        1..=3 => "partly cloudy",
        45 | 48 => "fog",
        51..=57 => "drizzle",
        61..=67 => "rain",
        71..=77 => "snow",
        80..=82 => "rain showers",
        85 | 86 => "snow showers",
        95..=99 => "thunderstorm",
        _ => "unknown conditions",
    }
}

/// `{"current_weather": {"temperature": 12.3, "weathercode": 3, ...}}`
pub fn parse_open_meteo(document: &Value) -> Option<Weather> {
    let current = &document["current_weather"];
    let temperature = current["temperature"].as_f64().filter(|t| t.is_finite())?;
    let description = current["weathercode"]
        .as_u64()
        .map(describe_wmo_code)
        .unwrap_or("unknown conditions");

    Some(Weather {
        temperature_c: Some(temperature),
        description: description.to_string(),
    })
}

/// wttr.in `format=j1`: temperatures arrive as strings
pub fn parse_wttr(document: &Value) -> Option<Weather> {
    let current = document["current_condition"].as_array()?.first()?;
    let temperature = non_empty_str(&current["temp_C"])?.parse::<f64>().ok()?;
    let description = current["weatherDesc"]
        .as_array()
        .and_then(|d| d.first())
        .and_then(|d| non_empty_str(&d["value"]))
        .map(|d| d.to_lowercase())
        .unwrap_or_else(|| "unknown conditions".to_string());

    Some(Weather {
        temperature_c: Some(temperature),
        description,
    })
}

pub fn resource(location: Location) -> Result<Resource<Weather>, InvalidUrl> {
    let open_meteo = format!(
        "https://api.open-meteo.com/v1/forecast?latitude={}&longitude={}&current_weather=true",
        location.latitude, location.longitude
    );
    let wttr = format!(
        "https://wttr.in/{},{}?format=j1",
        location.latitude, location.longitude
    );

    Ok(Resource::new(
        NAME,
        vec![
            Provider::json("open-meteo", RequestDescriptor::get(&open_meteo)?, parse_open_meteo)
                .with_rank(1),
            Provider::json("wttr", RequestDescriptor::get(&wttr)?, parse_wttr).with_rank(2),
        ],
        fallback(),
    ))
}
