//! World conditions a courier may face: time of day and weather.
//!
//! These carry their own fee tables but are not part of
//! [`calculate_price`](super::pricing::calculate_price). Callers that want to
//! show them use [`condition_surcharges`] alongside a quote.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::pricing::{PriceModifier, UnknownOption};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    #[default]
    Day,
    Dusk,
    Night,
}

impl TimeOfDay {
    pub fn fee(&self) -> i64 {
        match self {
            Self::Day => 0,
            Self::Dusk => 1,
            Self::Night => 3,
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::Day => "Daylight run",
            Self::Dusk => "Light is fading, mobs start spawning",
            Self::Night => "Night run through hostile mob spawns",
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = UnknownOption;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "dusk" => Ok(Self::Dusk),
            "night" => Ok(Self::Night),
            _ => Err(UnknownOption {
                kind: "time of day",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    Thunderstorm,
}

impl Weather {
    pub fn fee(&self) -> i64 {
        match self {
            Self::Clear => 0,
            Self::Rain => 1,
            Self::Thunderstorm => 4,
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::Clear => "Clear skies",
            Self::Rain => "Rain slows travel",
            Self::Thunderstorm => "Thunderstorm: lightning and daytime mob spawns",
        }
    }
}

impl FromStr for Weather {
    type Err = UnknownOption;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "clear" => Ok(Self::Clear),
            "rain" => Ok(Self::Rain),
            "thunderstorm" | "thunder" => Ok(Self::Thunderstorm),
            _ => Err(UnknownOption {
                kind: "weather",
                value: value.to_string(),
            }),
        }
    }
}

/// Display lines for the given conditions. Free conditions are skipped.
pub fn condition_surcharges(
    time_of_day: Option<TimeOfDay>,
    weather: Option<Weather>,
) -> Vec<PriceModifier> {
    let mut lines = Vec::new();
    if let Some(time) = time_of_day.filter(|t| t.fee() != 0) {
        lines.push(PriceModifier::new("Time of Day", time.fee(), time.reason()));
    }
    if let Some(weather) = weather.filter(|w| w.fee() != 0) {
        lines.push(PriceModifier::new("Weather", weather.fee(), weather.reason()));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_conditions_are_skipped() {
        assert!(condition_surcharges(None, None).is_empty());
        assert!(condition_surcharges(Some(TimeOfDay::Day), Some(Weather::Clear)).is_empty());
    }

    #[test]
    fn night_storm_lists_both() {
        let lines = condition_surcharges(Some(TimeOfDay::Night), Some(Weather::Thunderstorm));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "Time of Day");
        assert_eq!(lines[0].cost, 3);
        assert_eq!(lines[1].name, "Weather");
        assert_eq!(lines[1].cost, 4);
        assert!(lines.iter().all(|line| !line.reason.is_empty()));
    }

    #[test]
    fn parses_names() {
        assert_eq!("NIGHT".parse::<TimeOfDay>(), Ok(TimeOfDay::Night));
        assert_eq!("thunder".parse::<Weather>(), Ok(Weather::Thunderstorm));
        assert!("snow".parse::<Weather>().is_err());
    }
}
