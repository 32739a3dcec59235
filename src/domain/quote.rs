//! Caller-facing quote types.

use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use super::{
    conditions::{TimeOfDay, Weather},
    pricing::{Insurance, PricingBreakdown, ServiceType, Urgency},
    route::{DangerLevel, Difficulty},
};

/// Options a customer picks on the quote form.
///
/// `insurance` takes either an insurance tier (`none`, `basic`, `premium`)
/// or an item-value tier (`low`, `medium`, `high`, `priceless`); see
/// [`insurance_for`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteOptions {
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default = "default_insurance")]
    pub insurance: String,
    #[serde(default)]
    pub service_type: ServiceType,
    /// Recorded for display only, not priced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,
    /// Recorded for display only, not priced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
}

fn default_insurance() -> String {
    "medium".to_string()
}

impl Default for QuoteOptions {
    fn default() -> Self {
        Self {
            urgency: Urgency::default(),
            insurance: default_insurance(),
            service_type: ServiceType::default(),
            time_of_day: None,
            weather: None,
        }
    }
}

impl QuoteOptions {
    pub fn insurance_tier(&self) -> Insurance {
        insurance_for(&self.insurance)
    }
}

/// Map the form's insurance vocabulary onto a tier. Unknown values get basic
/// coverage.
pub fn insurance_for(value: &str) -> Insurance {
    match value.trim().to_ascii_lowercase().as_str() {
        "none" | "low" => Insurance::None,
        "basic" | "medium" => Insurance::Basic,
        "premium" | "high" | "priceless" => Insurance::Premium,
        _ => Insurance::Basic,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub distance: u64,
    pub price: i64,
    /// Minutes.
    pub estimated_time: u64,
    pub danger_level: DangerLevel,
    pub difficulty: Difficulty,
    pub special_notes: Vec<String>,
    pub breakdown: PricingBreakdown,
    #[serde(with = "time::serde::rfc3339")]
    pub quoted_at: OffsetDateTime,
}

impl Quote {
    pub fn quoted_at_rfc3339(&self) -> Option<String> {
        self.quoted_at.format(&Rfc3339).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_value_vocabulary() {
        assert_eq!(insurance_for("low"), Insurance::None);
        assert_eq!(insurance_for("medium"), Insurance::Basic);
        assert_eq!(insurance_for("High"), Insurance::Premium);
        assert_eq!(insurance_for("priceless"), Insurance::Premium);
        assert_eq!(insurance_for("none"), Insurance::None);
        assert_eq!(insurance_for("premium"), Insurance::Premium);
    }

    #[test]
    fn unknown_value_gets_basic() {
        assert_eq!(insurance_for("diamonds"), Insurance::Basic);
        assert_eq!(insurance_for(""), Insurance::Basic);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: QuoteOptions = serde_json::from_str(r#"{"urgency":"urgent"}"#).unwrap();
        assert_eq!(options.urgency, Urgency::Urgent);
        assert_eq!(options.insurance_tier(), Insurance::Basic);
        assert_eq!(options.service_type, ServiceType::Delivery);
        assert_eq!(options.weather, None);
    }

    #[test]
    fn options_reject_unknown_urgency() {
        let parsed = serde_json::from_str::<QuoteOptions>(r#"{"urgency":"yesterday"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn formats_quote_time() {
        let quote = Quote {
            distance: 0,
            price: 5,
            estimated_time: 0,
            danger_level: DangerLevel::Safe,
            difficulty: Difficulty::Easy,
            special_notes: Vec::new(),
            breakdown: PricingBreakdown {
                base_price: 3,
                distance_cost: 0,
                modifiers: Vec::new(),
                total_price: 5,
            },
            quoted_at: OffsetDateTime::UNIX_EPOCH,
        };
        assert_eq!(quote.quoted_at_rfc3339().as_deref(), Some("1970-01-01T00:00:00Z"));

        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["quoted_at"], "1970-01-01T00:00:00Z");
        let back: Quote = serde_json::from_value(json).unwrap();
        assert_eq!(back, quote);
    }
}
