//! Itemized pricing for a single delivery.
//!
//! Prices are whole units. The danger multiplier is applied once to the
//! subtotal, and the resulting difference is itemized as a "Danger Tax" so
//! the modifiers always reconcile with the pre-floor total.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::route::DangerLevel;

pub const BASE_PRICE: i64 = 3;
/// Cost of each started 100-block band.
pub const COST_PER_100_BLOCKS: i64 = 2;
pub const MINIMUM_CHARGE: i64 = 5;

pub const DANGER_TAX: &str = "Danger Tax";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Whenever,
    #[default]
    Soon,
    Urgent,
    Emergency,
}

impl Urgency {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Whenever => "Whenever",
            Self::Soon => "Soon",
            Self::Urgent => "Urgent",
            Self::Emergency => "Emergency",
        }
    }

    fn modifier(&self) -> Option<PriceModifier> {
        match self {
            Self::Whenever => Some(PriceModifier::new(
                "Patience Discount",
                -1,
                "Thanks for your patience: delivered when a courier is free",
            )),
            Self::Soon => None,
            Self::Urgent => Some(PriceModifier::new(
                "Urgency Fee",
                5,
                "Urgent delivery jumps the queue",
            )),
            Self::Emergency => Some(PriceModifier::new(
                "Urgency Fee",
                15,
                "Emergency dispatch: a courier drops everything",
            )),
        }
    }
}

impl FromStr for Urgency {
    type Err = UnknownOption;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "whenever" => Ok(Self::Whenever),
            "soon" => Ok(Self::Soon),
            "urgent" => Ok(Self::Urgent),
            "emergency" => Ok(Self::Emergency),
            _ => Err(UnknownOption {
                kind: "urgency",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Insurance {
    None,
    #[default]
    Basic,
    Premium,
}

impl Insurance {
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Basic => "Basic",
            Self::Premium => "Premium",
        }
    }

    fn modifier(&self) -> Option<PriceModifier> {
        match self {
            Self::None => None,
            Self::Basic => Some(PriceModifier::new(
                "Insurance",
                2,
                "Basic coverage for lost or burned items",
            )),
            Self::Premium => Some(PriceModifier::new(
                "Insurance",
                5,
                "Premium coverage, full replacement of lost items",
            )),
        }
    }
}

impl FromStr for Insurance {
    type Err = UnknownOption;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "basic" => Ok(Self::Basic),
            "premium" => Ok(Self::Premium),
            _ => Err(UnknownOption {
                kind: "insurance",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    #[default]
    Delivery,
    Shopping,
    Rescue,
}

impl ServiceType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivery => "Delivery",
            Self::Shopping => "Shopping",
            Self::Rescue => "Rescue",
        }
    }

    fn modifier(&self) -> Option<PriceModifier> {
        match self {
            Self::Delivery => None,
            Self::Shopping => Some(PriceModifier::new(
                "Shopping Service",
                2,
                "Courier buys the items before delivering",
            )),
            Self::Rescue => Some(PriceModifier::new(
                "Emergency Rescue",
                5,
                "Recovering a stranded player or their gear",
            )),
        }
    }
}

impl FromStr for ServiceType {
    type Err = UnknownOption;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "delivery" => Ok(Self::Delivery),
            "shopping" => Ok(Self::Shopping),
            "rescue" => Ok(Self::Rescue),
            _ => Err(UnknownOption {
                kind: "service type",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PricingFactors {
    pub distance: u64,
    pub urgency: Urgency,
    pub insurance: Insurance,
    pub danger_level: DangerLevel,
    pub service_type: ServiceType,
}

/// One itemized line of a price. Negative costs are discounts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceModifier {
    pub name: String,
    pub cost: i64,
    pub reason: String,
}

impl PriceModifier {
    pub fn new(name: impl Into<String>, cost: i64, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cost,
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub base_price: i64,
    pub distance_cost: i64,
    pub modifiers: Vec<PriceModifier>,
    pub total_price: i64,
}

impl PricingBreakdown {
    /// Base, distance and every modifier, before the minimum-charge floor.
    pub fn itemized_total(&self) -> i64 {
        self.modifiers
            .iter()
            .fold(self.base_price.saturating_add(self.distance_cost), |sum, m| {
                sum.saturating_add(m.cost)
            })
    }

    /// True when the minimum charge raised the total above the itemized sum.
    pub fn is_floored(&self) -> bool {
        self.total_price > self.itemized_total()
    }
}

pub fn distance_cost(distance: u64) -> i64 {
    i64::try_from(distance.div_ceil(100))
        .unwrap_or(i64::MAX)
        .saturating_mul(COST_PER_100_BLOCKS)
}

pub fn calculate_price(factors: &PricingFactors) -> PricingBreakdown {
    let distance_cost = distance_cost(factors.distance);

    let mut modifiers: Vec<PriceModifier> = [
        factors.service_type.modifier(),
        factors.urgency.modifier(),
        factors.insurance.modifier(),
    ]
    .into_iter()
    .flatten()
    .collect();

    let subtotal = modifiers
        .iter()
        .fold(BASE_PRICE.saturating_add(distance_cost), |sum, m| {
            sum.saturating_add(m.cost)
        });

    let percent = factors.danger_level.multiplier_percent();
    let mut total_price = ceil_percent(subtotal, percent);
    if percent > 100 {
        modifiers.push(PriceModifier::new(
            DANGER_TAX,
            total_price - subtotal,
            format!(
                "{} route, {}x hazard pay",
                factors.danger_level.label(),
                factors.danger_level.multiplier()
            ),
        ));
    }

    total_price = total_price.max(MINIMUM_CHARGE);

    PricingBreakdown {
        base_price: BASE_PRICE,
        distance_cost,
        modifiers,
        total_price,
    }
}

/// `ceil(value * percent / 100)` without floating point drift, clamped to
/// the `i64` range.
fn ceil_percent(value: i64, percent: i64) -> i64 {
    let scaled = i128::from(value) * i128::from(percent);
    let ceiled = scaled.div_euclid(100) + i128::from(scaled.rem_euclid(100) != 0);
    i64::try_from(ceiled).unwrap_or(if ceiled < 0 { i64::MIN } else { i64::MAX })
}
