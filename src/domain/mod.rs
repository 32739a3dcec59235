//! Quote domain: coordinates, route analysis and pricing.

pub mod conditions;
pub mod coordinates;
pub mod pricing;
pub mod quote;
pub mod route;

pub use conditions::{condition_surcharges, TimeOfDay, Weather};
pub use coordinates::{
    parse_coordinates, validate_coordinates, CoordinateError, Coordinates, FORMAT_HINT,
};
pub use pricing::{
    calculate_price, Insurance, PriceModifier, PricingBreakdown, PricingFactors, ServiceType,
    UnknownOption, Urgency, MINIMUM_CHARGE,
};
pub use quote::{insurance_for, Quote, QuoteOptions};
pub use route::{analyze_route, DangerLevel, Difficulty, RouteAnalysis};
