//! Fare pricing engine.
//!
//! Prices chauffeur journeys from per-vehicle rate cards: tiered distance
//! (point-to-point), hourly, and airport-specific pricing, plus extras, VAT
//! and rounding. The calculators are pure; services add cache and database
//! lookups and routes expose them over HTTP.

pub mod calculators;
pub mod locations;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{calculate_total_price, quick_estimate, quote, round_money, JourneyRequest};
pub use locations::{detect_special_locations, haversine_km, Coordinates};
pub use routes::router;
pub use services::{PricingError, QuoteInput, QuoteOutcome};
