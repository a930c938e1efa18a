//! Core fare calculation functions.
//!
//! Pure functions for fare math - no database access. Every resolver works on
//! full-precision decimals; rounding happens once, in [`finalize`] and in the
//! response layer, so tier arithmetic never compounds rounding error.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::pricing::models::{
    AirportPricingConfig, DistanceTier, ExtrasConfig, HourlyConfig, PricingConfig, PricingKind,
    TierKind,
};

/// UK VAT, applied when a config displays prices VAT-inclusive
pub const VAT_RATE: Decimal = dec!(0.20);

/// Miles in one kilometre
pub const MILES_PER_KM: Decimal = dec!(0.621371);

/// Hours used for the hourly figure of a quick estimate
pub const DEFAULT_ESTIMATE_HOURS: Decimal = dec!(4);

pub const P2P_NOT_CONFIGURED: &str = "P2P pricing not configured";
pub const HOURLY_NOT_CONFIGURED: &str = "Hourly pricing not configured";
pub const AIRPORT_NOT_CONFIGURED: &str = "Airport pricing not configured";

const NARRATIVE_SEPARATOR: &str = " + ";

/// Round to specified decimal places, halves away from zero.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use chauffeur_fares::pricing::round_money;
///
/// assert_eq!(round_money(dec!(134.567), 2), dec!(134.57));
/// assert_eq!(round_money(dec!(134.5), 0), dec!(135));
/// assert_eq!(round_money(dec!(2.345), 2), dec!(2.35));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

pub fn km_to_miles(km: Decimal) -> Decimal {
    km * MILES_PER_KM
}

/// `74.5` -> `74.50`
fn money(amount: Decimal) -> String {
    format!("{:.2}", round_money(amount, 2))
}

/// `12` -> `12.0`
fn miles(amount: Decimal) -> String {
    format!("{:.1}", round_money(amount, 1))
}

/// `4.00` -> `4`
fn plain(amount: Decimal) -> String {
    amount.normalize().to_string()
}

/// Result of the tiered distance resolver
#[derive(Debug, Clone, PartialEq)]
pub struct DistancePrice {
    pub base_charge: Decimal,
    pub distance_charge: Decimal,
    pub total: Decimal,
    pub configured: bool,
    pub breakdown: String,
}

impl DistancePrice {
    fn not_configured(reason: &str) -> Self {
        Self {
            base_charge: Decimal::ZERO,
            distance_charge: Decimal::ZERO,
            total: Decimal::ZERO,
            configured: false,
            breakdown: reason.to_string(),
        }
    }
}

/// Price a journey against a tiered distance table.
///
/// The lowest tier is the base charge: a `fixed` first tier is a minimum fare
/// for any trip up to its `toDistance`, a `per_mile` first tier charges only
/// the miles actually used. Miles beyond the first tier are consumed tier by
/// tier, and anything left after the last tier is charged at `after_rate`.
///
/// An empty tier list yields a zero-priced "not configured" result.
pub fn resolve_distance_price(
    tiers: &[DistanceTier],
    after_threshold: Decimal,
    after_rate: Decimal,
    distance_miles: Decimal,
) -> DistancePrice {
    let mut sorted = tiers.to_vec();
    sorted.sort_by(|a, b| a.from_distance.cmp(&b.from_distance));

    let Some((first, rest)) = sorted.split_first() else {
        return DistancePrice::not_configured(P2P_NOT_CONFIGURED);
    };

    let mut parts = Vec::new();

    let base_charge = match first.kind {
        TierKind::Fixed => {
            parts.push(format!(
                "Base: £{} (first {} miles)",
                money(first.price),
                plain(first.to_distance)
            ));
            first.price
        }
        TierKind::PerMile => {
            let used = distance_miles.min(first.to_distance);
            let charge = used * first.price;
            parts.push(format!("First {} miles: £{}", plain(used), money(charge)));
            charge
        }
    };

    if distance_miles <= first.to_distance {
        return DistancePrice {
            base_charge,
            distance_charge: Decimal::ZERO,
            total: base_charge,
            configured: true,
            breakdown: parts.join(NARRATIVE_SEPARATOR),
        };
    }

    let mut remaining = distance_miles - first.to_distance;
    let mut distance_charge = Decimal::ZERO;

    for tier in rest {
        if remaining <= Decimal::ZERO {
            break;
        }

        let range = (tier.to_distance - tier.from_distance).max(Decimal::ZERO);
        let in_tier = remaining.min(range);

        match tier.kind {
            TierKind::PerMile => {
                let charge = in_tier * tier.price;
                distance_charge += charge;
                parts.push(format!(
                    "{}-{} miles: {} × £{} = £{}",
                    plain(tier.from_distance),
                    plain(tier.to_distance),
                    miles(in_tier),
                    money(tier.price),
                    money(charge)
                ));
            }
            TierKind::Fixed => {
                distance_charge += tier.price;
                parts.push(format!(
                    "{}-{} miles: £{}",
                    plain(tier.from_distance),
                    plain(tier.to_distance),
                    money(tier.price)
                ));
            }
        }

        remaining -= in_tier;
    }

    if remaining > Decimal::ZERO && !after_rate.is_zero() {
        let charge = remaining * after_rate;
        distance_charge += charge;
        parts.push(format!(
            "After {} miles: {} × £{} = £{}",
            plain(after_threshold),
            miles(remaining),
            money(after_rate),
            money(charge)
        ));
    }

    DistancePrice {
        base_charge,
        distance_charge,
        total: base_charge + distance_charge,
        configured: true,
        breakdown: parts.join(NARRATIVE_SEPARATOR),
    }
}

/// Result of the hourly resolver
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyPrice {
    pub base_charge: Decimal,
    pub extra_hour_charge: Decimal,
    pub excess_mileage_charge: Decimal,
    pub total: Decimal,
    pub minimum_hours: Decimal,
    pub hourly_rate: Decimal,
    pub miles_included: Decimal,
    pub configured: bool,
    pub breakdown: String,
}

/// Price an hourly ("as directed") booking.
///
/// The minimum hours are always charged, even for shorter bookings. Hours over
/// the minimum use the additional-hour rate and miles over the allowance use
/// the excess-mileage rate.
pub fn resolve_hourly_price(
    config: Option<&HourlyConfig>,
    hours: Decimal,
    distance_miles: Decimal,
) -> HourlyPrice {
    let Some(hourly) = config.filter(|h| h.is_active) else {
        return HourlyPrice {
            base_charge: Decimal::ZERO,
            extra_hour_charge: Decimal::ZERO,
            excess_mileage_charge: Decimal::ZERO,
            total: Decimal::ZERO,
            minimum_hours: Decimal::ZERO,
            hourly_rate: Decimal::ZERO,
            miles_included: Decimal::ZERO,
            configured: false,
            breakdown: HOURLY_NOT_CONFIGURED.to_string(),
        };
    };

    let mut parts = Vec::new();

    let base_charge = hourly.minimum_hours * hourly.hourly_rate;
    parts.push(format!(
        "Base: {} hrs × £{}/hr = £{}",
        plain(hourly.minimum_hours),
        plain(hourly.hourly_rate),
        money(base_charge)
    ));

    let mut extra_hour_charge = Decimal::ZERO;
    if hours > hourly.minimum_hours {
        let extra_hours = hours - hourly.minimum_hours;
        extra_hour_charge = extra_hours * hourly.additional_hour_charge;
        parts.push(format!(
            "Extra: {} hrs × £{}/hr = £{}",
            plain(extra_hours),
            plain(hourly.additional_hour_charge),
            money(extra_hour_charge)
        ));
    }

    let mut excess_mileage_charge = Decimal::ZERO;
    if distance_miles > hourly.miles_included && hourly.excess_mileage_charge > Decimal::ZERO {
        let excess = distance_miles - hourly.miles_included;
        excess_mileage_charge = excess * hourly.excess_mileage_charge;
        parts.push(format!(
            "Excess miles: {} × £{}/mile = £{}",
            miles(excess),
            plain(hourly.excess_mileage_charge),
            money(excess_mileage_charge)
        ));
    }

    HourlyPrice {
        base_charge,
        extra_hour_charge,
        excess_mileage_charge,
        total: base_charge + extra_hour_charge + excess_mileage_charge,
        minimum_hours: hourly.minimum_hours,
        hourly_rate: hourly.hourly_rate,
        miles_included: hourly.miles_included,
        configured: true,
        breakdown: parts.join(NARRATIVE_SEPARATOR),
    }
}

/// Extras selected for a journey.
///
/// Quantities are expected to be non-negative; [`JourneyRequest::sanitized`]
/// clamps them before pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestedExtras {
    pub extra_stops: i32,
    pub child_seats: i32,
    pub include_congestion: bool,
}

/// Result of the extras resolver
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrasPrice {
    pub extra_stop_charge: Decimal,
    pub child_seat_charge: Decimal,
    pub congestion_charge: Decimal,
    pub total: Decimal,
    pub breakdown: String,
}

/// Price the flat per-unit extras and the optional congestion charge
pub fn resolve_extras(config: &ExtrasConfig, requested: RequestedExtras) -> ExtrasPrice {
    let extra_stop_charge = Decimal::from(requested.extra_stops) * config.extra_stop_price;
    let child_seat_charge = Decimal::from(requested.child_seats) * config.child_seat_price;
    let congestion_charge = if requested.include_congestion {
        config.congestion_charge
    } else {
        Decimal::ZERO
    };

    let mut parts = Vec::new();
    if requested.extra_stops > 0 && !config.extra_stop_price.is_zero() {
        parts.push(format!(
            "{} extra stop(s): £{}",
            requested.extra_stops,
            money(extra_stop_charge)
        ));
    }
    if requested.child_seats > 0 && !config.child_seat_price.is_zero() {
        parts.push(format!(
            "{} child seat(s): £{}",
            requested.child_seats,
            money(child_seat_charge)
        ));
    }
    if !congestion_charge.is_zero() {
        parts.push(format!("Congestion charge: £{}", money(congestion_charge)));
    }

    let breakdown = if parts.is_empty() {
        "No additional charges".to_string()
    } else {
        parts.join(NARRATIVE_SEPARATOR)
    };

    ExtrasPrice {
        extra_stop_charge,
        child_seat_charge,
        congestion_charge,
        total: extra_stop_charge + child_seat_charge + congestion_charge,
        breakdown,
    }
}

/// Display policy of the config being priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FinishOptions {
    pub vat_inclusive: bool,
    pub round_off: bool,
}

/// VAT and the payable total
#[derive(Debug, Clone, PartialEq)]
pub struct Finalized {
    /// VAT rate as a percentage
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
    pub vat_inclusive: bool,
    pub grand_total: Decimal,
    pub rounded_off: bool,
}

/// Apply VAT and rounding to a subtotal.
///
/// VAT is added only for VAT-inclusive configs. The grand total is rounded to
/// whole pounds when `round_off` is set, otherwise to pence.
pub fn finalize(subtotal: Decimal, options: FinishOptions) -> Finalized {
    let vat_amount = if options.vat_inclusive {
        subtotal * VAT_RATE
    } else {
        Decimal::ZERO
    };

    let places = if options.round_off { 0 } else { 2 };
    let grand_total = round_money(subtotal + vat_amount, places);

    Finalized {
        vat_rate: VAT_RATE * dec!(100),
        vat_amount: round_money(vat_amount, 2),
        vat_inclusive: options.vat_inclusive,
        grand_total,
        rounded_off: options.round_off,
    }
}

/// Which ends of the journey sit at the priced airport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AirportLeg {
    pub is_pickup: bool,
    pub is_dropoff: bool,
}

/// Result of the airport resolver
#[derive(Debug, Clone, PartialEq)]
pub struct AirportPrice {
    pub journey: DistancePrice,
    pub airport_charges: Decimal,
    pub congestion_charge: Decimal,
    pub subtotal: Decimal,
    pub finish: Finalized,
    pub configured: bool,
    pub breakdown: String,
}

impl AirportPrice {
    pub fn base_charge(&self) -> Decimal {
        self.journey.base_charge
    }

    pub fn distance_charge(&self) -> Decimal {
        self.journey.distance_charge
    }

    pub fn total(&self) -> Decimal {
        self.finish.grand_total
    }
}

/// Price a journey from an airport rate card.
///
/// Uses the same tier walk as [`resolve_distance_price`], then adds the pickup
/// and/or dropoff surcharge for the legs at the airport and the configured
/// congestion charge, which is not conditional on the request.
pub fn resolve_airport_price(
    config: &AirportPricingConfig,
    distance_miles: Decimal,
    leg: AirportLeg,
) -> AirportPrice {
    let options = FinishOptions {
        vat_inclusive: config.display_vat_inclusive,
        round_off: config.price_round_off,
    };

    if config.distance_tiers.is_empty() {
        return AirportPrice {
            journey: DistancePrice::not_configured(AIRPORT_NOT_CONFIGURED),
            airport_charges: Decimal::ZERO,
            congestion_charge: Decimal::ZERO,
            subtotal: Decimal::ZERO,
            finish: finalize(Decimal::ZERO, options),
            configured: false,
            breakdown: AIRPORT_NOT_CONFIGURED.to_string(),
        };
    }

    let journey = resolve_distance_price(
        &config.distance_tiers,
        config.after_distance_threshold,
        config.after_distance_price_per_mile,
        distance_miles,
    );

    let extras = &config.extras;
    let mut parts = vec![journey.breakdown.clone()];

    let mut airport_charges = Decimal::ZERO;
    if leg.is_pickup && extras.airport_pickup_charge > Decimal::ZERO {
        airport_charges += extras.airport_pickup_charge;
        parts.push(format!(
            "Airport pickup charge: £{}",
            money(extras.airport_pickup_charge)
        ));
    }
    if leg.is_dropoff && extras.airport_dropoff_charge > Decimal::ZERO {
        airport_charges += extras.airport_dropoff_charge;
        parts.push(format!(
            "Airport dropoff charge: £{}",
            money(extras.airport_dropoff_charge)
        ));
    }

    let congestion_charge = extras.congestion_charge.max(Decimal::ZERO);
    if congestion_charge > Decimal::ZERO {
        parts.push(format!("Congestion charge: £{}", money(congestion_charge)));
    }

    let subtotal = journey.total + airport_charges + congestion_charge;

    AirportPrice {
        journey,
        airport_charges,
        congestion_charge,
        subtotal,
        finish: finalize(subtotal, options),
        configured: true,
        breakdown: parts.join(NARRATIVE_SEPARATOR),
    }
}

/// Journey parameters supplied by the caller
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JourneyRequest {
    pub booking_type: PricingKind,
    pub distance_miles: Decimal,
    pub hours: Decimal,
    pub extras: RequestedExtras,
    pub is_pickup: bool,
    pub is_dropoff: bool,
}

impl JourneyRequest {
    pub fn point_to_point(distance_miles: Decimal) -> Self {
        Self {
            booking_type: PricingKind::P2p,
            distance_miles,
            ..Default::default()
        }
    }

    pub fn hourly(hours: Decimal, distance_miles: Decimal) -> Self {
        Self {
            booking_type: PricingKind::Hourly,
            distance_miles,
            hours,
            ..Default::default()
        }
    }

    /// Copy of the request with negative quantities clamped to zero
    pub fn sanitized(&self) -> Self {
        let clamped = Self {
            booking_type: self.booking_type,
            distance_miles: self.distance_miles.max(Decimal::ZERO),
            hours: self.hours.max(Decimal::ZERO),
            extras: RequestedExtras {
                extra_stops: self.extras.extra_stops.max(0),
                child_seats: self.extras.child_seats.max(0),
                include_congestion: self.extras.include_congestion,
            },
            is_pickup: self.is_pickup,
            is_dropoff: self.is_dropoff,
        };

        if &clamped != self {
            tracing::debug!(request = ?self, "Clamped negative journey quantities to zero");
        }

        clamped
    }

    pub fn leg(&self) -> AirportLeg {
        AirportLeg {
            is_pickup: self.is_pickup,
            is_dropoff: self.is_dropoff,
        }
    }
}

/// Journey price from a standard config
#[derive(Debug, Clone, PartialEq)]
pub enum JourneyPrice {
    PointToPoint(DistancePrice),
    Hourly(HourlyPrice),
}

impl JourneyPrice {
    pub fn total(&self) -> Decimal {
        match self {
            JourneyPrice::PointToPoint(p) => p.total,
            JourneyPrice::Hourly(h) => h.total,
        }
    }

    pub fn base_charge(&self) -> Decimal {
        match self {
            JourneyPrice::PointToPoint(p) => p.base_charge,
            JourneyPrice::Hourly(h) => h.base_charge,
        }
    }

    pub fn breakdown(&self) -> &str {
        match self {
            JourneyPrice::PointToPoint(p) => &p.breakdown,
            JourneyPrice::Hourly(h) => &h.breakdown,
        }
    }

    pub fn is_configured(&self) -> bool {
        match self {
            JourneyPrice::PointToPoint(p) => p.configured,
            JourneyPrice::Hourly(h) => h.configured,
        }
    }
}

/// Complete price for a standard (P2P or hourly) booking
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown {
    pub booking_type: PricingKind,
    pub distance_miles: Decimal,
    pub hours: Option<Decimal>,
    pub journey: JourneyPrice,
    pub extras: ExtrasPrice,
    pub subtotal: Decimal,
    pub finish: Finalized,
    pub coverage_zone: String,
}

impl PriceBreakdown {
    pub fn is_configured(&self) -> bool {
        self.journey.is_configured()
    }

    pub fn total(&self) -> Decimal {
        self.finish.grand_total
    }

    /// Journey narrative followed by any extras
    pub fn narrative(&self) -> String {
        if self.extras.total.is_zero() {
            self.journey.breakdown().to_string()
        } else {
            format!(
                "{}{}{}",
                self.journey.breakdown(),
                NARRATIVE_SEPARATOR,
                self.extras.breakdown
            )
        }
    }
}

/// Price a booking against a standard config.
///
/// Hourly bookings use the hourly resolver; every other booking type is priced
/// by distance. Journey total plus extras is the subtotal, which is then taxed
/// and rounded per the config's display flags.
pub fn calculate_total_price(config: &PricingConfig, request: &JourneyRequest) -> PriceBreakdown {
    let request = request.sanitized();

    let journey = match request.booking_type {
        PricingKind::Hourly => JourneyPrice::Hourly(resolve_hourly_price(
            config.hourly.as_ref(),
            request.hours,
            request.distance_miles,
        )),
        _ => JourneyPrice::PointToPoint(match config.point_to_point.as_ref() {
            Some(p2p) if p2p.is_active => resolve_distance_price(
                &p2p.distance_tiers,
                p2p.after_distance_threshold,
                p2p.after_distance_price_per_mile,
                request.distance_miles,
            ),
            _ => DistancePrice::not_configured(P2P_NOT_CONFIGURED),
        }),
    };

    let extras = resolve_extras(&config.extras, request.extras);
    let subtotal = journey.total() + extras.total;

    let finish = finalize(
        subtotal,
        FinishOptions {
            vat_inclusive: config.display_vat_inclusive,
            round_off: config.price_round_off,
        },
    );

    PriceBreakdown {
        booking_type: request.booking_type,
        distance_miles: request.distance_miles,
        hours: (request.booking_type == PricingKind::Hourly).then_some(request.hours),
        journey,
        extras,
        subtotal,
        finish,
        coverage_zone: config.coverage_zone.clone(),
    }
}

/// The rate card a journey is priced from
#[derive(Debug, Clone, Copy)]
pub enum RateCard<'a> {
    Standard(&'a PricingConfig),
    Airport(&'a AirportPricingConfig),
}

/// A priced journey from either kind of rate card
#[derive(Debug, Clone, PartialEq)]
pub enum Quote {
    Standard(PriceBreakdown),
    Airport(AirportPrice),
}

impl Quote {
    pub fn is_configured(&self) -> bool {
        match self {
            Quote::Standard(b) => b.is_configured(),
            Quote::Airport(a) => a.configured,
        }
    }

    pub fn total(&self) -> Decimal {
        match self {
            Quote::Standard(b) => b.total(),
            Quote::Airport(a) => a.total(),
        }
    }

    pub fn booking_type(&self) -> PricingKind {
        match self {
            Quote::Standard(b) => b.booking_type,
            Quote::Airport(_) => PricingKind::Airport,
        }
    }

    pub fn narrative(&self) -> String {
        match self {
            Quote::Standard(b) => b.narrative(),
            Quote::Airport(a) => a.breakdown.clone(),
        }
    }
}

/// Price a journey against whichever rate card applies
pub fn quote(card: RateCard<'_>, request: &JourneyRequest) -> Quote {
    match card {
        RateCard::Standard(config) => Quote::Standard(calculate_total_price(config, request)),
        RateCard::Airport(config) => {
            let request = request.sanitized();
            Quote::Airport(resolve_airport_price(
                config,
                request.distance_miles,
                request.leg(),
            ))
        }
    }
}

/// One line of a quick estimate
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateLine {
    pub total: Decimal,
    pub display: String,
}

/// Hourly line of a quick estimate
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyEstimateLine {
    pub total: Decimal,
    pub minimum_hours: Decimal,
    pub hourly_rate: Decimal,
    pub display: String,
}

/// Journey-only prices for a vehicle listing; `None` means unavailable
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuickEstimate {
    pub p2p: Option<EstimateLine>,
    pub hourly: Option<HourlyEstimateLine>,
}

/// Journey-only P2P and hourly prices for display next to a vehicle.
///
/// No extras, VAT or rounding are applied.
pub fn quick_estimate(config: &PricingConfig, distance_miles: Decimal, hours: Decimal) -> QuickEstimate {
    let distance_miles = distance_miles.max(Decimal::ZERO);

    let p2p = config
        .point_to_point
        .as_ref()
        .filter(|p| p.is_active)
        .map(|p| {
            let price = resolve_distance_price(
                &p.distance_tiers,
                p.after_distance_threshold,
                p.after_distance_price_per_mile,
                distance_miles,
            );
            let total = round_money(price.total, 2);
            EstimateLine {
                total,
                display: format!("£{}", money(total)),
            }
        });

    let hourly = config
        .hourly
        .as_ref()
        .filter(|h| h.is_active)
        .map(|h| {
            let price = resolve_hourly_price(Some(h), hours.max(Decimal::ZERO), distance_miles);
            let total = round_money(price.total, 2);
            HourlyEstimateLine {
                total,
                minimum_hours: price.minimum_hours,
                hourly_rate: price.hourly_rate,
                display: format!(
                    "From £{} ({}hr min)",
                    money(total),
                    plain(price.minimum_hours)
                ),
            }
        });

    QuickEstimate { p2p, hourly }
}
