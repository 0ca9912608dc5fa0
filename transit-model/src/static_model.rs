use serde::{Deserialize, Serialize};
use transit_core::address::extract_city;
use transit_core::Order;

use crate::tables::{FactorTables, BASE_HOURS, MAX_VOLUME_FACTOR, MAX_WEIGHT_FACTOR};

/// Lane length bucket, each with a fixed duration multiplier on the
/// 24-hour base.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistanceCategory {
    Short,
    Medium,
    Long,
}

impl DistanceCategory {
    pub fn from_km(km: f64) -> Self {
        if km < 200.0 {
            DistanceCategory::Short
        } else if km <= 800.0 {
            DistanceCategory::Medium
        } else {
            DistanceCategory::Long
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            DistanceCategory::Short => 0.8,
            DistanceCategory::Medium => 1.0,
            DistanceCategory::Long => 1.3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceCategory::Short => "short",
            DistanceCategory::Medium => "medium",
            DistanceCategory::Long => "long",
        }
    }
}

/// Calendar season. Winter is the slowest season for ground transit,
/// autumn the fastest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            Season::Winter => 1.25,
            Season::Spring => 1.05,
            Season::Summer => 1.1,
            Season::Autumn => 0.95,
        }
    }
}

/// Every deterministic multiplier for one order, plus the resolution flags
/// the confidence scorer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticFactors {
    pub base_hours: f64,
    pub distance_km: f64,
    pub distance_category: DistanceCategory,
    pub distance_resolved: bool,
    pub carrier_factor: f64,
    pub carrier_known: bool,
    pub seasonal_factor: f64,
    pub weight_factor: f64,
    pub volume_factor: f64,
    pub priority_factor: f64,
}

impl StaticFactors {
    /// Product of the base and all static multipliers. Deterministic for
    /// fixed order attributes and month.
    pub fn static_hours(&self) -> f64 {
        self.base_hours
            * self.carrier_factor
            * self.seasonal_factor
            * self.weight_factor
            * self.volume_factor
            * self.priority_factor
    }
}

/// The parametric duration model. Pure: same order and month always yield
/// the same factors, and evaluation never fails.
pub struct StaticFactorModel {
    tables: FactorTables,
}

impl StaticFactorModel {
    pub fn new(tables: FactorTables) -> Self {
        Self { tables }
    }

    pub fn evaluate(&self, order: &Order, month: u32) -> StaticFactors {
        let origin_city = extract_city(&order.origin);
        let destination_city = extract_city(&order.destination);

        let (distance_km, distance_resolved) =
            self.tables.distance_km(&origin_city, &destination_city);
        let distance_category = DistanceCategory::from_km(distance_km);
        let base_hours = BASE_HOURS * distance_category.multiplier();

        let (carrier_factor, carrier_known) = self.tables.carrier_factor(&order.carrier);
        let seasonal_factor = Season::from_month(month).multiplier();

        let weight_factor = (1.0 + order.weight_kg / 10_000.0).min(MAX_WEIGHT_FACTOR);
        let volume_factor = (1.0 + order.volume_m3 / 2_000.0).min(MAX_VOLUME_FACTOR);

        let priority_factor = self.tables.priority_factor(order.priority.as_deref());

        StaticFactors {
            base_hours,
            distance_km,
            distance_category,
            distance_resolved,
            carrier_factor,
            carrier_known,
            seasonal_factor,
            weight_factor,
            volume_factor,
            priority_factor,
        }
    }
}
