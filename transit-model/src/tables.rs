use std::collections::HashMap;

/// Transit duration base for a medium-distance lane, in hours.
pub const BASE_HOURS: f64 = 24.0;

/// Applied when a city pair is not in the distance table.
pub const DEFAULT_DISTANCE_KM: f64 = 800.0;

/// Caps on the cargo-magnitude multipliers, so extreme shipments cannot
/// produce runaway estimates.
pub const MAX_WEIGHT_FACTOR: f64 = 1.5;
pub const MAX_VOLUME_FACTOR: f64 = 1.3;

/// Lookup tables for the parametric duration model.
///
/// Injected rather than global so deployments can extend carrier and lane
/// coverage without code changes, and tests can run against small fixtures.
#[derive(Debug, Clone)]
pub struct FactorTables {
    /// Duration multipliers keyed by carrier name (lowercased).
    pub carrier_multipliers: HashMap<String, f64>,

    /// Lane distances in km, keyed by alphabetically ordered city pair.
    pub city_distances: HashMap<(String, String), f64>,

    /// Duration multipliers keyed by priority label (lowercased).
    pub priority_multipliers: HashMap<String, f64>,
}

impl FactorTables {
    /// Carrier multiplier, or the neutral 1.0 for unknown carriers.
    /// The bool reports whether the carrier was in the table.
    pub fn carrier_factor(&self, carrier: &str) -> (f64, bool) {
        match self.carrier_multipliers.get(&carrier.to_lowercase()) {
            Some(f) => (*f, true),
            None => (1.0, false),
        }
    }

    /// Lane distance between two cities, falling back to
    /// [`DEFAULT_DISTANCE_KM`] for unknown pairs. Never fails.
    pub fn distance_km(&self, city_a: &str, city_b: &str) -> (f64, bool) {
        match self.city_distances.get(&pair_key(city_a, city_b)) {
            Some(km) => (*km, true),
            None => (DEFAULT_DISTANCE_KM, false),
        }
    }

    /// Priority multiplier; absent or unrecognized priority is neutral.
    pub fn priority_factor(&self, priority: Option<&str>) -> f64 {
        priority
            .and_then(|p| self.priority_multipliers.get(&p.to_lowercase()))
            .copied()
            .unwrap_or(1.0)
    }
}

/// Distances are symmetric, so pairs are keyed in alphabetical order.
fn pair_key(city_a: &str, city_b: &str) -> (String, String) {
    let a = city_a.to_lowercase();
    let b = city_b.to_lowercase();
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Default for FactorTables {
    fn default() -> Self {
        let carrier_multipliers = HashMap::from([
            ("carrierx".to_string(), 0.85),
            ("dhl".to_string(), 0.9),
            ("fedex".to_string(), 0.95),
            ("ups".to_string(), 0.95),
            ("dpd".to_string(), 1.05),
            ("hermes".to_string(), 1.1),
            ("gls".to_string(), 1.0),
        ]);

        let mut city_distances = HashMap::new();
        for (a, b, km) in [
            ("berlin", "hamburg", 290.0),
            ("berlin", "munich", 585.0),
            ("berlin", "cologne", 575.0),
            ("berlin", "frankfurt", 545.0),
            ("hamburg", "munich", 775.0),
            ("hamburg", "cologne", 425.0),
            ("hamburg", "frankfurt", 490.0),
            ("munich", "cologne", 575.0),
            ("munich", "frankfurt", 400.0),
            ("cologne", "frankfurt", 190.0),
            ("berlin", "warsaw", 575.0),
            ("berlin", "prague", 350.0),
            ("berlin", "amsterdam", 660.0),
            ("berlin", "vienna", 680.0),
            ("berlin", "paris", 1050.0),
            ("hamburg", "copenhagen", 340.0),
            ("munich", "vienna", 435.0),
            ("munich", "zurich", 310.0),
            ("frankfurt", "paris", 570.0),
            ("amsterdam", "paris", 500.0),
            ("paris", "madrid", 1270.0),
            ("paris", "london", 470.0),
            ("warsaw", "vienna", 680.0),
        ] {
            city_distances.insert(pair_key(a, b), km);
        }

        let priority_multipliers = HashMap::from([
            ("urgent".to_string(), 0.5),
            ("high".to_string(), 0.7),
        ]);

        Self {
            carrier_multipliers,
            city_distances,
            priority_multipliers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_carrier_is_neutral() {
        let tables = FactorTables::default();
        assert_eq!(tables.carrier_factor("Nonexistent Freight"), (1.0, false));
        assert_eq!(tables.carrier_factor("CarrierX"), (0.85, true));
    }

    #[test]
    fn distance_lookup_is_symmetric() {
        let tables = FactorTables::default();
        assert_eq!(tables.distance_km("Hamburg", "Berlin"), (290.0, true));
        assert_eq!(tables.distance_km("berlin", "hamburg"), (290.0, true));
    }

    #[test]
    fn unknown_pair_uses_default_distance() {
        let tables = FactorTables::default();
        let (km, resolved) = tables.distance_km("atlantis", "el dorado");
        assert_eq!(km, DEFAULT_DISTANCE_KM);
        assert!(!resolved);
    }

    #[test]
    fn priority_defaults_to_neutral() {
        let tables = FactorTables::default();
        assert_eq!(tables.priority_factor(Some("urgent")), 0.5);
        assert_eq!(tables.priority_factor(Some("high")), 0.7);
        assert_eq!(tables.priority_factor(Some("whenever")), 1.0);
        assert_eq!(tables.priority_factor(None), 1.0);
    }
}
