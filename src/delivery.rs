//! Delivery charge tiers.

use serde::{Deserialize, Serialize};

/// Two flat tiers keyed on whether the destination is inside Dhaka.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverySettings {
    #[serde(default = "default_dhaka_charge")]
    pub dhaka_charge: f64,
    #[serde(default = "default_outside_dhaka_charge")]
    pub outside_dhaka_charge: f64,
    /// Shown to shoppers by the storefront. The calculator does not apply it.
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: f64,
}

fn default_dhaka_charge() -> f64 {
    60.0
}

fn default_outside_dhaka_charge() -> f64 {
    110.0
}

fn default_free_shipping_threshold() -> f64 {
    5000.0
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            dhaka_charge: default_dhaka_charge(),
            outside_dhaka_charge: default_outside_dhaka_charge(),
            free_shipping_threshold: default_free_shipping_threshold(),
        }
    }
}

/// Fee for shipping to `city`.
///
/// Always charges a fee. The subtotal and the free-shipping threshold are
/// not consulted.
pub fn calculate_delivery_charge(city: &str, _subtotal: f64, settings: &DeliverySettings) -> f64 {
    if city.to_lowercase().contains("dhaka") {
        settings.dhaka_charge
    } else {
        settings.outside_dhaka_charge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> DeliverySettings {
        DeliverySettings {
            dhaka_charge: 60.0,
            outside_dhaka_charge: 110.0,
            free_shipping_threshold: 1000.0,
        }
    }

    #[test]
    fn test_inside_dhaka() {
        assert_eq!(calculate_delivery_charge("Dhaka", 2000.0, &settings()), 60.0);
        assert_eq!(calculate_delivery_charge("North DHAKA Cantonment", 10.0, &settings()), 60.0);
    }

    #[test]
    fn test_outside_dhaka_ignores_free_shipping_threshold() {
        let s = settings();
        assert_eq!(calculate_delivery_charge("Chittagong", 2000.0, &s), 110.0);
        assert!(2000.0 > s.free_shipping_threshold);
    }

    #[test]
    fn test_empty_city_is_outside() {
        assert_eq!(calculate_delivery_charge("", 0.0, &settings()), 110.0);
    }

    #[test]
    fn test_defaults_deserialize_from_empty_table() {
        let s: DeliverySettings = toml::from_str("").unwrap();
        assert_eq!(s, DeliverySettings::default());
    }
}
