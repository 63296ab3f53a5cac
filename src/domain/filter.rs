use serde::{Deserialize, Serialize};

use crate::domain::shop::{Location, PriceTier, Shop};

/// Client location plus search radius for proximity filtering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Proximity {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
}

/// Conjunction of optional filter criteria. Empty lists and `None` fields
/// match everything.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub min_stars: Option<f32>,
    #[serde(default)]
    pub price_tiers: Vec<PriceTier>,
    #[serde(default)]
    pub near: Option<Proximity>,
}

impl FilterSpec {
    pub fn matches(&self, shop: &Shop) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&shop.food_category) {
            return false;
        }
        if let Some(min) = self.min_stars {
            if shop.stars < min {
                return false;
            }
        }
        if !self.price_tiers.is_empty() && !self.price_tiers.contains(&shop.price_tier()) {
            return false;
        }
        if let Some(near) = &self.near {
            let client = Location {
                latitude: near.latitude,
                longitude: near.longitude,
            };
            if shop.location.distance_km(&client) > near.radius_km {
                return false;
            }
        }
        true
    }
}
