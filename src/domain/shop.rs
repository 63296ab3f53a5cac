use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

const EARTH_RADIUS_KM: f64 = 6371.0;

impl Location {
    /// Haversine great-circle distance in kilometres.
    pub fn distance_km(&self, other: &Location) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// Pricing bucket derived from the average product price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceTier {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: u32,
    pub name: String,
    pub food_category: String,
    pub stars: f32,
    pub votes: u32,
    pub location: Location,
    #[serde(default)]
    pub logo_path: String,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Shop {
    pub fn average_product_price(&self) -> f32 {
        if self.products.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.products.iter().map(|p| p.price).sum();
        sum / self.products.len() as f32
    }

    pub fn price_tier(&self) -> PriceTier {
        let avg = self.average_product_price();
        if avg <= 5.0 {
            PriceTier::Low
        } else if avg <= 15.0 {
            PriceTier::Medium
        } else {
            PriceTier::High
        }
    }

    /// Folds a new rating into the running average. Ratings outside [0, 5]
    /// are ignored.
    pub fn record_rating(&mut self, rating: f32) {
        if !(0.0..=5.0).contains(&rating) {
            return;
        }
        if self.votes == 0 {
            self.stars = rating;
            self.votes = 1;
        } else {
            let sum = self.stars * self.votes as f32;
            self.votes += 1;
            self.stars = (sum + rating) / self.votes as f32;
        }
    }

    pub fn total_sales(&self) -> u64 {
        self.products.iter().map(|p| p.sold as u64).sum()
    }

    pub fn sales_for_product_type(&self, product_type: &str) -> u64 {
        self.products
            .iter()
            .filter(|p| p.product_type == product_type)
            .map(|p| p.sold as u64)
            .sum()
    }

    /// Products visible to customers.
    pub fn listed_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| !p.removed)
    }
}
