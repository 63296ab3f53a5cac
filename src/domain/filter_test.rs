use crate::domain::filter::{FilterSpec, Proximity};
use crate::domain::product::Product;
use crate::domain::shop::{Location, PriceTier, Shop};

fn shop(name: &str, category: &str, stars: f32, price: f32, lat: f64, lon: f64) -> Shop {
    Shop {
        id: 0,
        name: name.to_string(),
        food_category: category.to_string(),
        stars,
        votes: 100,
        location: Location {
            latitude: lat,
            longitude: lon,
        },
        logo_path: String::new(),
        products: vec![Product {
            id: 0,
            name: "item".to_string(),
            product_type: category.to_string(),
            price,
            stock: 5,
            sold: 0,
            removed: false,
        }],
    }
}

#[test]
fn empty_spec_matches_everything() {
    let spec = FilterSpec::default();
    assert!(spec.matches(&shop("a", "pizza", 1.0, 30.0, 0.0, 0.0)));
}

#[test]
fn category_and_stars_are_conjunctive() {
    let spec = FilterSpec {
        categories: vec!["pizza".to_string(), "sushi".to_string()],
        min_stars: Some(3.5),
        ..FilterSpec::default()
    };

    assert!(spec.matches(&shop("a", "pizza", 4.0, 8.0, 0.0, 0.0)));
    assert!(!spec.matches(&shop("b", "burger", 4.0, 8.0, 0.0, 0.0)));
    assert!(!spec.matches(&shop("c", "pizza", 3.0, 8.0, 0.0, 0.0)));
}

#[test]
fn price_tier_filter() {
    let spec = FilterSpec {
        price_tiers: vec![PriceTier::Low, PriceTier::Medium],
        ..FilterSpec::default()
    };

    assert!(spec.matches(&shop("cheap", "pizza", 4.0, 4.0, 0.0, 0.0)));
    assert!(!spec.matches(&shop("fancy", "pizza", 4.0, 40.0, 0.0, 0.0)));
}

#[test]
fn proximity_filter_uses_radius() {
    // Client in central Athens, 5km radius.
    let spec = FilterSpec {
        near: Some(Proximity {
            latitude: 37.9838,
            longitude: 23.7275,
            radius_km: 5.0,
        }),
        ..FilterSpec::default()
    };

    let close = shop("close", "pizza", 4.0, 8.0, 37.99, 23.73);
    let far = shop("far", "pizza", 4.0, 8.0, 40.6401, 22.9444);

    assert!(spec.matches(&close));
    assert!(!spec.matches(&far));
}
