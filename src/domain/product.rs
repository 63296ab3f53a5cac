use serde::{Deserialize, Serialize};

/// One item sold by a shop. Removed products stay in the catalog so past
/// sales keep counting; they are only hidden from listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub product_type: String,
    pub price: f32,
    pub stock: u32,
    pub sold: u32,
    #[serde(default)]
    pub removed: bool,
}
