use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::domain::shop::Shop;
use crate::protocol::message::{Operation, PartialResult};

const LOG_TARGET: &str = "worker::shard";

#[derive(Debug, Error)]
pub enum ShardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog parse error: {0}")]
    Catalog(#[from] serde_json::Error),
}

/// The subset of the catalog owned by one worker. Execution is a pure read
/// over the shard; the result is tagged with the request id by the caller.
#[derive(Debug)]
pub struct CatalogShard {
    shops: Vec<Shop>,
}

impl CatalogShard {
    pub fn new(shops: Vec<Shop>) -> Self {
        Self { shops }
    }

    /// Loads a shard from a JSON array of shops.
    pub fn from_json_file(path: &Path) -> Result<Self, ShardError> {
        let raw = std::fs::read_to_string(path)?;
        let shops: Vec<Shop> = serde_json::from_str(&raw)?;
        info!(target: LOG_TARGET, shops = shops.len(), ?path, "Catalog shard loaded");
        Ok(Self::new(shops))
    }

    pub fn len(&self) -> usize {
        self.shops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shops.is_empty()
    }

    pub fn execute(&self, op: &Operation) -> PartialResult {
        match op {
            Operation::Filter(spec) => PartialResult::Shops(
                self.shops
                    .iter()
                    .filter(|shop| spec.matches(shop))
                    .cloned()
                    .collect(),
            ),
            Operation::ShopCategorySales => {
                PartialResult::CategorySales(self.shop_category_sales())
            }
            Operation::ProductCategorySales => {
                PartialResult::CategorySales(self.product_category_sales())
            }
        }
    }

    /// Units sold per food category across the shard's shops.
    fn shop_category_sales(&self) -> Vec<(String, u64)> {
        let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
        for shop in &self.shops {
            *totals.entry(shop.food_category.as_str()).or_insert(0) += shop.total_sales();
        }
        totals
            .into_iter()
            .map(|(category, count)| (category.to_string(), count))
            .collect()
    }

    /// Units sold per product type across all products in the shard.
    fn product_category_sales(&self) -> Vec<(String, u64)> {
        let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
        for shop in &self.shops {
            for product in &shop.products {
                *totals.entry(product.product_type.as_str()).or_insert(0) += product.sold as u64;
            }
        }
        totals
            .into_iter()
            .map(|(product_type, count)| (product_type.to_string(), count))
            .collect()
    }
}
