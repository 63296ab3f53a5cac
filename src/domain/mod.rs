pub mod filter;
pub mod product;
pub mod shop;

pub use filter::FilterSpec;
pub use product::Product;
pub use shop::{Location, PriceTier, Shop};

#[cfg(test)]
mod filter_test;
