//! # Atelier Catalog
//!
//! Static in-memory product table for the virtual fashion storefront.
//!
//! ## Operations
//!
//! - Filtering: category, brand, inclusive price range and any-tag match,
//!   combined with AND; no pagination, no sorting
//! - Search: case-insensitive substring over name, brand, description, tags
//! - Recommendations: random sample of the catalog (placeholder logic)

pub mod catalog;
pub mod product;
pub mod seed;

pub use catalog::{ProductCatalog, StaticCatalog};
pub use product::{PriceRange, Product, ProductFilters};
