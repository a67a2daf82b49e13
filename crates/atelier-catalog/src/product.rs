//! Product model and catalog filters

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product in the storefront
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stable product identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Brand label
    pub brand: String,

    /// Category (e.g. "dresses", "shoes")
    pub category: String,

    /// Unit price
    pub price: Decimal,

    /// Marketing description
    pub description: String,

    /// Free-form tags used by filtering and search
    pub tags: Vec<String>,

    /// Image URLs
    pub images: Vec<String>,

    /// Available colours
    pub colors: Vec<String>,

    /// Available sizes
    pub sizes: Vec<String>,

    /// Average review rating (0-5)
    pub rating: f32,

    /// Whether the product can be ordered
    pub in_stock: bool,

    /// Whether a 3D/AR asset exists for virtual try-on
    pub virtual_try_on: bool,
}

impl Product {
    /// Case-insensitive substring match over name, brand, description and tags.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_query(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.brand.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Inclusive price bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Check whether a price lies within the bounds (both ends inclusive)
    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Catalog filters
///
/// Every populated field is an independent predicate; a product must satisfy
/// all of them. An empty `tags` list places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProductFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn price_range(mut self, min: Decimal, max: Decimal) -> Self {
        self.price_range = Some(PriceRange::new(min, max));
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Check whether a product satisfies every populated predicate
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if &product.category != category {
                return false;
            }
        }

        if let Some(brand) = &self.brand {
            if &product.brand != brand {
                return false;
            }
        }

        if let Some(range) = &self.price_range {
            if !range.contains(product.price) {
                return false;
            }
        }

        if !self.tags.is_empty() && !self.tags.iter().any(|t| product.tags.contains(t)) {
            return false;
        }

        true
    }
}
