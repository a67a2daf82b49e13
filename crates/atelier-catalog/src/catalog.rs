//! Product catalog backends

use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use tracing::debug;

use crate::product::{Product, ProductFilters};
use crate::seed::demo_products;

/// Read-only access to the product table
pub trait ProductCatalog: Send + Sync {
    /// All products satisfying the filters, in table order
    fn get_products(&self, filters: Option<&ProductFilters>) -> Vec<Product>;

    /// Direct lookup by id
    fn get_product(&self, id: &str) -> Option<Product>;

    /// Case-insensitive substring search over name, brand, description and tags
    fn search_products(&self, query: &str) -> Vec<Product>;

    /// Up to `limit` products for a user.
    ///
    /// The user id is accepted for interface stability; selection is a
    /// random sample and does not depend on it.
    fn get_recommendations(&self, user_id: &str, limit: usize) -> Vec<Product>;

    /// Distinct categories, sorted
    fn categories(&self) -> Vec<String>;

    /// Distinct brands, sorted
    fn brands(&self) -> Vec<String>;
}

/// Static in-memory catalog
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    /// Create a catalog over an explicit product table
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Create the catalog with the bundled demo products
    pub fn demo() -> Self {
        Self::new(demo_products())
    }

    /// Number of products in the table
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::demo()
    }
}

impl ProductCatalog for StaticCatalog {
    fn get_products(&self, filters: Option<&ProductFilters>) -> Vec<Product> {
        match filters {
            Some(filters) => self
                .products
                .iter()
                .filter(|p| filters.matches(p))
                .cloned()
                .collect(),
            None => self.products.clone(),
        }
    }

    fn get_product(&self, id: &str) -> Option<Product> {
        self.products.iter().find(|p| p.id == id).cloned()
    }

    fn search_products(&self, query: &str) -> Vec<Product> {
        let needle = query.to_lowercase();
        let results: Vec<Product> = self
            .products
            .iter()
            .filter(|p| p.matches_query(&needle))
            .cloned()
            .collect();

        debug!(query, hits = results.len(), "Catalog search");
        results
    }

    fn get_recommendations(&self, user_id: &str, limit: usize) -> Vec<Product> {
        let mut pool = self.products.clone();
        pool.shuffle(&mut rand::thread_rng());
        pool.truncate(limit);

        debug!(user_id, returned = pool.len(), "Sampled recommendations");
        pool
    }

    fn categories(&self) -> Vec<String> {
        self.products
            .iter()
            .map(|p| p.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn brands(&self) -> Vec<String> {
        self.products
            .iter()
            .map(|p| p.brand.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_no_filters_returns_everything() {
        let catalog = StaticCatalog::demo();
        assert_eq!(catalog.get_products(None).len(), catalog.len());
        assert_eq!(catalog.get_products(Some(&ProductFilters::new())).len(), catalog.len());
    }

    #[test]
    fn test_cheap_shoes_filter_is_empty() {
        let catalog = StaticCatalog::demo();
        let filters = ProductFilters::new()
            .category("shoes")
            .price_range(dec!(0), dec!(100));

        assert!(catalog.get_products(Some(&filters)).is_empty());
    }

    #[test]
    fn test_filter_by_brand_and_tag() {
        let catalog = StaticCatalog::demo();
        let filters = ProductFilters::new().brand("Verdant").tag("summer");

        let results = catalog.get_products(Some(&filters));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "dress-002");
    }

    #[test]
    fn test_get_product() {
        let catalog = StaticCatalog::demo();
        assert_eq!(catalog.get_product("shoes-001").unwrap().brand, "Cordwain");
        assert!(catalog.get_product("missing").is_none());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = StaticCatalog::demo();
        let results = catalog.search_products("SILK");

        assert!(!results.is_empty());
        assert!(results.iter().any(|p| p.id == "dress-001"));
        // Only its description mentions silk
        assert!(results.iter().any(|p| p.id == "outer-001"));
        assert!(results
            .iter()
            .all(|p| p.matches_query("silk")));
    }

    #[test]
    fn test_search_matches_description_alone() {
        let lined_coat = Product {
            id: "coat-1".into(),
            name: "Wool Coat".into(),
            brand: "Northfold".into(),
            category: "outerwear".into(),
            price: dec!(560.00),
            description: "Italian wool with a Silk lining".into(),
            tags: vec!["winter".into()],
            images: vec![],
            colors: vec!["camel".into()],
            sizes: vec!["M".into()],
            rating: 4.9,
            in_stock: true,
            virtual_try_on: false,
        };
        let plain = Product {
            id: "coat-2".into(),
            description: "Boiled wool".into(),
            ..lined_coat.clone()
        };
        let catalog = StaticCatalog::new(vec![lined_coat, plain]);

        let results = catalog.search_products("SILK");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "coat-1");
    }

    #[test]
    fn test_search_matches_brand_and_tags() {
        let catalog = StaticCatalog::demo();

        let by_brand = catalog.search_products("cordwain");
        assert_eq!(by_brand.len(), 2);

        let by_tag = catalog.search_products("Denim");
        assert!(by_tag.iter().any(|p| p.id == "bottom-002"));
    }

    #[test]
    fn test_recommendations_respect_limit() {
        let catalog = StaticCatalog::demo();

        let picks = catalog.get_recommendations("user-1", 4);
        assert_eq!(picks.len(), 4);

        let ids: std::collections::HashSet<_> = picks.iter().map(|p| &p.id).collect();
        assert_eq!(ids.len(), 4);

        let all = catalog.get_recommendations("user-1", 100);
        assert_eq!(all.len(), catalog.len());
    }

    #[test]
    fn test_categories_and_brands() {
        let catalog = StaticCatalog::demo();
        let categories = catalog.categories();

        assert!(categories.contains(&"shoes".to_string()));
        assert!(categories.windows(2).all(|w| w[0] < w[1]));
        assert!(catalog.brands().contains(&"Maison Lune".to_string()));
    }

    proptest! {
        #[test]
        fn prop_filtered_products_satisfy_price_bounds(min in 0u32..600, span in 0u32..600) {
            let catalog = StaticCatalog::demo();
            let lo = rust_decimal::Decimal::from(min);
            let hi = rust_decimal::Decimal::from(min + span);
            let filters = ProductFilters::new().price_range(lo, hi);

            for product in catalog.get_products(Some(&filters)) {
                prop_assert!(product.price >= lo && product.price <= hi);
            }
        }
    }
}
