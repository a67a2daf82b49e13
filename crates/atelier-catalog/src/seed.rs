//! Demo product table
//!
//! Every shoe in the demo table is priced above 100.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::product::Product;

#[allow(clippy::too_many_arguments)]
fn product(
    id: &str,
    name: &str,
    brand: &str,
    category: &str,
    price: Decimal,
    description: &str,
    tags: &[&str],
    colors: &[&str],
    sizes: &[&str],
    rating: f32,
    virtual_try_on: bool,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        brand: brand.to_string(),
        category: category.to_string(),
        price,
        description: description.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        images: vec![format!("/images/products/{id}/front.jpg"), format!("/images/products/{id}/back.jpg")],
        colors: colors.iter().map(|c| c.to_string()).collect(),
        sizes: sizes.iter().map(|s| s.to_string()).collect(),
        rating,
        in_stock: true,
        virtual_try_on,
    }
}

/// The demo catalog shipped with the storefront
pub fn demo_products() -> Vec<Product> {
    vec![
        product(
            "dress-001",
            "Aurora Evening Gown",
            "Maison Lune",
            "dresses",
            dec!(489.00),
            "Floor-length silk gown with a draped cowl neckline.",
            &["evening", "formal", "silk"],
            &["midnight", "champagne"],
            &["XS", "S", "M", "L"],
            4.8,
            true,
        ),
        product(
            "dress-002",
            "Linen Day Dress",
            "Verdant",
            "dresses",
            dec!(129.00),
            "Breathable linen midi dress cut for warm afternoons.",
            &["casual", "summer", "sustainable"],
            &["sand", "sage"],
            &["S", "M", "L"],
            4.4,
            true,
        ),
        product(
            "top-001",
            "Satin Wrap Blouse",
            "Maison Lune",
            "tops",
            dec!(145.00),
            "Fluid satin blouse with a self-tie waist.",
            &["office", "evening"],
            &["ivory", "noir"],
            &["XS", "S", "M", "L", "XL"],
            4.5,
            true,
        ),
        product(
            "top-002",
            "Organic Cotton Tee",
            "Verdant",
            "tops",
            dec!(38.00),
            "Everyday crew-neck tee in organic cotton jersey.",
            &["casual", "basics", "sustainable"],
            &["white", "black", "heather"],
            &["XS", "S", "M", "L", "XL"],
            4.2,
            false,
        ),
        product(
            "outer-001",
            "Tailored Wool Coat",
            "Northfold",
            "outerwear",
            dec!(560.00),
            "Double-breasted coat in Italian wool with a silk lining.",
            &["winter", "formal", "wool"],
            &["camel", "charcoal"],
            &["S", "M", "L"],
            4.9,
            true,
        ),
        product(
            "outer-002",
            "Recycled Puffer Jacket",
            "Northfold",
            "outerwear",
            dec!(240.00),
            "Lightweight puffer filled with recycled insulation.",
            &["winter", "casual", "sustainable"],
            &["black", "olive"],
            &["S", "M", "L", "XL"],
            4.3,
            true,
        ),
        product(
            "bottom-001",
            "Wide-Leg Trousers",
            "Atelier Noor",
            "bottoms",
            dec!(165.00),
            "High-rise pleated trousers with a relaxed wide leg.",
            &["office", "tailored"],
            &["stone", "navy"],
            &["24", "26", "28", "30", "32"],
            4.6,
            true,
        ),
        product(
            "bottom-002",
            "Selvedge Denim Jeans",
            "Indigo Row",
            "bottoms",
            dec!(198.00),
            "Straight-leg jeans in raw Japanese selvedge denim.",
            &["casual", "denim"],
            &["raw indigo"],
            &["26", "28", "30", "32", "34"],
            4.7,
            false,
        ),
        product(
            "shoes-001",
            "Leather Ankle Boots",
            "Cordwain",
            "shoes",
            dec!(310.00),
            "Chelsea boots in vegetable-tanned leather.",
            &["winter", "leather"],
            &["cognac", "black"],
            &["36", "37", "38", "39", "40", "41"],
            4.8,
            true,
        ),
        product(
            "shoes-002",
            "Minimal Court Sneakers",
            "Cordwain",
            "shoes",
            dec!(180.00),
            "Low-profile sneakers with a recycled rubber sole.",
            &["casual", "sustainable"],
            &["white", "bone"],
            &["36", "37", "38", "39", "40", "41", "42"],
            4.5,
            true,
        ),
        product(
            "acc-001",
            "Silk Twill Scarf",
            "Maison Lune",
            "accessories",
            dec!(95.00),
            "Hand-rolled scarf printed on silk twill.",
            &["gift", "print"],
            &["azure", "rose"],
            &["one size"],
            4.6,
            false,
        ),
        product(
            "acc-002",
            "Structured Tote",
            "Atelier Noor",
            "accessories",
            dec!(275.00),
            "Structured leather tote with a detachable pouch.",
            &["office", "leather"],
            &["black", "tan"],
            &["one size"],
            4.4,
            true,
        ),
    ]
}
