//! Product records as returned by the catalog service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::deserialize_category_ref;
use super::id::{CategoryId, ProductId};
use super::price::Price;
use super::status::ProductStatus;

/// A purchasable color/size combination of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub color: String,
    pub size: String,
    pub price: Price,
    #[serde(default)]
    pub stock: u32,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    /// Base price. Products sold only through variants may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Absolute URL or a path relative to the catalog service.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub material: String,
    /// Comma-separated list of colors.
    #[serde(default)]
    pub colors: String,
    /// Comma-separated list of sizes.
    #[serde(default)]
    pub sizes: String,
    #[serde(
        default,
        deserialize_with = "deserialize_category_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<ProductVariant>,
    #[serde(
        default,
        rename = "createdAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Resolve the product image against the catalog service base URL.
    ///
    /// Absolute `http(s)` URLs are returned unchanged. Relative paths are
    /// joined to `base_url`. Returns `None` when the product has no image.
    #[must_use]
    pub fn image_url(&self, base_url: &str) -> Option<String> {
        let image = self.image.trim();
        if image.is_empty() {
            return None;
        }
        if image.starts_with("http://") || image.starts_with("https://") {
            return Some(image.to_owned());
        }

        let base = base_url.trim_end_matches('/');
        if image.starts_with('/') {
            Some(format!("{base}{image}"))
        } else {
            Some(format!("{base}/{image}"))
        }
    }

    /// Colors offered for this product.
    #[must_use]
    pub fn color_options(&self) -> Vec<&str> {
        split_list(&self.colors)
    }

    /// Sizes offered for this product.
    #[must_use]
    pub fn size_options(&self) -> Vec<&str> {
        split_list(&self.sizes)
    }

    /// Price to show for the current selection.
    ///
    /// A selected variant wins; otherwise the base price, falling back to
    /// the first variant for variant-only products.
    #[must_use]
    pub fn display_price(&self, selected: Option<&ProductVariant>) -> Option<Price> {
        selected
            .map(|variant| variant.price)
            .or(self.price)
            .or_else(|| self.variants.first().map(|variant| variant.price))
    }

    /// Find the variant matching a color/size pair.
    #[must_use]
    pub fn find_variant(&self, color: &str, size: &str) -> Option<&ProductVariant> {
        self.variants
            .iter()
            .find(|variant| variant.color == color && variant.size == size)
    }
}

fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}
