//! Status enums for catalog entities.

use serde::{Deserialize, Serialize};

/// Product stock status.
///
/// The catalog service stores the shop's display labels verbatim
/// ("Còn hàng" / "Hết hàng"). Labels this crate does not know are kept
/// as-is so they survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum ProductStatus {
    /// Available for sale.
    #[default]
    InStock,
    /// Temporarily unavailable.
    OutOfStock,
    /// Any other label set by the catalog admin.
    Other(String),
}

impl ProductStatus {
    /// Label used by the catalog service for in-stock products.
    pub const IN_STOCK_LABEL: &'static str = "Còn hàng";
    /// Label used by the catalog service for out-of-stock products.
    pub const OUT_OF_STOCK_LABEL: &'static str = "Hết hàng";

    /// The label as stored by the catalog service.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::InStock => Self::IN_STOCK_LABEL,
            Self::OutOfStock => Self::OUT_OF_STOCK_LABEL,
            Self::Other(label) => label,
        }
    }

    /// Whether the product can be added to a cart.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        !matches!(self, Self::OutOfStock)
    }
}

impl From<String> for ProductStatus {
    fn from(label: String) -> Self {
        match label.trim() {
            Self::IN_STOCK_LABEL => Self::InStock,
            Self::OUT_OF_STOCK_LABEL => Self::OutOfStock,
            _ => Self::Other(label),
        }
    }
}

impl From<ProductStatus> for String {
    fn from(status: ProductStatus) -> Self {
        status.label().to_owned()
    }
}

impl core::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels() {
        let status: ProductStatus = serde_json::from_str("\"Hết hàng\"").unwrap();
        assert_eq!(status, ProductStatus::OutOfStock);
        assert!(!status.is_available());

        let status: ProductStatus = serde_json::from_str("\"Còn hàng\"").unwrap();
        assert_eq!(status, ProductStatus::InStock);
    }

    #[test]
    fn test_unknown_label_roundtrips() {
        let status: ProductStatus = serde_json::from_str("\"Pre-order\"").unwrap();
        assert_eq!(status, ProductStatus::Other("Pre-order".to_string()));
        assert!(status.is_available());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Pre-order\"");
    }
}
