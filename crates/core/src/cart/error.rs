//! Cart persistence errors.

use thiserror::Error;

/// Errors raised while loading or saving a cart.
///
/// Invalid cart operations are never errors; see [`super::Outcome`].
#[derive(Debug, Error)]
pub enum CartError {
    /// The backing store failed to read or write.
    #[error("cart storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The cart could not be serialized.
    #[error("cart serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CartError {
    /// Wrap a backing store error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Reasons a product cannot be turned into a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineItemError {
    /// The product is not in stock.
    #[error("{name} is {status}")]
    Unavailable { name: String, status: String },

    /// The product has variants and none matches the selection.
    #[error("{name} has no {color} / {size} variant")]
    UnknownVariant {
        name: String,
        color: String,
        size: String,
    },

    /// Neither the product nor any variant carries a price.
    #[error("{0} has no price")]
    NoPrice(String),
}
