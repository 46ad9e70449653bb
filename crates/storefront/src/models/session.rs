//! Session keys.

/// Session keys for shopper state.
pub mod keys {
    /// Key for the serialized cart (a JSON array of line items).
    pub const CART: &str = shopfront_core::cart::CART_STORAGE_KEY;

    /// Key for the category tree expand/collapse state.
    pub const CATEGORY_EXPANSION: &str = "category_expansion";
}
