//! Response shapes and session keys.

pub mod session;
pub mod views;

pub use session::keys as session_keys;
pub use views::{CartLineView, CartView, CategoryDetail, CategoryRow, ProductDetail, ProductSummary};
