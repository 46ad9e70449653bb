//! Request-scoped services used by the route handlers.

pub mod cart;

pub use cart::{RequestCartStore, SessionCart, line_item_for};
