//! Session-backed cart.
//!
//! The cart is stored in the session under [`session_keys::CART`] as the same
//! JSON array of line items the core cart serializes to. Each request copies
//! that value into a [`CartStore`] over an in-memory repository, applies one
//! mutation through it, and writes the stored value back to the session when
//! the mutation was applied. Concurrent requests from one session race; the
//! last write wins.

use shopfront_core::cart::{
    Cart, CartError, CartStore, CartVariant, KeyValueCartRepository, KeyValueStore, MemoryStore,
    NewLineItem, Outcome,
};
use shopfront_core::{LineId, Product};
use tower_sessions::Session;

use crate::error::{AppError, Result};
use crate::models::session_keys;

/// The request-local cart store a [`SessionCart`] mutates.
pub type RequestCartStore = CartStore<KeyValueCartRepository<MemoryStore>>;

/// A cart loaded from the session.
pub struct SessionCart {
    session: Session,
    store: RequestCartStore,
}

impl SessionCart {
    /// Load the cart from the session; missing or malformed data yields an
    /// empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(session: Session) -> Result<Self> {
        let mut memory = MemoryStore::new();
        if let Some(raw) = session.get::<String>(session_keys::CART).await? {
            memory
                .set(session_keys::CART, raw)
                .map_err(CartError::storage)?;
        }
        let store = CartStore::open(KeyValueCartRepository::with_key(memory, session_keys::CART))?;

        Ok(Self { session, store })
    }

    /// The loaded cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.store.cart()
    }

    /// Add one unit of an item and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub async fn add_item(&mut self, item: NewLineItem) -> Result<LineId> {
        let line_id = self.store.add_item(item)?;
        self.write_back().await?;
        Ok(line_id)
    }

    /// Apply a mutation, saving only when it changed the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub async fn apply(
        &mut self,
        mutation: impl FnOnce(&mut RequestCartStore) -> std::result::Result<Outcome, CartError>,
    ) -> Result<Outcome> {
        let outcome = mutation(&mut self.store)?;
        if outcome.is_applied() {
            self.write_back().await?;
        }
        Ok(outcome)
    }

    async fn write_back(&self) -> Result<()> {
        let raw = self
            .store
            .repository()
            .store()
            .get(session_keys::CART)
            .map_err(CartError::storage)?;
        if let Some(raw) = raw {
            self.session.insert(session_keys::CART, raw).await?;
        }
        Ok(())
    }
}

/// Build the line item for `product`, pricing it from the catalog.
///
/// Prices never come from the client.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the product is unavailable, has no
/// price, or the selected variant does not exist.
pub fn line_item_for(
    product: &Product,
    variant: Option<CartVariant>,
    image_base: &str,
) -> Result<NewLineItem> {
    NewLineItem::from_product(product, variant, image_base)
        .map_err(|e| AppError::BadRequest(e.to_string()))
}
