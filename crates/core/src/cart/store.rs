//! Cart persistence.
//!
//! A [`CartStore`] owns a [`Cart`] and a [`CartRepository`]. It loads the
//! cart once when opened and saves it after every mutation that changed
//! something. A mutation whose save fails is rolled back, so the in-memory
//! cart never runs ahead of storage. Repositories decide where carts live; the provided
//! [`KeyValueCartRepository`] writes the JSON array of lines under a fixed
//! key in any [`KeyValueStore`].

use std::collections::HashMap;
use std::convert::Infallible;

use super::{Cart, CartError, NewLineItem, Outcome};
use crate::types::{LineId, Price};

/// Key under which carts are stored.
pub const CART_STORAGE_KEY: &str = "cart";

/// A string key-value store, such as browser storage or a session.
pub trait KeyValueStore {
    /// Error raised by the backing store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&mut self, key: &str, value: String) -> Result<(), Self::Error>;
}

/// In-process [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), Self::Error> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Loads and saves whole carts.
pub trait CartRepository {
    /// Load the stored cart, or an empty one if nothing usable is stored.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backing store itself fails.
    fn load(&self) -> Result<Cart, CartError>;

    /// Replace the stored cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be serialized or written.
    fn save(&mut self, cart: &Cart) -> Result<(), CartError>;
}

/// Stores the cart as JSON under a single key.
#[derive(Debug, Clone)]
pub struct KeyValueCartRepository<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> KeyValueCartRepository<S> {
    /// Use [`CART_STORAGE_KEY`].
    pub fn new(store: S) -> Self {
        Self::with_key(store, CART_STORAGE_KEY)
    }

    /// Use a custom key.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Give back the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: KeyValueStore> CartRepository for KeyValueCartRepository<S> {
    fn load(&self) -> Result<Cart, CartError> {
        let raw = self.store.get(&self.key).map_err(CartError::storage)?;
        Ok(raw.map_or_else(Cart::new, |raw| Cart::hydrate(&raw)))
    }

    fn save(&mut self, cart: &Cart) -> Result<(), CartError> {
        let raw = cart.to_json()?;
        self.store.set(&self.key, raw).map_err(CartError::storage)
    }
}

/// A cart bound to its repository.
#[derive(Debug)]
pub struct CartStore<R> {
    cart: Cart,
    repository: R,
}

impl<R: CartRepository> CartStore<R> {
    /// Load the cart from `repository`.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be read.
    pub fn open(repository: R) -> Result<Self, CartError> {
        let cart = repository.load()?;
        Ok(Self { cart, repository })
    }

    /// The current cart.
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The repository the cart is saved to.
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// Give back the repository.
    pub fn into_repository(self) -> R {
        self.repository
    }

    /// Add one unit of `item` and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub fn add_item(&mut self, item: NewLineItem) -> Result<LineId, CartError> {
        let snapshot = self.cart.clone();
        let id = self.cart.add_item(item);
        self.save_or_restore(snapshot)?;
        Ok(id)
    }

    /// Remove a line and save if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub fn remove_item(&mut self, line_id: &LineId) -> Result<Outcome, CartError> {
        let snapshot = self.cart.clone();
        let outcome = self.cart.remove_item(line_id);
        self.persist(outcome, snapshot)
    }

    /// Remove the line at `index` and save if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub fn remove_at(&mut self, index: usize) -> Result<Outcome, CartError> {
        let snapshot = self.cart.clone();
        let outcome = self.cart.remove_at(index);
        self.persist(outcome, snapshot)
    }

    /// Change a line's quantity by `delta` and save if accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub fn update_quantity(&mut self, line_id: &LineId, delta: i64) -> Result<Outcome, CartError> {
        let snapshot = self.cart.clone();
        let outcome = self.cart.update_quantity(line_id, delta);
        self.persist(outcome, snapshot)
    }

    /// Positional form of [`CartStore::update_quantity`].
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub fn update_quantity_at(&mut self, index: usize, delta: i64) -> Result<Outcome, CartError> {
        let snapshot = self.cart.clone();
        let outcome = self.cart.update_quantity_at(index, delta);
        self.persist(outcome, snapshot)
    }

    /// Empty the cart, e.g. after an order was placed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub fn clear(&mut self) -> Result<Outcome, CartError> {
        let snapshot = self.cart.clone();
        let outcome = self.cart.clear();
        self.persist(outcome, snapshot)
    }

    /// Total of the selected lines.
    #[must_use]
    pub fn total_price(&self, selected: &[LineId]) -> Price {
        self.cart.total_price(selected)
    }

    fn persist(&mut self, outcome: Outcome, snapshot: Cart) -> Result<Outcome, CartError> {
        if outcome.is_applied() {
            self.save_or_restore(snapshot)?;
        }
        Ok(outcome)
    }

    fn save_or_restore(&mut self, snapshot: Cart) -> Result<(), CartError> {
        if let Err(err) = self.repository.save(&self.cart) {
            self.cart = snapshot;
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::cart::CartVariant;
    use crate::types::ProductId;

    fn item(product: &str, color: &str) -> NewLineItem {
        NewLineItem {
            product_id: ProductId::new(product),
            name: product.to_string(),
            image: String::new(),
            unit_price: Price::from_units(1_000),
            variant: Some(CartVariant::new(color, "M")),
        }
    }

    /// Counts writes so tests can check when the store saves.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: Rc<Cell<usize>>,
    }

    impl KeyValueStore for CountingStore {
        type Error = Infallible;

        fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: String) -> Result<(), Self::Error> {
            self.writes.set(self.writes.get() + 1);
            self.inner.set(key, value)
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("disk full")]
    struct DiskFull;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        type Error = DiskFull;

        fn get(&self, _key: &str) -> Result<Option<String>, Self::Error> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: String) -> Result<(), Self::Error> {
            Err(DiskFull)
        }
    }

    #[test]
    fn test_open_empty_store() {
        let store = CartStore::open(KeyValueCartRepository::new(MemoryStore::new())).unwrap();
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_open_malformed_store_is_empty() {
        let mut memory = MemoryStore::new();
        memory.set(CART_STORAGE_KEY, "{broken".to_string()).unwrap();

        let store = CartStore::open(KeyValueCartRepository::new(memory)).unwrap();
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_mutations_are_persisted() {
        let mut store = CartStore::open(KeyValueCartRepository::new(MemoryStore::new())).unwrap();
        let red = store.add_item(item("A", "red")).unwrap();
        store.add_item(item("A", "red")).unwrap();
        store.add_item(item("A", "blue")).unwrap();
        assert!(store.update_quantity(&red, 3).unwrap().is_applied());

        let memory = store.into_repository().into_store();
        let reopened = CartStore::open(KeyValueCartRepository::new(memory)).unwrap();
        assert_eq!(reopened.cart().len(), 2);
        assert_eq!(reopened.cart().get(&red).unwrap().quantity, 5);
    }

    #[test]
    fn test_rejected_mutations_do_not_save() {
        let writes = Rc::new(Cell::new(0));
        let counting = CountingStore {
            inner: MemoryStore::new(),
            writes: Rc::clone(&writes),
        };
        let mut store = CartStore::open(KeyValueCartRepository::new(counting)).unwrap();

        let id = store.add_item(item("A", "red")).unwrap();
        assert_eq!(writes.get(), 1);

        assert_eq!(store.update_quantity(&id, -1).unwrap(), Outcome::Rejected);
        assert_eq!(store.remove_at(7).unwrap(), Outcome::Rejected);
        assert_eq!(writes.get(), 1);

        assert_eq!(store.remove_item(&id).unwrap(), Outcome::Applied);
        assert_eq!(writes.get(), 2);
    }

    #[test]
    fn test_storage_failure_surfaces() {
        let mut store = CartStore::open(KeyValueCartRepository::new(BrokenStore)).unwrap();
        let err = store.add_item(item("A", "red")).unwrap_err();
        assert!(matches!(err, CartError::Storage(_)));
        assert_eq!(err.to_string(), "cart storage error: disk full");
    }

    /// Fails the first `failures` writes, then behaves like a memory store.
    struct FlakyStore {
        inner: MemoryStore,
        failures: usize,
    }

    impl KeyValueStore for FlakyStore {
        type Error = DiskFull;

        fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
            Ok(self.inner.get(key).unwrap_or_default())
        }

        fn set(&mut self, key: &str, value: String) -> Result<(), Self::Error> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(DiskFull);
            }
            self.inner.set(key, value).map_err(|never| match never {})
        }
    }

    #[test]
    fn test_failed_save_rolls_back() {
        let flaky = FlakyStore {
            inner: MemoryStore::new(),
            failures: 1,
        };
        let mut store = CartStore::open(KeyValueCartRepository::new(flaky)).unwrap();

        assert!(store.add_item(item("A", "red")).is_err());
        assert!(store.cart().is_empty());

        store.add_item(item("B", "red")).unwrap();
        let persisted = store.repository().load().unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted.lines()[0].product_id.as_str(), "B");
        assert_eq!(&persisted, store.cart());
    }

    #[test]
    fn test_failed_save_keeps_previous_quantity() {
        let flaky = FlakyStore {
            inner: MemoryStore::new(),
            failures: 0,
        };
        let mut store = CartStore::open(KeyValueCartRepository::new(flaky)).unwrap();
        let id = store.add_item(item("A", "red")).unwrap();

        let mut kv = store.into_repository().into_store();
        kv.failures = 1;
        let mut store = CartStore::open(KeyValueCartRepository::new(kv)).unwrap();

        assert!(store.update_quantity(&id, 4).is_err());
        assert_eq!(store.cart().get(&id).unwrap().quantity, 1);
        assert!(store.clear().unwrap().is_applied());
        assert!(store.repository().load().unwrap().is_empty());
    }

    #[test]
    fn test_custom_key() {
        let mut repo = KeyValueCartRepository::with_key(MemoryStore::new(), "cart:guest");
        let mut cart = Cart::new();
        cart.add_item(item("A", "red"));
        repo.save(&cart).unwrap();

        assert!(repo.store().get("cart:guest").unwrap().is_some());
        assert!(repo.store().get(CART_STORAGE_KEY).unwrap().is_none());
        assert_eq!(repo.load().unwrap(), cart);
    }

    #[test]
    fn test_positional_helpers() {
        let mut store = CartStore::open(KeyValueCartRepository::new(MemoryStore::new())).unwrap();
        store.add_item(item("A", "red")).unwrap();
        store.add_item(item("B", "red")).unwrap();

        assert!(store.update_quantity_at(1, 1).unwrap().is_applied());
        assert_eq!(store.cart().lines()[1].quantity, 2);
        assert!(store.remove_at(0).unwrap().is_applied());
        assert_eq!(store.cart().lines()[0].product_id.as_str(), "B");
        assert!(store.clear().unwrap().is_applied());
        assert!(store.cart().is_empty());
    }
}
