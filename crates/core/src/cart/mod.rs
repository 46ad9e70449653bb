//! Shopping cart aggregate.
//!
//! A cart is an ordered list of line items. Adding an item whose identity key
//! (product, color, size) matches an existing line bumps that line by one
//! instead of appending a duplicate. Lines are addressed by a [`LineId`]
//! assigned at creation; positional helpers exist for callers that only
//! know the rendered row index.
//!
//! Every mutation enforces the quantity invariant (`quantity >= 1`).
//! Operations with an unknown target or an invalid result are rejected and
//! leave the cart untouched; they never fail.
//!
//! Persistence lives in [`store`]: a [`CartStore`] wraps a cart and saves it
//! through a [`CartRepository`] after every applied mutation.

pub mod error;
pub mod store;

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::{LineId, Price, Product, ProductId};

pub use error::{CartError, LineItemError};
pub use store::{
    CART_STORAGE_KEY, CartRepository, CartStore, KeyValueCartRepository, KeyValueStore,
    MemoryStore,
};

/// Selected color and size of a line item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartVariant {
    pub color: String,
    pub size: String,
}

impl CartVariant {
    /// Create a variant selection.
    #[must_use]
    pub fn new(color: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            size: size.into(),
        }
    }
}

/// Identity key deciding whether an added item merges into an existing line.
pub type IdentityKey<'a> = (&'a ProductId, Option<&'a str>, Option<&'a str>);

/// An item the shopper wants to add.
///
/// Carries no quantity: each add contributes exactly one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub unit_price: Price,
    #[serde(default)]
    pub variant: Option<CartVariant>,
}

impl NewLineItem {
    /// Build the item for one unit of `product`, priced from the catalog.
    ///
    /// When the product has variants, a selection must match one of them
    /// and that variant's price is used. Without variants the selection is
    /// kept as given and the base price applies. Relative image paths are
    /// resolved against `image_base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unavailable, the selection matches
    /// no variant, or no price can be found.
    pub fn from_product(
        product: &Product,
        variant: Option<CartVariant>,
        image_base: &str,
    ) -> Result<Self, LineItemError> {
        if !product.status.is_available() {
            return Err(LineItemError::Unavailable {
                name: product.name.clone(),
                status: product.status.label().to_owned(),
            });
        }

        let selected = match &variant {
            Some(choice) if !product.variants.is_empty() => Some(
                product
                    .find_variant(&choice.color, &choice.size)
                    .ok_or_else(|| LineItemError::UnknownVariant {
                        name: product.name.clone(),
                        color: choice.color.clone(),
                        size: choice.size.clone(),
                    })?,
            ),
            _ => None,
        };

        let unit_price = product
            .display_price(selected)
            .ok_or_else(|| LineItemError::NoPrice(product.name.clone()))?;

        Ok(Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            image: product.image_url(image_base).unwrap_or_default(),
            unit_price,
            variant,
        })
    }

    /// The merge identity of this item.
    #[must_use]
    pub fn identity_key(&self) -> IdentityKey<'_> {
        identity_key(&self.product_id, self.variant.as_ref())
    }
}

/// One distinct (product, variant) pairing in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Lines stored before ids existed get a fresh one when loaded.
    #[serde(default)]
    pub line_id: LineId,
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(alias = "price")]
    pub unit_price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<CartVariant>,
    pub quantity: u32,
}

impl CartLineItem {
    /// The merge identity of this line.
    #[must_use]
    pub fn identity_key(&self) -> IdentityKey<'_> {
        identity_key(&self.product_id, self.variant.as_ref())
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

fn identity_key<'a>(product_id: &'a ProductId, variant: Option<&'a CartVariant>) -> IdentityKey<'a> {
    (
        product_id,
        variant.map(|v| v.color.as_str()),
        variant.map(|v| v.size.as_str()),
    )
}

/// Result of a cart mutation.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The cart changed.
    Applied,
    /// The request was invalid for the current cart; nothing changed.
    Rejected,
}

impl Outcome {
    /// Whether the cart changed.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// The ordered list of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from previously stored lines.
    ///
    /// Lines with a zero quantity are dropped and duplicate line ids are
    /// reassigned, so the result always satisfies the cart invariants.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLineItem>) -> Self {
        let mut seen = HashSet::new();
        let lines = lines
            .into_iter()
            .filter(|line| line.quantity >= 1)
            .map(|mut line| {
                while !seen.insert(line.line_id) {
                    line.line_id = LineId::generate();
                }
                line
            })
            .collect();
        Self { lines }
    }

    /// Restore a cart from its serialized form.
    ///
    /// Malformed data yields an empty cart rather than an error. Each line is
    /// read on its own, so one bad line (a negative quantity, a missing
    /// product id) is dropped without losing the others.
    #[must_use]
    pub fn hydrate(raw: &str) -> Self {
        let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(raw) else {
            return Self::new();
        };
        let lines = values
            .into_iter()
            .filter_map(|value| serde_json::from_value::<CartLineItem>(value).ok())
            .collect();
        Self::from_lines(lines)
    }

    /// Serialize the cart as a JSON array of line items.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.lines)
    }

    /// The lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Look up a line by id.
    #[must_use]
    pub fn get(&self, line_id: &LineId) -> Option<&CartLineItem> {
        self.lines.iter().find(|line| &line.line_id == line_id)
    }

    /// Current position of a line.
    #[must_use]
    pub fn position(&self, line_id: &LineId) -> Option<usize> {
        self.lines.iter().position(|line| &line.line_id == line_id)
    }

    /// Id of the line at `index`.
    #[must_use]
    pub fn line_id_at(&self, index: usize) -> Option<LineId> {
        self.lines.get(index).map(|line| line.line_id)
    }

    /// Add one unit of `item`.
    ///
    /// Merges into the line with the same identity key if there is one,
    /// otherwise appends a new line with quantity 1. Returns the id of the
    /// line that received the unit.
    pub fn add_item(&mut self, item: NewLineItem) -> LineId {
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|line| line.identity_key() == item.identity_key())
        {
            existing.quantity = existing.quantity.saturating_add(1);
            return existing.line_id;
        }

        let line = CartLineItem {
            line_id: LineId::generate(),
            product_id: item.product_id,
            name: item.name,
            image: item.image,
            unit_price: item.unit_price,
            variant: item.variant,
            quantity: 1,
        };
        let id = line.line_id;
        self.lines.push(line);
        id
    }

    /// Remove a line. Unknown ids are rejected.
    pub fn remove_item(&mut self, line_id: &LineId) -> Outcome {
        match self.position(line_id) {
            Some(index) => self.remove_at(index),
            None => Outcome::Rejected,
        }
    }

    /// Remove the line at `index`. Out-of-range indices are rejected.
    pub fn remove_at(&mut self, index: usize) -> Outcome {
        if index < self.lines.len() {
            self.lines.remove(index);
            Outcome::Applied
        } else {
            Outcome::Rejected
        }
    }

    /// Change a line's quantity by `delta`.
    ///
    /// Rejected when the line is unknown or when the new quantity would be
    /// zero or less; the line is never removed or clamped here.
    pub fn update_quantity(&mut self, line_id: &LineId, delta: i64) -> Outcome {
        match self.position(line_id) {
            Some(index) => self.update_quantity_at(index, delta),
            None => Outcome::Rejected,
        }
    }

    /// Positional form of [`Cart::update_quantity`].
    pub fn update_quantity_at(&mut self, index: usize, delta: i64) -> Outcome {
        let Some(line) = self.lines.get_mut(index) else {
            return Outcome::Rejected;
        };
        let new_quantity = i64::from(line.quantity).saturating_add(delta);
        if new_quantity <= 0 {
            return Outcome::Rejected;
        }
        match u32::try_from(new_quantity) {
            Ok(quantity) => {
                line.quantity = quantity;
                Outcome::Applied
            }
            Err(_) => Outcome::Rejected,
        }
    }

    /// Total of the selected lines. Unknown ids contribute nothing and each
    /// line counts once however often it is selected.
    #[must_use]
    pub fn total_price(&self, selected: &[LineId]) -> Price {
        let selected: HashSet<&LineId> = selected.iter().collect();
        self.lines
            .iter()
            .filter(|line| selected.contains(&line.line_id))
            .map(CartLineItem::line_total)
            .sum()
    }

    /// Positional form of [`Cart::total_price`].
    #[must_use]
    pub fn total_price_at(&self, selected: &[usize]) -> Price {
        selected
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|&index| self.lines.get(index))
            .map(CartLineItem::line_total)
            .sum()
    }

    /// Total of every line.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLineItem::line_total).sum()
    }

    /// Sum of all quantities, as shown on the cart badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.quantity))
    }

    /// Remove every line.
    pub fn clear(&mut self) -> Outcome {
        if self.lines.is_empty() {
            Outcome::Rejected
        } else {
            self.lines.clear();
            Outcome::Applied
        }
    }
}
