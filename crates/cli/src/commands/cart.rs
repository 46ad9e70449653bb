//! Local cart commands.
//!
//! The cart lives in `<cart-dir>/cart.json` in the same format the storefront
//! keeps in the session. Lines can be addressed by line id or by their
//! 1-based position as printed by `cart show`.

use std::fmt;
use std::str::FromStr;

use shopfront_core::cart::{CartStore, CartVariant, KeyValueCartRepository, NewLineItem, Outcome};
use shopfront_core::{LineId, ProductId};
use tracing::info;

use super::{CliError, Context, emit};
use crate::store::FileStore;

type LocalCart = CartStore<KeyValueCartRepository<FileStore>>;

/// A line addressed by id or by 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRef {
    Id(LineId),
    Position(usize),
}

impl LineRef {
    fn resolve(&self, cart: &LocalCart) -> Option<LineId> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Position(position) => cart.cart().line_id_at(position - 1),
        }
    }
}

impl FromStr for LineRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(position) = s.parse::<usize>() {
            return if position == 0 {
                Err("positions start at 1".to_string())
            } else {
                Ok(Self::Position(position))
            };
        }
        s.parse::<LineId>()
            .map(Self::Id)
            .map_err(|_| format!("'{s}' is neither a line id nor a position"))
    }
}

impl fmt::Display for LineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Position(position) => write!(f, "#{position}"),
        }
    }
}

fn open(ctx: &Context) -> Result<LocalCart, CliError> {
    let repository = KeyValueCartRepository::new(FileStore::new(ctx.cart_dir().clone()));
    Ok(CartStore::open(repository)?)
}

fn report(outcome: Outcome, applied: impl fmt::Display) -> Result<(), CliError> {
    match outcome {
        Outcome::Applied => emit(applied),
        Outcome::Rejected => emit("No change"),
    }
}

/// Print every line with its position, id, quantity and totals.
pub fn show(ctx: &Context) -> Result<(), CliError> {
    let store = open(ctx)?;
    let cart = store.cart();
    if cart.is_empty() {
        return emit("Cart is empty");
    }

    for (position, line) in (1..).zip(cart.lines()) {
        let variant = line
            .variant
            .as_ref()
            .map(|v| format!(" [{} / {}]", v.color, v.size))
            .unwrap_or_default();
        emit(format_args!(
            "{position}. {}{variant} x{} @ {} = {}\t{}",
            line.name,
            line.quantity,
            line.unit_price,
            line.line_total(),
            line.line_id
        ))?;
    }
    emit(format_args!(
        "Subtotal: {} ({} items)",
        cart.subtotal(),
        cart.item_count()
    ))
}

/// Add one unit of a product, priced from the catalog.
pub async fn add(
    ctx: &Context,
    product_id: ProductId,
    variant: Option<(String, String)>,
) -> Result<(), CliError> {
    let catalog = ctx.catalog()?;
    let product = catalog.get_product(&product_id).await?;
    let variant = variant.map(|(color, size)| CartVariant::new(color, size));
    let item = NewLineItem::from_product(&product, variant, catalog.base_url().as_str())?;

    let mut store = open(ctx)?;
    let line_id = store.add_item(item)?;
    let quantity = store.cart().get(&line_id).map_or(1, |line| line.quantity);
    info!(%product_id, %line_id, "Added to cart");
    emit(format_args!("{} x{quantity}\t{line_id}", product.name))
}

/// Change a line's quantity. Going below one is refused.
pub fn update(ctx: &Context, line: LineRef, delta: i64) -> Result<(), CliError> {
    let mut store = open(ctx)?;
    let outcome = match &line {
        LineRef::Id(id) => store.update_quantity(id, delta)?,
        LineRef::Position(position) => store.update_quantity_at(position - 1, delta)?,
    };
    report(outcome, format_args!("Updated {line}"))
}

/// Remove a line.
pub fn remove(ctx: &Context, line: LineRef) -> Result<(), CliError> {
    let mut store = open(ctx)?;
    let outcome = match &line {
        LineRef::Id(id) => store.remove_item(id)?,
        LineRef::Position(position) => store.remove_at(position - 1)?,
    };
    report(outcome, format_args!("Removed {line}"))
}

/// Total of the given lines, or of the whole cart when none are given.
///
/// Unknown references contribute nothing.
pub fn total(ctx: &Context, lines: &[LineRef]) -> Result<(), CliError> {
    let store = open(ctx)?;
    if lines.is_empty() {
        return emit(store.cart().subtotal());
    }

    let selected: Vec<LineId> = lines.iter().filter_map(|line| line.resolve(&store)).collect();
    emit(store.total_price(&selected))
}

/// Empty the cart.
pub fn clear(ctx: &Context) -> Result<(), CliError> {
    let mut store = open(ctx)?;
    report(store.clear()?, "Cart cleared")
}
