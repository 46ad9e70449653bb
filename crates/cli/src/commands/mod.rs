//! Command implementations.
//!
//! Catalog commands talk to the catalog service through the storefront's
//! [`CatalogClient`]; cart commands work on a cart stored in local files.
//! Output goes to stdout, logs to stderr.

pub mod cart;
pub mod categories;
pub mod products;

use std::io::{self, Write};
use std::path::PathBuf;

use shopfront_core::cart::{CartError, LineItemError};
use shopfront_storefront::catalog::{CatalogClient, CatalogError, FormError};
use shopfront_storefront::config::{CatalogConfig, ConfigError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog service call failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Input failed validation.
    #[error("Invalid input: {0}")]
    Form(#[from] FormError),

    /// Local cart could not be read or written.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Product cannot be added to the cart.
    #[error("Cannot add to cart: {0}")]
    LineItem(#[from] LineItemError),

    /// File or terminal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Referenced item does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Shared state for one command invocation.
pub struct Context {
    cart_dir: PathBuf,
}

impl Context {
    #[must_use]
    pub const fn new(cart_dir: PathBuf) -> Self {
        Self { cart_dir }
    }

    /// Directory holding the local cart.
    #[must_use]
    pub const fn cart_dir(&self) -> &PathBuf {
        &self.cart_dir
    }

    /// Catalog client configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog configuration is invalid.
    pub fn catalog(&self) -> Result<CatalogClient, CliError> {
        let config = CatalogConfig::from_env()?;
        tracing::debug!(catalog = %config.base_url, "Using catalog service");
        Ok(CatalogClient::new(&config))
    }
}

/// Locked stdout for command output.
fn out() -> io::StdoutLock<'static> {
    io::stdout().lock()
}

/// Write one line of command output.
fn emit(line: impl std::fmt::Display) -> Result<(), CliError> {
    writeln!(out(), "{line}")?;
    Ok(())
}
