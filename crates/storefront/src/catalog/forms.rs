//! Validated admin write requests.
//!
//! The catalog service performs its own validation; these checks mirror the
//! admin forms so obviously bad input is refused before a round trip.

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use shopfront_core::{CategoryId, Price, PriceError, ProductStatus};
use thiserror::Error;

/// Largest accepted product image (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Reasons an admin form is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("name cannot be blank")]
    BlankName,
    #[error("a category must be selected")]
    MissingCategory,
    #[error("an image is required")]
    MissingImage,
    #[error("image is {size} bytes, the limit is {max}")]
    ImageTooLarge { size: usize, max: usize },
    #[error("file is not an image ({0})")]
    NotAnImage(String),
    #[error(transparent)]
    InvalidPrice(#[from] PriceError),
    #[error("unexpected field: {0}")]
    UnknownField(String),
}

/// Request body for creating a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCategory {
    pub name: String,
    /// Serialized as `null` for root categories.
    pub parent: Option<CategoryId>,
}

impl NewCategory {
    /// Validate a new category.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::BlankName`] if the trimmed name is empty.
    pub fn new(name: &str, parent: Option<CategoryId>) -> Result<Self, FormError> {
        Ok(Self {
            name: validate_name(name)?,
            parent: parent.filter(|id| !id.as_str().trim().is_empty()),
        })
    }
}

/// Request body for renaming a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRename {
    pub name: String,
}

impl CategoryRename {
    /// Validate a new name.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::BlankName`] if the trimmed name is empty.
    pub fn new(name: &str) -> Result<Self, FormError> {
        Ok(Self {
            name: validate_name(name)?,
        })
    }
}

fn validate_name(name: &str) -> Result<String, FormError> {
    let name = name.trim();
    if name.is_empty() {
        Err(FormError::BlankName)
    } else {
        Ok(name.to_owned())
    }
}

/// An uploaded product image.
#[derive(Clone, PartialEq, Eq)]
pub struct ProductImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ProductImage {
    /// Validate an upload.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is empty, larger than
    /// [`MAX_IMAGE_BYTES`], or not of an `image/*` content type.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, FormError> {
        let content_type = content_type.into();
        if bytes.is_empty() {
            return Err(FormError::MissingImage);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(FormError::ImageTooLarge {
                size: bytes.len(),
                max: MAX_IMAGE_BYTES,
            });
        }
        if !content_type.starts_with("image/") {
            return Err(FormError::NotAnImage(content_type));
        }
        Ok(Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        })
    }
}

impl std::fmt::Debug for ProductImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A product to create, with its image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub description: String,
    pub material: String,
    pub colors: String,
    pub sizes: String,
    pub category: CategoryId,
    pub status: ProductStatus,
    pub image: ProductImage,
}

impl NewProduct {
    /// Encode as the multipart form the catalog service expects.
    ///
    /// # Errors
    ///
    /// Returns an error if the image content type is not a valid MIME type.
    pub fn into_multipart(self) -> Result<Form, reqwest::Error> {
        let image = Part::bytes(self.image.bytes)
            .file_name(self.image.file_name)
            .mime_str(&self.image.content_type)?;

        Ok(Form::new()
            .text("name", self.name)
            .text("price", self.price.to_string())
            .text("description", self.description)
            .text("material", self.material)
            .text("colors", self.colors)
            .text("sizes", self.sizes)
            .text("category", self.category.into_inner())
            .text("status", String::from(self.status))
            .part("image", image))
    }
}

/// Collects multipart fields in any order and validates them at the end.
#[derive(Debug, Default)]
pub struct NewProductBuilder {
    name: Option<String>,
    price: Option<String>,
    description: String,
    material: String,
    colors: String,
    sizes: String,
    category: Option<String>,
    status: Option<String>,
    image: Option<ProductImage>,
}

impl NewProductBuilder {
    /// Start an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a text field.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] for fields the form does not have.
    pub fn text(&mut self, field: &str, value: String) -> Result<(), FormError> {
        match field {
            "name" => self.name = Some(value),
            "price" => self.price = Some(value),
            "description" => self.description = value,
            "material" => self.material = value,
            "colors" => self.colors = value,
            "sizes" => self.sizes = value,
            "category" => self.category = Some(value),
            "status" => self.status = Some(value),
            other => return Err(FormError::UnknownField(other.to_owned())),
        }
        Ok(())
    }

    /// Record the image upload.
    pub fn image(&mut self, image: ProductImage) {
        self.image = Some(image);
    }

    /// Validate the collected fields.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn build(self) -> Result<NewProduct, FormError> {
        let name = validate_name(self.name.as_deref().unwrap_or_default())?;
        let price = Price::parse(self.price.as_deref().unwrap_or("0"))?;
        let category = self
            .category
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty())
            .map(CategoryId::from)
            .ok_or(FormError::MissingCategory)?;
        let status = self
            .status
            .filter(|s| !s.trim().is_empty())
            .map(ProductStatus::from)
            .unwrap_or_default();
        let image = self.image.ok_or(FormError::MissingImage)?;

        Ok(NewProduct {
            name,
            price,
            description: self.description,
            material: self.material,
            colors: self.colors,
            sizes: self.sizes,
            category,
            status,
            image,
        })
    }
}
