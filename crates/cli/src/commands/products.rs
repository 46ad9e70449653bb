//! Product commands.

use std::path::{Path, PathBuf};

use clap::Args;
use shopfront_core::catalog::{
    UNCATEGORIZED_NAME, category_name, group_by_root, products_in_category,
};
use shopfront_core::tree::build_tree;
use shopfront_core::{CategoryId, Product, ProductId};
use shopfront_storefront::catalog::forms::NewProductBuilder;
use shopfront_storefront::catalog::{FormError, ProductImage};
use tracing::info;

use super::{CliError, Context, emit};

/// Arguments for `products add`.
#[derive(Debug, Args)]
pub struct AddProductArgs {
    /// Product name
    #[arg(long)]
    pub name: String,

    /// Base price
    #[arg(long)]
    pub price: String,

    /// Category ID
    #[arg(long)]
    pub category: String,

    /// Image file (at most 5 MiB)
    #[arg(long)]
    pub image: PathBuf,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = "")]
    pub material: String,

    /// Comma-separated colors
    #[arg(long, default_value = "")]
    pub colors: String,

    /// Comma-separated sizes
    #[arg(long, default_value = "")]
    pub sizes: String,

    /// Stock status label
    #[arg(long)]
    pub status: Option<String>,
}

/// List products, optionally within a category subtree.
pub async fn list(ctx: &Context, category: Option<CategoryId>) -> Result<(), CliError> {
    let catalog = ctx.catalog()?;
    let (records, products) = tokio::try_join!(catalog.list_categories(), catalog.list_products())?;
    let tree = build_tree(&records, None);

    let selected: Vec<&Product> = match &category {
        Some(id) => products_in_category(&tree, &products, id),
        None => products.iter().collect(),
    };

    if selected.is_empty() {
        return emit("No products");
    }
    for product in selected {
        let name = product
            .category
            .as_ref()
            .and_then(|id| category_name(&tree, id))
            .unwrap_or(UNCATEGORIZED_NAME);
        emit(format_args!("{}\t{name}", product_row(product)))?;
    }
    Ok(())
}

/// List products under their root category.
pub async fn grouped(ctx: &Context) -> Result<(), CliError> {
    let catalog = ctx.catalog()?;
    let (records, products) = tokio::try_join!(catalog.list_categories(), catalog.list_products())?;
    let tree = build_tree(&records, None);

    for group in group_by_root(&tree, &products) {
        emit(format_args!("{} ({})", group.name, group.products.len()))?;
        for product in &group.products {
            emit(format_args!("  {}", product_row(product)))?;
        }
    }
    Ok(())
}

/// Show one product.
pub async fn show(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    let catalog = ctx.catalog()?;
    let product = catalog.get_product(&id).await?;
    let category = match &product.category {
        Some(category_id) => Some(catalog.get_category(category_id).await?.name),
        None => None,
    };

    emit(format_args!("{} ({})", product.name, product.id))?;
    emit(format_args!("  Status:   {}", product.status))?;
    if let Some(price) = product.display_price(None) {
        emit(format_args!("  Price:    {price}"))?;
    }
    emit(format_args!(
        "  Category: {}",
        category.as_deref().unwrap_or(UNCATEGORIZED_NAME)
    ))?;
    if !product.material.is_empty() {
        emit(format_args!("  Material: {}", product.material))?;
    }
    if !product.colors.is_empty() {
        emit(format_args!("  Colors:   {}", product.color_options().join(", ")))?;
    }
    if !product.sizes.is_empty() {
        emit(format_args!("  Sizes:    {}", product.size_options().join(", ")))?;
    }
    for variant in &product.variants {
        emit(format_args!(
            "  Variant:  {} / {} at {} ({} in stock)",
            variant.color, variant.size, variant.price, variant.stock
        ))?;
    }
    if let Some(url) = product.image_url(catalog.base_url().as_str()) {
        emit(format_args!("  Image:    {url}"))?;
    }
    Ok(())
}

/// Create a product, uploading its image.
pub async fn add(ctx: &Context, args: AddProductArgs) -> Result<(), CliError> {
    let bytes = tokio::fs::read(&args.image).await?;
    let file_name = args
        .image
        .file_name()
        .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned());
    let image = ProductImage::new(file_name, image_content_type(&args.image), bytes)?;

    let mut builder = NewProductBuilder::new();
    for (field, value) in [
        ("name", args.name),
        ("price", args.price),
        ("category", args.category),
        ("description", args.description),
        ("material", args.material),
        ("colors", args.colors),
        ("sizes", args.sizes),
    ] {
        builder.text(field, value)?;
    }
    if let Some(status) = args.status {
        builder.text("status", status)?;
    }
    builder.image(image);
    let product = builder.build()?;

    let name = product.name.clone();
    match ctx.catalog()?.create_product(product).await? {
        Some(created) => emit(format_args!("Created product {} ({})", created.name, created.id)),
        None => {
            info!(%name, "Product created");
            emit(format_args!("Created product {name}"))
        }
    }
}

/// Delete a product.
pub async fn delete(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    ctx.catalog()?.delete_product(&id).await?;
    info!(%id, "Product deleted");
    emit(format_args!("Deleted product {id}"))
}

fn product_row(product: &Product) -> String {
    let price = product
        .display_price(None)
        .map_or_else(|| "-".to_string(), |price| price.to_string());
    format!("{}\t{}\t{price}\t{}", product.id, product.name, product.status)
}

/// Content type guessed from the file extension.
fn image_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_image_content_type() {
        assert_eq!(image_content_type(Path::new("a/shirt.JPG")), "image/jpeg");
        assert_eq!(image_content_type(Path::new("shirt.webp")), "image/webp");
        assert_eq!(
            image_content_type(Path::new("notes.txt")),
            "application/octet-stream"
        );
        assert_eq!(image_content_type(Path::new("README")), "application/octet-stream");
    }

    #[test]
    fn test_non_image_upload_is_rejected() {
        let err = ProductImage::new("notes.txt", image_content_type(Path::new("notes.txt")), vec![1])
            .unwrap_err();
        assert!(matches!(err, FormError::NotAnImage(_)));
    }

    #[test]
    fn test_product_row() {
        let product: Product =
            serde_json::from_str(r#"{"_id":"p1","name":"Tee","price":"120000"}"#).unwrap();
        assert_eq!(product_row(&product), "p1\tTee\t120000\tCòn hàng");
    }
}
