use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored image reference: a `data:` URI for inline images, otherwise a URL.
pub type ImageRef = String;

/// Error type for product field validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProductError {
    #[error("product name is required")]
    MissingName,
    #[error("product price is required")]
    MissingPrice,
    #[error("price must be a positive number, got {0}")]
    InvalidPrice(f64),
    #[error("a main image is required")]
    MissingMainImage,
}

/// One catalog item.
///
/// Serialized with the field names the storefront page reads
/// (`mainImage`, `otherImages`), so a persisted list stays readable by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub main_image: ImageRef,
    #[serde(default)]
    pub other_images: Vec<ImageRef>,
}

impl Product {
    /// Builds a product, enforcing the catalog invariants.
    ///
    /// The name is trimmed; a blank description is stored as `None`.
    pub fn new(
        name: &str,
        price: f64,
        description: Option<&str>,
        main_image: ImageRef,
        other_images: Vec<ImageRef>,
    ) -> Result<Self, ProductError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProductError::MissingName);
        }
        check_price(price)?;
        if main_image.is_empty() {
            return Err(ProductError::MissingMainImage);
        }

        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(Self {
            name: name.to_string(),
            price,
            description,
            main_image,
            other_images,
        })
    }

    /// Re-checks the invariants on a product read back from storage.
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() {
            return Err(ProductError::MissingName);
        }
        check_price(self.price)?;
        if self.main_image.is_empty() {
            return Err(ProductError::MissingMainImage);
        }
        Ok(())
    }
}

pub(crate) fn check_price(price: f64) -> Result<(), ProductError> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(ProductError::InvalidPrice(price))
    }
}
