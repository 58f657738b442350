use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::admission::{AdmissionCheck, CapacityExceeded};
use crate::backend::{BackendError, CatalogBackend};
use crate::config::Limits;
use crate::estimate::estimate_encoded;
use crate::image::{EncodedImage, ImageEncoder, ImageError, ImageInput};
use crate::product::{ImageRef, Product, ProductError, check_price};
use crate::render::{DetailView, ProductCard, cards};

/// The ordered in-memory product list of one session.
///
/// Order is insertion order and indexes are the only addresses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Product> {
        self.products.get(index)
    }

    pub fn last(&self) -> Option<&Product> {
        self.products.last()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    fn push(&mut self, product: Product) {
        self.products.push(product);
    }

    fn pop(&mut self) -> Option<Product> {
        self.products.pop()
    }
}

impl From<Vec<Product>> for Catalog {
    fn from(products: Vec<Product>) -> Self {
        Self { products }
    }
}

/// What the admin entered in the product form.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub name: String,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub main_image: Option<ImageInput>,
    pub other_images: Vec<ImageInput>,
}

/// A secondary image left out of a submission.
#[derive(Debug)]
pub struct SkippedImage {
    pub label: String,
    pub error: ImageError,
}

/// Outcome of an accepted submission.
#[derive(Debug)]
pub struct SubmitReport {
    /// Catalog index of the new product.
    pub index: usize,
    /// Estimated size of the inline image data, in bytes.
    pub estimated_bytes: u64,
    /// Secondary images that were skipped, in submission order.
    pub skipped: Vec<SkippedImage>,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ProductError),

    #[error("main image rejected: {0}")]
    MainImage(#[source] ImageError),

    #[error(transparent)]
    CapacityExceeded(#[from] CapacityExceeded),

    #[error("failed to save product: {0}")]
    Backend(#[from] BackendError),
}

enum Prepared {
    Encoded(EncodedImage),
    Link(String),
}

/// Owns the session catalog and runs submissions against a backend.
#[derive(Debug)]
pub struct CatalogManager<B> {
    backend: B,
    catalog: Catalog,
    encoder: ImageEncoder,
    admission: AdmissionCheck,
}

impl<B: CatalogBackend> CatalogManager<B> {
    /// Loads the stored catalog from `backend`.
    #[instrument(skip_all)]
    pub async fn open(backend: B, limits: Limits) -> Result<Self, BackendError> {
        let products = backend.load_all().await?;
        debug!(products = products.len(), "Loaded catalog");

        Ok(Self {
            backend,
            catalog: Catalog::from(products),
            encoder: ImageEncoder::new(limits.max_image_bytes),
            admission: AdmissionCheck::new(limits.admission_ceiling),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cards(&self) -> Vec<ProductCard<'_>> {
        cards(self.catalog.products())
    }

    pub fn detail(&self, index: usize) -> Option<DetailView<'_>> {
        DetailView::open(self.catalog.products(), index)
    }

    /// Replaces the in-memory catalog with what the backend currently holds.
    pub async fn reload(&mut self) -> Result<(), BackendError> {
        self.catalog = Catalog::from(self.backend.load_all().await?);
        Ok(())
    }

    /// Validates, stores and appends a new product.
    ///
    /// Nothing is changed unless the product is persisted: a failure before
    /// the write leaves the catalog untouched, and a failed write removes
    /// the appended product again. Secondary images that fail to encode are
    /// skipped and listed in the report.
    #[instrument(skip_all, fields(name = %submission.name))]
    pub async fn submit(&mut self, submission: Submission) -> Result<SubmitReport, SubmitError> {
        let Submission {
            name,
            price,
            description,
            main_image,
            other_images,
        } = submission;

        if name.trim().is_empty() {
            return Err(ProductError::MissingName.into());
        }
        let price = price.ok_or(ProductError::MissingPrice)?;
        check_price(price)?;
        let main_image = main_image
            .filter(|input| !is_blank_link(input))
            .ok_or(ProductError::MissingMainImage)?;

        let main = self.prepare(&main_image).await.map_err(SubmitError::MainImage)?;

        let mut others = Vec::with_capacity(other_images.len());
        let mut skipped = Vec::new();
        for input in other_images.iter().filter(|input| !is_blank_link(input)) {
            match self.prepare(input).await {
                Ok(prepared) => others.push(prepared),
                Err(error) => {
                    warn!(image = input.label(), %error, "Skipping secondary image");
                    skipped.push(SkippedImage {
                        label: input.label().to_string(),
                        error,
                    });
                }
            }
        }

        let estimated_bytes = self.admission_total(&main, &others)?;

        let main_ref = self.resolve(main).await?;
        let mut other_refs = Vec::with_capacity(others.len());
        for prepared in others {
            other_refs.push(self.resolve(prepared).await?);
        }

        let product = Product::new(&name, price, description.as_deref(), main_ref, other_refs)?;
        self.catalog.push(product);

        if let Err(err) = self.backend.persist(self.catalog.products()).await {
            self.catalog.pop();
            warn!(error = %err, "Product not saved, removed from catalog");
            return Err(err.into());
        }

        let index = self.catalog.len() - 1;
        debug!(index, estimated_bytes, skipped = skipped.len(), "Product added");

        Ok(SubmitReport {
            index,
            estimated_bytes,
            skipped,
        })
    }

    async fn prepare(&self, input: &ImageInput) -> Result<Prepared, ImageError> {
        match input {
            ImageInput::File(file) if !self.backend.accepts_files() => Err(ImageError::Unsupported {
                name: file.name.clone(),
            }),
            ImageInput::File(file) => Ok(Prepared::Encoded(self.encoder.encode_file(file).await?)),
            ImageInput::Url(url) => Ok(Prepared::Link(url.trim().to_string())),
        }
    }

    fn admission_total(&self, main: &Prepared, others: &[Prepared]) -> Result<u64, CapacityExceeded> {
        let estimates = std::iter::once(main)
            .chain(others)
            .filter_map(|prepared| match prepared {
                Prepared::Encoded(image) => Some(estimate_encoded(image.bytes.len() as u64)),
                Prepared::Link(_) => None,
            });
        self.admission.check_estimates(estimates)
    }

    async fn resolve(&self, prepared: Prepared) -> Result<ImageRef, BackendError> {
        match prepared {
            Prepared::Encoded(image) => self.backend.store_image(&image).await,
            Prepared::Link(url) => Ok(url),
        }
    }
}

fn is_blank_link(input: &ImageInput) -> bool {
    matches!(input, ImageInput::Url(url) if url.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalCatalog;
    use crate::image::ImageFile;
    use crate::store::MemoryStore;

    fn png(name: &str, len: usize) -> ImageInput {
        ImageInput::File(ImageFile::from_bytes(name, "image/png", vec![7; len]))
    }

    fn submission(name: &str) -> Submission {
        Submission {
            name: name.to_string(),
            price: Some(10.0),
            description: Some("desc".to_string()),
            main_image: Some(png("main.png", 30)),
            other_images: vec![],
        }
    }

    async fn manager() -> CatalogManager<LocalCatalog<MemoryStore>> {
        CatalogManager::open(LocalCatalog::new(MemoryStore::new()), Limits::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn submit_appends_last() {
        let mut manager = manager().await;
        manager.submit(submission("first")).await.unwrap();

        let report = manager.submit(submission("second")).await.unwrap();

        assert_eq!(report.index, 1);
        assert_eq!(manager.catalog().len(), 2);
        assert_eq!(manager.catalog().last().unwrap().name, "second");
        assert!(manager.catalog().last().unwrap().main_image.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn submit_validates_fields() {
        let mut manager = manager().await;

        let missing_name = submission("  ");
        assert!(matches!(
            manager.submit(missing_name).await,
            Err(SubmitError::Invalid(ProductError::MissingName))
        ));

        let mut missing_price = submission("a");
        missing_price.price = None;
        assert!(matches!(
            manager.submit(missing_price).await,
            Err(SubmitError::Invalid(ProductError::MissingPrice))
        ));

        let mut negative = submission("a");
        negative.price = Some(-1.0);
        assert!(matches!(
            manager.submit(negative).await,
            Err(SubmitError::Invalid(ProductError::InvalidPrice(_)))
        ));

        let mut no_image = submission("a");
        no_image.main_image = Some(ImageInput::Url("  ".into()));
        assert!(matches!(
            manager.submit(no_image).await,
            Err(SubmitError::Invalid(ProductError::MissingMainImage))
        ));

        assert!(manager.catalog().is_empty());
    }

    #[tokio::test]
    async fn bad_main_image_aborts() {
        let mut manager = manager().await;
        let mut bad = submission("a");
        bad.main_image = Some(ImageInput::File(ImageFile::from_bytes("a.txt", "text/plain", vec![1])));

        let err = manager.submit(bad).await.unwrap_err();

        assert!(matches!(err, SubmitError::MainImage(ImageError::InvalidType { .. })));
        assert!(manager.catalog().is_empty());
    }

    #[tokio::test]
    async fn bad_secondary_images_are_skipped_in_order() {
        let mut manager = manager().await;
        let mut sub = submission("a");
        sub.other_images = vec![
            ImageInput::File(ImageFile::from_bytes("notes.txt", "text/plain", vec![1])),
            png("ok.png", 3),
            png("huge.png", 3 * 1024 * 1024),
        ];

        let report = manager.submit(sub).await.unwrap();

        let labels: Vec<_> = report.skipped.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["notes.txt", "huge.png"]);
        assert!(matches!(report.skipped[0].error, ImageError::InvalidType { .. }));
        assert!(matches!(report.skipped[1].error, ImageError::TooLarge { .. }));
        assert_eq!(manager.catalog().get(0).unwrap().other_images.len(), 1);
    }

    #[tokio::test]
    async fn links_are_kept_and_not_counted() {
        let mut manager = manager().await;
        let mut sub = submission("a");
        sub.main_image = Some(ImageInput::Url(" https://cdn/a.png ".into()));

        let report = manager.submit(sub).await.unwrap();

        assert_eq!(report.estimated_bytes, 0);
        assert_eq!(manager.catalog().get(0).unwrap().main_image, "https://cdn/a.png");
    }

    #[tokio::test]
    async fn quota_failure_rolls_back() {
        let backend = LocalCatalog::new(MemoryStore::with_capacity(400));
        let mut manager = CatalogManager::open(backend, Limits::default()).await.unwrap();
        manager.submit(submission("fits")).await.unwrap();

        let mut big = submission("too big");
        big.main_image = Some(png("big.png", 1024));
        let err = manager.submit(big).await.unwrap_err();

        assert!(matches!(err, SubmitError::Backend(BackendError::QuotaExceeded(_))));
        assert_eq!(manager.catalog().len(), 1);
        assert_eq!(manager.catalog().last().unwrap().name, "fits");
    }

    #[tokio::test]
    async fn detail_view_by_index() {
        let mut manager = manager().await;
        manager.submit(submission("lamp")).await.unwrap();

        let view = manager.detail(0).unwrap();
        assert_eq!(view.name(), "lamp");
        assert_eq!(view.description(), Some("desc"));
        assert!(manager.detail(1).is_none());
        assert_eq!(manager.cards().len(), 1);
    }
}
