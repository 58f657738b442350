//! Catalog persistence backends.
//!
//! A backend is chosen once, when the [`CatalogManager`](crate::CatalogManager)
//! is built. Three are provided:
//! - [`LocalCatalog`]: the whole list as JSON under one key of a [`KeyValueStore`]
//! - [`UploadingCatalog`]: image files go to an [`ObjectStore`], products to a [`DocumentCollection`]
//! - [`LinkCatalog`]: products go to a [`DocumentCollection`], images must already be URLs

use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::image::EncodedImage;
use crate::product::{ImageRef, Product};
use crate::remote::{Document, DocumentCollection, ObjectStore, object_key};
use crate::store::{FailureKind, KeyValueStore, StoreFailure};

/// Key under which [`LocalCatalog`] keeps the serialized product list.
pub const PRODUCTS_KEY: &str = "products";

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The store had no room for the write.
    #[error("storage is full: {0}")]
    QuotaExceeded(#[source] BoxError),

    /// Any other failure of the local store, passed through unchanged.
    #[error(transparent)]
    Store(BoxError),

    /// A remote write or read failed.
    #[error("remote store failed: {0}")]
    Persistence(#[source] BoxError),

    /// This backend cannot store image files.
    #[error("{0} cannot be uploaded: this catalog only keeps image links")]
    Unsupported(String),

    #[error("stored catalog is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Storage capability behind a catalog: rehydrate, store images, persist appends.
///
/// Methods return `Send` futures so that remote implementations can be driven
/// from a multi-threaded runtime.
pub trait CatalogBackend: Send + Sync {
    /// Loads every stored product. An empty store yields an empty list.
    fn load_all(&self) -> impl Future<Output = Result<Vec<Product>, BackendError>> + Send;

    /// Whether [`store_image`](Self::store_image) accepts image files.
    fn accepts_files(&self) -> bool {
        true
    }

    /// Turns an encoded image into the reference kept in the product.
    fn store_image(
        &self,
        image: &EncodedImage,
    ) -> impl Future<Output = Result<ImageRef, BackendError>> + Send;

    /// Persists `catalog`, whose last element was just appended.
    fn persist(&self, catalog: &[Product]) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// Keeps the full product list under [`PRODUCTS_KEY`] of a local store.
///
/// Images are stored inline as `data:` URIs.
#[derive(Debug)]
pub struct LocalCatalog<S> {
    store: S,
}

impl<S: KeyValueStore> LocalCatalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Overwrites the stored list with `products`.
    pub fn save_all(&self, products: &[Product]) -> Result<(), BackendError> {
        let bytes = serde_json::to_vec(products)?;
        self.store.put(PRODUCTS_KEY, &bytes).map_err(|err| match err.kind() {
            FailureKind::Quota => BackendError::QuotaExceeded(Box::new(err)),
            FailureKind::Other => BackendError::Store(Box::new(err)),
        })?;
        debug!(products = products.len(), bytes = bytes.len(), "Saved catalog");
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<Product>, BackendError> {
        let stored = self
            .store
            .get(PRODUCTS_KEY)
            .map_err(|err| BackendError::Store(Box::new(err)))?;
        match stored {
            Some(bytes) => Ok(keep_valid(serde_json::from_slice::<Vec<Product>>(&bytes)?)),
            None => Ok(Vec::new()),
        }
    }
}

impl<S> CatalogBackend for LocalCatalog<S>
where
    S: KeyValueStore + Send + Sync,
{
    #[instrument(skip_all)]
    async fn load_all(&self) -> Result<Vec<Product>, BackendError> {
        self.read_all()
    }

    async fn store_image(&self, image: &EncodedImage) -> Result<ImageRef, BackendError> {
        Ok(image.data_uri())
    }

    #[instrument(skip_all, fields(products = catalog.len()))]
    async fn persist(&self, catalog: &[Product]) -> Result<(), BackendError> {
        self.save_all(catalog)
    }
}

/// Uploads image files to an object store and writes one document per product.
///
/// Object keys carry a millisecond timestamp that never repeats within one
/// backend, so same-named files uploaded back to back get distinct keys.
#[derive(Debug)]
pub struct UploadingCatalog<C, O> {
    collection: C,
    objects: O,
    last_millis: AtomicI64,
}

impl<C, O> UploadingCatalog<C, O> {
    pub fn new(collection: C, objects: O) -> Self {
        Self {
            collection,
            objects,
            last_millis: AtomicI64::new(0),
        }
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    pub fn objects(&self) -> &O {
        &self.objects
    }

    /// The current time in milliseconds, bumped past the last value handed out.
    fn next_millis(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let previous = self
            .last_millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)));
        let (Ok(last) | Err(last)) = previous;
        now.max(last + 1)
    }
}

impl<C, O> CatalogBackend for UploadingCatalog<C, O>
where
    C: DocumentCollection,
    O: ObjectStore,
{
    #[instrument(skip_all)]
    async fn load_all(&self) -> Result<Vec<Product>, BackendError> {
        load_documents(&self.collection).await
    }

    #[instrument(skip_all, fields(file = %image.file_name))]
    async fn store_image(&self, image: &EncodedImage) -> Result<ImageRef, BackendError> {
        let key = object_key(self.next_millis(), &image.file_name);
        self.objects
            .upload(&key, &image.bytes, &image.content_type)
            .await
            .map_err(|err| BackendError::Persistence(Box::new(err)))?;
        let url = self
            .objects
            .url(&key)
            .await
            .map_err(|err| BackendError::Persistence(Box::new(err)))?;
        debug!(%key, "Uploaded image");
        Ok(url)
    }

    #[instrument(skip_all)]
    async fn persist(&self, catalog: &[Product]) -> Result<(), BackendError> {
        add_last(&self.collection, catalog).await
    }
}

/// Writes one document per product; images must be given as URLs.
#[derive(Debug)]
pub struct LinkCatalog<C> {
    collection: C,
}

impl<C> LinkCatalog<C> {
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }
}

impl<C: DocumentCollection> CatalogBackend for LinkCatalog<C> {
    #[instrument(skip_all)]
    async fn load_all(&self) -> Result<Vec<Product>, BackendError> {
        load_documents(&self.collection).await
    }

    fn accepts_files(&self) -> bool {
        false
    }

    async fn store_image(&self, image: &EncodedImage) -> Result<ImageRef, BackendError> {
        Err(BackendError::Unsupported(image.file_name.clone()))
    }

    #[instrument(skip_all)]
    async fn persist(&self, catalog: &[Product]) -> Result<(), BackendError> {
        add_last(&self.collection, catalog).await
    }
}

async fn load_documents<C: DocumentCollection>(collection: &C) -> Result<Vec<Product>, BackendError> {
    let docs = collection
        .list()
        .await
        .map_err(|err| BackendError::Persistence(Box::new(err)))?;
    debug!(documents = docs.len(), "Loaded documents");
    Ok(keep_valid(docs.into_iter().map(Product::from)))
}

/// Drops rehydrated products that break the catalog invariants.
fn keep_valid(products: impl IntoIterator<Item = Product>) -> Vec<Product> {
    products
        .into_iter()
        .enumerate()
        .filter_map(|(position, product)| match product.validate() {
            Ok(()) => Some(product),
            Err(error) => {
                warn!(position, name = %product.name, %error, "Skipping invalid stored product");
                None
            }
        })
        .collect()
}

async fn add_last<C: DocumentCollection>(collection: &C, catalog: &[Product]) -> Result<(), BackendError> {
    let Some(product) = catalog.last() else {
        return Ok(());
    };
    let id = collection
        .add(&Document::from(product))
        .await
        .map_err(|err| BackendError::Persistence(Box::new(err)))?;
    debug!(%id, "Added document");
    Ok(())
}
