//! Vitrine is a small storefront product catalog.
//!
//! Core concepts:
//! - **Product**: one catalog item with a required primary image and optional secondary images
//! - **Catalog**: the ordered in-memory list of one session, addressed by index
//! - **CatalogBackend**: where the catalog is persisted, chosen once at construction
//! - **CatalogManager**: runs admin submissions (encode, admission check, append, persist, rollback)
//!
//! # Example
//!
//! ```
//! use vitrine_core::{CatalogManager, ImageFile, ImageInput, Limits, LocalCatalog, MemoryStore, Submission};
//!
//! # tokio_test_block(async {
//! let backend = LocalCatalog::new(MemoryStore::new());
//! let mut manager = CatalogManager::open(backend, Limits::default()).await.unwrap();
//!
//! let report = manager
//!     .submit(Submission {
//!         name: "Brass lamp".to_string(),
//!         price: Some(1499.0),
//!         main_image: Some(ImageInput::File(ImageFile::from_bytes("lamp.png", "image/png", vec![0; 64]))),
//!         ..Default::default()
//!     })
//!     .await
//!     .unwrap();
//!
//! assert_eq!(report.index, 0);
//! assert_eq!(manager.cards()[0].name, "Brass lamp");
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! # Storage
//!
//! [`LocalCatalog`] rewrites the whole list as JSON under one key of a
//! size-limited [`KeyValueStore`]. [`UploadingCatalog`] and [`LinkCatalog`]
//! write one document per product to a [`DocumentCollection`]; the former
//! also uploads image files to an [`ObjectStore`].

mod admission;
mod backend;
mod catalog;
pub mod config;
mod estimate;
mod image;
mod product;
pub mod remote;
pub mod render;
mod store;

pub use admission::{AdmissionCheck, CapacityExceeded};
pub use backend::{
    BackendError, BoxError, CatalogBackend, LinkCatalog, LocalCatalog, PRODUCTS_KEY, UploadingCatalog,
};
pub use catalog::{Catalog, CatalogManager, SkippedImage, Submission, SubmitError, SubmitReport};
pub use config::Limits;
pub use estimate::{estimate_encoded, estimate_size};
pub use image::{EncodedImage, ImageEncoder, ImageError, ImageFile, ImageInput, ImageSource, content_type_for};
pub use product::{ImageRef, Product, ProductError};
pub use remote::{Document, DocumentCollection, MemoryCollection, MemoryObjectStore, ObjectStore};
pub use render::{DetailView, ProductCard, format_price};
pub use store::{FailureKind, KeyValueStore, MemoryStore, QuotaExceeded, StoreFailure};
