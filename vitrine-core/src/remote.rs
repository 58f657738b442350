use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::product::{ImageRef, Product};

/// A product as written to a document collection.
///
/// `description` and `otherImages` are omitted when empty, so minimal
/// documents carry only `name`, `price` and `image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: String,
    pub price: f64,
    pub image: ImageRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other_images: Vec<ImageRef>,
}

impl From<&Product> for Document {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            image: product.main_image.clone(),
            description: product.description.clone(),
            other_images: product.other_images.clone(),
        }
    }
}

impl From<Document> for Product {
    fn from(doc: Document) -> Self {
        Self {
            name: doc.name,
            price: doc.price,
            description: doc.description,
            main_image: doc.image,
            other_images: doc.other_images,
        }
    }
}

/// A remote collection of product documents.
///
/// Methods return `Send` futures so implementations may talk to the network.
pub trait DocumentCollection: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Adds a document, returning the id the collection assigned to it.
    fn add(&self, doc: &Document) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Fetches every document, in whatever order the collection returns them.
    fn list(&self) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send;
}

/// A remote blob store that hands out retrieval URLs for uploaded objects.
pub trait ObjectStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Returns a durable public URL for an uploaded object.
    fn url(&self, key: &str) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// Builds the object key `products/{millis}_{file_name}` for an upload.
///
/// Path separators in the file name are replaced so the key stays under the
/// `products/` prefix.
pub fn object_key(millis: i64, file_name: &str) -> String {
    let file_name: String = file_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("products/{millis}_{file_name}")
}

#[derive(Debug, Error)]
pub enum MemoryRemoteError {
    #[error("object not found: {0}")]
    NotFound(String),
}

/// An in-memory document collection that lists documents in insertion order.
///
/// Useful for testing and as a reference implementation.
#[derive(Debug, Default)]
pub struct MemoryCollection {
    docs: RwLock<IndexMap<String, Document>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentCollection for MemoryCollection {
    type Error = MemoryRemoteError;

    async fn add(&self, doc: &Document) -> Result<String, Self::Error> {
        let mut docs = self.docs.write().unwrap();
        let id = format!("doc-{}", docs.len() + 1);
        docs.insert(id.clone(), doc.clone());
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Document>, Self::Error> {
        Ok(self.docs.read().unwrap().values().cloned().collect())
    }
}

/// An in-memory object store serving URLs under a fixed base.
#[derive(Debug)]
pub struct MemoryObjectStore {
    base_url: String,
    objects: RwLock<HashMap<String, (String, Vec<u8>)>>,
}

impl MemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::default(),
        }
    }

    /// Returns the content type and bytes stored under `key`.
    pub fn object(&self, key: &str) -> Option<(String, Vec<u8>)> {
        self.objects.read().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.read().unwrap().keys().cloned().collect()
    }
}

impl ObjectStore for MemoryObjectStore {
    type Error = MemoryRemoteError;

    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), Self::Error> {
        self.objects
            .write()
            .unwrap()
            .insert(key.to_string(), (content_type.to_string(), bytes.to_vec()));
        Ok(())
    }

    async fn url(&self, key: &str) -> Result<String, Self::Error> {
        if !self.objects.read().unwrap().contains_key(key) {
            return Err(MemoryRemoteError::NotFound(key.to_string()));
        }
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }
}
