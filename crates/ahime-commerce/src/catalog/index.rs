//! In-memory, read-only product catalog.

use std::collections::{HashMap, HashSet};

use crate::catalog::{Category, Product};
use crate::error::CommerceError;
use crate::ids::{CategoryId, ProductId};
use serde::{Deserialize, Serialize};

/// Catalog as exchanged in JSON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    products: Vec<Product>,
}

/// Indexed set of products and categories.
///
/// Built once and never mutated; products keep their listing order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
    by_id: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a catalog, validating every product.
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Result<Self, CommerceError> {
        let mut seen_categories = HashSet::with_capacity(categories.len());
        for category in &categories {
            if !seen_categories.insert(&category.id) {
                return Err(CommerceError::DuplicateCategory(category.id.to_string()));
            }
        }

        let mut by_id = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            product.validate()?;
            if by_id.insert(product.id.clone(), position).is_some() {
                return Err(CommerceError::DuplicateProduct(product.id.to_string()));
            }
        }

        Ok(Self {
            products,
            categories,
            by_id,
        })
    }

    /// Build a catalog without categories.
    pub fn from_products(products: Vec<Product>) -> Result<Self, CommerceError> {
        Self::new(products, Vec::new())
    }

    /// Parse a catalog document: `{ "categories": [...], "products": [...] }`.
    pub fn from_json(json: &str) -> Result<Self, CommerceError> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        Self::new(doc.products, doc.categories)
    }

    /// Serialize back to the document format.
    pub fn to_json(&self) -> Result<String, CommerceError> {
        let doc = CatalogDocument {
            categories: self.categories.clone(),
            products: self.products.clone(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.by_id.get(id).map(|&i| &self.products[i])
    }

    /// Look up a product, failing with `ProductNotFound`.
    pub fn require(&self, id: &ProductId) -> Result<&Product, CommerceError> {
        self.get(id)
            .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Products in listing order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    /// Products listed directly under a category.
    pub fn by_category<'a>(&'a self, id: &'a CategoryId) -> impl Iterator<Item = &'a Product> + 'a {
        self.products
            .iter()
            .filter(move |p| p.category.as_ref() == Some(id))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
