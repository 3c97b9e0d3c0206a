//! # Product Store
//!
//! Entity store of catalog products, keyed by product id.

use std::collections::HashMap;

use daffodil_core::{Product, ProductLookup};

/// Products loaded from the catalog.
#[derive(Debug, Clone, Default)]
pub struct ProductStore {
    products: HashMap<String, Product>,
}

impl ProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a product, returning the previous entity.
    pub fn upsert(&mut self, product: Product) -> Option<Product> {
        self.products.insert(product.id().to_string(), product)
    }

    /// Inserts or replaces several products.
    pub fn upsert_many(&mut self, products: impl IntoIterator<Item = Product>) {
        for product in products {
            self.upsert(product);
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Product> {
        self.products.remove(id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ProductLookup for ProductStore {
    fn product_by_id(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }
}
