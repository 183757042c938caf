//! Read-only product catalog, loaded once at start-up.

mod query;
mod source;

pub use query::*;
pub use source::*;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::Product;

/// Products grouped by category name, in file order within each category.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: BTreeMap<String, Vec<Product>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategorySummary {
    pub name: String,
    pub count: usize,
}

impl Catalog {
    /// Build a catalog, stamping each product with its category when the
    /// record itself does not name one.
    pub fn new(categories: BTreeMap<String, Vec<Product>>) -> Self {
        let categories = categories
            .into_iter()
            .map(|(name, products)| {
                let products = products
                    .into_iter()
                    .map(|mut p| {
                        if p.category.is_empty() {
                            p.category = name.clone();
                        }
                        p
                    })
                    .collect();
                (name, products)
            })
            .collect();
        Self { categories }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn categories(&self) -> Vec<CategorySummary> {
        self.categories
            .iter()
            .map(|(name, products)| CategorySummary {
                name: name.clone(),
                count: products.len(),
            })
            .collect()
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Products of one category, or every product when `category` is None.
    /// An unknown category yields nothing.
    pub fn products<'a>(&'a self, category: Option<&str>) -> Box<dyn Iterator<Item = &'a Product> + 'a> {
        match category {
            Some(name) => Box::new(self.categories.get(name).into_iter().flatten()),
            None => Box::new(self.categories.values().flatten()),
        }
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products(None).find(|p| p.id == id)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn product(id: &str, brand: &str, price: f64) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("{} {}", brand, id),
            "brand": brand,
            "price": price,
            "inStock": true,
        }))
        .unwrap()
    }

    pub fn catalog(entries: Vec<(&str, Vec<Product>)>) -> Catalog {
        Catalog::new(
            entries
                .into_iter()
                .map(|(name, products)| (name.to_string(), products))
                .collect(),
        )
    }
}
