use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use super::Catalog;
use crate::models::Product;

pub const DEFAULT_PER_PAGE: usize = 12;
pub const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SortOrder {
    /// Featured first, then by rating, then new arrivals
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
    Rating,
    Newest,
}

/// Product listing filters. Blank strings are treated as "no filter" so the
/// storefront can submit its form fields unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub storage: Option<String>,
    pub in_stock: Option<bool>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn contains_ci(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|f| f.to_lowercase().contains(needle))
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = non_blank(&self.search) {
            let needle = search.to_lowercase();
            let hit = contains_ci(Some(&product.title), &needle)
                || contains_ci(Some(&product.brand), &needle)
                || contains_ci(product.model.as_deref(), &needle)
                || contains_ci(product.short_description.as_deref(), &needle);
            if !hit {
                return false;
            }
        }

        if non_blank(&self.brand).is_some_and(|brand| !product.brand.eq_ignore_ascii_case(brand)) {
            return false;
        }

        let min = self.min_price.unwrap_or(0.0);
        let max = self.max_price.unwrap_or(f64::INFINITY);
        if product.price < min || product.price > max {
            return false;
        }

        if non_blank(&self.storage).is_some_and(|storage| product.storage.as_deref() != Some(storage)) {
            return false;
        }

        if self.in_stock.is_some_and(|in_stock| product.in_stock != in_stock) {
            return false;
        }

        true
    }

    pub fn category(&self) -> Option<&str> {
        non_blank(&self.category)
    }
}

fn featured_order(a: &Product, b: &Product) -> Ordering {
    b.is_featured
        .cmp(&a.is_featured)
        .then_with(|| b.rating_or_zero().total_cmp(&a.rating_or_zero()))
        .then_with(|| b.is_new.cmp(&a.is_new))
}

/// Stable sort of `products` by `order`.
pub fn sort_products(products: &mut [&Product], order: SortOrder) {
    match order {
        SortOrder::Featured => products.sort_by(|a, b| featured_order(a, b)),
        SortOrder::PriceAsc => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOrder::PriceDesc => products.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortOrder::NameAsc => products.sort_by_cached_key(|p| p.title.to_lowercase()),
        SortOrder::NameDesc => {
            products.sort_by(|a, b| b.title.to_lowercase().cmp(&a.title.to_lowercase()))
        }
        SortOrder::Rating => {
            products.sort_by(|a, b| b.rating_or_zero().total_cmp(&a.rating_or_zero()))
        }
        SortOrder::Newest => products.sort_by_key(|p| std::cmp::Reverse(p.created_at_timestamp())),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage<'a> {
    pub products: Vec<&'a Product>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

/// Filter, sort and paginate. `page` starts at 1; out-of-range pages are empty.
pub fn list_products<'a>(
    catalog: &'a Catalog,
    filter: &ProductFilter,
    order: SortOrder,
    page: usize,
    per_page: usize,
) -> ProductPage<'a> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, MAX_PER_PAGE);

    let mut matching: Vec<&Product> = catalog
        .products(filter.category())
        .filter(|p| filter.matches(p))
        .collect();
    sort_products(&mut matching, order);

    let total = matching.len();
    let products = matching
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    ProductPage {
        products,
        total,
        page,
        per_page,
        total_pages: total.div_ceil(per_page),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Facets {
    pub brands: Vec<String>,
    pub storages: Vec<String>,
}

/// Leading integer of a storage label ("128 GB" -> 128, "1 TB" -> 1).
fn storage_magnitude(label: &str) -> u64 {
    label
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

/// Distinct brands (alphabetical) and storage sizes (by leading number).
pub fn facets(catalog: &Catalog, category: Option<&str>) -> Facets {
    let brands: BTreeSet<String> = catalog
        .products(category)
        .map(|p| p.brand.clone())
        .filter(|b| !b.is_empty())
        .collect();

    let mut storages: Vec<String> = catalog
        .products(category)
        .filter_map(|p| p.storage.clone())
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    storages.sort_by_key(|s| storage_magnitude(s));

    Facets {
        brands: brands.into_iter().collect(),
        storages,
    }
}
