//! Read-only catalog endpoints backing the storefront grids.

use std::fmt::Display;
use std::str::FromStr;

use axum::{
    Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::AppState;
use crate::catalog::{
    CategorySummary, DEFAULT_PER_PAGE, Facets, ProductFilter, ProductPage, SortOrder, facets, list_products,
};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Query};
use crate::models::Product;

/// Query-string fields arrive as strings; blank ones mean "not set".
fn empty_as_none<'de, D, T>(de: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(de)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "q")]
    pub search: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default, alias = "minPrice", deserialize_with = "empty_as_none")]
    pub min_price: Option<f64>,
    #[serde(default, alias = "maxPrice", deserialize_with = "empty_as_none")]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default, alias = "inStock", deserialize_with = "empty_as_none")]
    pub in_stock: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort: Option<SortOrder>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<usize>,
    #[serde(default, alias = "perPage", deserialize_with = "empty_as_none")]
    pub per_page: Option<usize>,
}

impl ListProductsQuery {
    fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: self.category.clone(),
            search: self.search.clone(),
            brand: self.brand.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            storage: self.storage.clone(),
            in_stock: self.in_stock,
        }
    }
}

pub async fn list_products_handler(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Response {
    let page: ProductPage<'_> = list_products(
        &state.catalog,
        &query.filter(),
        query.sort.unwrap_or_default(),
        query.page.unwrap_or(1),
        query.per_page.unwrap_or(DEFAULT_PER_PAGE),
    );

    // Serialized here, while the page still borrows the catalog
    Json(page).into_response()
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    state
        .catalog
        .product(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".into()))
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategorySummary>,
}

pub async fn list_categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: state.catalog.categories(),
    })
}

pub async fn category_facets(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Facets>> {
    if !state.catalog.has_category(&category) {
        return Err(AppError::NotFound("Category not found".into()));
    }
    Ok(Json(facets(&state.catalog, Some(&category))))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products_handler))
        .route("/api/products/{id}", get(get_product))
        .route("/api/categories", get(list_categories))
        .route("/api/categories/{category}/facets", get(category_facets))
}
