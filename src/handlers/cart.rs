//! Session-scoped cart and wishlist endpoints. The session id is an opaque
//! token chosen by the storefront.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::cart::{Cart, CartSummary, MAX_LINE_QUANTITY, Wishlist, WishlistItem};
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::models::Product;

const MAX_SESSION_LEN: usize = 128;

fn check_session(session: &str) -> Result<()> {
    let valid = !session.is_empty()
        && session.len() <= MAX_SESSION_LEN
        && session
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid session id".into()))
    }
}

fn find_product<'a>(state: &'a AppState, id: &str) -> Result<&'a Product> {
    state
        .catalog
        .product(id)
        .ok_or_else(|| AppError::NotFound("Product not found".into()))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub product_id: String,
}

#[derive(Debug, Serialize)]
pub struct WishlistResponse {
    pub items: Vec<WishlistItem>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub in_wishlist: bool,
    #[serde(flatten)]
    pub wishlist: WishlistResponse,
}

fn wishlist_response(wishlist: &Wishlist<'_>) -> WishlistResponse {
    WishlistResponse {
        items: wishlist.items().to_vec(),
        count: wishlist.items().len(),
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: String,
}

/// Issue a fresh session id for a storefront that has none yet.
pub async fn create_session() -> Json<SessionResponse> {
    Json(SessionResponse {
        session: uuid::Uuid::new_v4().to_string(),
    })
}

pub async fn get_cart(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<CartSummary>> {
    check_session(&session)?;
    Ok(Json(Cart::load(state.storage.as_ref(), &session).summary()))
}

pub async fn add_cart_item(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartSummary>> {
    check_session(&session)?;
    let quantity = request.quantity.unwrap_or(1);
    if quantity == 0 || quantity > MAX_LINE_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "Quantity must be between 1 and {}",
            MAX_LINE_QUANTITY
        )));
    }

    let product = find_product(&state, &request.product_id)?;
    if !product.in_stock {
        return Err(AppError::BadRequest("Product is out of stock".into()));
    }

    let mut cart = Cart::load(state.storage.as_ref(), &session);
    cart.add(product, quantity)?;
    tracing::debug!(session = %session, product_id = %product.id, quantity, "Added to cart");

    Ok(Json(cart.summary()))
}

pub async fn update_cart_item(
    State(state): State<AppState>,
    Path((session, product_id)): Path<(String, String)>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartSummary>> {
    check_session(&session)?;
    if request.quantity > i64::from(MAX_LINE_QUANTITY) {
        return Err(AppError::BadRequest(format!(
            "Quantity must be at most {}",
            MAX_LINE_QUANTITY
        )));
    }

    let mut cart = Cart::load(state.storage.as_ref(), &session);
    if !cart.update_quantity(&product_id, request.quantity)? {
        return Err(AppError::NotFound("Item not in cart".into()));
    }

    Ok(Json(cart.summary()))
}

pub async fn remove_cart_item(
    State(state): State<AppState>,
    Path((session, product_id)): Path<(String, String)>,
) -> Result<Json<CartSummary>> {
    check_session(&session)?;
    let mut cart = Cart::load(state.storage.as_ref(), &session);
    if !cart.remove(&product_id)? {
        return Err(AppError::NotFound("Item not in cart".into()));
    }
    Ok(Json(cart.summary()))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<CartSummary>> {
    check_session(&session)?;
    let mut cart = Cart::load(state.storage.as_ref(), &session);
    cart.clear()?;
    Ok(Json(cart.summary()))
}

pub async fn get_wishlist(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<WishlistResponse>> {
    check_session(&session)?;
    let wishlist = Wishlist::load(state.storage.as_ref(), &session);
    Ok(Json(wishlist_response(&wishlist)))
}

pub async fn toggle_wishlist(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>> {
    check_session(&session)?;
    let product = find_product(&state, &request.product_id)?;

    let mut wishlist = Wishlist::load(state.storage.as_ref(), &session);
    let in_wishlist = wishlist.toggle(product)?;

    Ok(Json(ToggleResponse {
        in_wishlist,
        wishlist: wishlist_response(&wishlist),
    }))
}

pub async fn clear_wishlist(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<WishlistResponse>> {
    check_session(&session)?;
    let mut wishlist = Wishlist::load(state.storage.as_ref(), &session);
    wishlist.clear()?;
    Ok(Json(wishlist_response(&wishlist)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/cart/{session}", get(get_cart).delete(clear_cart))
        .route("/api/cart/{session}/items", post(add_cart_item))
        .route(
            "/api/cart/{session}/items/{product_id}",
            put(update_cart_item).delete(remove_cart_item),
        )
        .route("/api/wishlist/{session}", get(get_wishlist).delete(clear_wishlist))
        .route("/api/wishlist/{session}/toggle", post(toggle_wishlist))
}
