use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::ports::StorefrontStore;
use crate::errors::AppError;
use crate::AppState;

use super::session_token;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    /// Units to add on top of what is already in the cart. Defaults to 1.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    /// New absolute quantity; zero or less removes the line.
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: String,
    pub image_url: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub lines: Vec<CartLineResponse>,
    pub total: String,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            lines: cart
                .lines()
                .iter()
                .map(|l| CartLineResponse {
                    product_id: l.product_id,
                    name: l.name.clone(),
                    unit_price: l.unit_price.to_string(),
                    image_url: l.image_url.clone(),
                    quantity: l.quantity,
                })
                .collect(),
            total: cart.total().to_string(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /cart
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Current session cart", body = CartResponse),
        (status = 401, description = "No session"),
    ),
    tag = "cart"
)]
pub async fn get_cart<S: StorefrontStore>(
    state: web::Data<AppState<S>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let token = session_token(&req).ok_or(AppError::NotAuthenticated)?;
    let cart = state
        .sessions
        .with_session(token, |s| CartResponse::from(&s.cart))
        .ok_or(AppError::NotAuthenticated)?;
    Ok(HttpResponse::Ok().json(cart))
}

/// POST /cart/items
///
/// Adds units of a product to the session cart after an advisory check
/// against current stock. The check only reduces wasted checkouts; commit
/// re-validates authoritatively.
#[utoipa::path(
    post,
    path = "/cart/items",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Insufficient stock"),
    ),
    tag = "cart"
)]
pub async fn add_item<S: StorefrontStore>(
    state: web::Data<AppState<S>>,
    req: HttpRequest,
    body: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let token = session_token(&req).ok_or(AppError::NotAuthenticated)?;
    let AddCartItemRequest {
        product_id,
        quantity,
    } = body.into_inner();
    if quantity < 1 {
        return Err(AppError::InvalidInput(
            "quantity must be at least 1".to_string(),
        ));
    }

    let store = state.store.clone();
    let product = web::block(move || store.get_product(product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??
        .ok_or(AppError::NotFound)?;

    let outcome = state
        .sessions
        .with_session(token, |s| {
            s.cart
                .add_line(&product, quantity)
                .map(|_| CartResponse::from(&s.cart))
        })
        .ok_or(AppError::NotAuthenticated)?;
    let cart = outcome.map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(cart))
}

/// PUT /cart/items/{product_id}
///
/// Sets the absolute quantity of a cart line. A quantity of zero or less
/// removes the line without consulting the store, so a deleted product can
/// still be dropped from the cart.
#[utoipa::path(
    put,
    path = "/cart/items/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product id")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Insufficient stock"),
    ),
    tag = "cart"
)]
pub async fn update_item<S: StorefrontStore>(
    state: web::Data<AppState<S>>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let token = session_token(&req).ok_or(AppError::NotAuthenticated)?;
    let product_id = path.into_inner();
    let new_quantity = body.into_inner().quantity;

    if new_quantity <= 0 {
        let cart = state
            .sessions
            .with_session(token, |s| {
                s.cart.remove_line(product_id);
                CartResponse::from(&s.cart)
            })
            .ok_or(AppError::NotAuthenticated)?;
        return Ok(HttpResponse::Ok().json(cart));
    }

    let store = state.store.clone();
    let product = web::block(move || store.get_product(product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??
        .ok_or(AppError::NotFound)?;

    let outcome = state
        .sessions
        .with_session(token, |s| {
            s.cart
                .set_quantity(&product, new_quantity)
                .map(|_| CartResponse::from(&s.cart))
        })
        .ok_or(AppError::NotAuthenticated)?;
    let cart = outcome.map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(cart))
}

/// DELETE /cart/items/{product_id}
#[utoipa::path(
    delete,
    path = "/cart/items/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 401, description = "No session"),
    ),
    tag = "cart"
)]
pub async fn remove_item<S: StorefrontStore>(
    state: web::Data<AppState<S>>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let token = session_token(&req).ok_or(AppError::NotAuthenticated)?;
    let product_id = path.into_inner();

    let cart = state
        .sessions
        .with_session(token, |s| {
            s.cart.remove_line(product_id);
            CartResponse::from(&s.cart)
        })
        .ok_or(AppError::NotAuthenticated)?;
    Ok(HttpResponse::Ok().json(cart))
}
