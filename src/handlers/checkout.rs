use actix_web::{web, HttpRequest, HttpResponse};

use crate::domain::ports::StorefrontStore;
use crate::errors::AppError;
use crate::AppState;

use super::orders::OrderResponse;
use super::session_token;

/// POST /checkout
///
/// Commits the session cart as a new order. The commit is one atomic
/// transaction (order insert plus every stock decrement); the cart is
/// cleared only after the transaction succeeds, so a failed checkout leaves
/// it intact for the user to adjust and retry.
#[utoipa::path(
    post,
    path = "/checkout",
    responses(
        (status = 201, description = "Order committed", body = OrderResponse),
        (status = 401, description = "No session"),
        (status = 404, description = "A cart product no longer exists"),
        (status = 409, description = "Insufficient stock or too much contention"),
        (status = 422, description = "Cart is empty"),
    ),
    tag = "checkout"
)]
pub async fn checkout<S: StorefrontStore>(
    state: web::Data<AppState<S>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let token = session_token(&req).ok_or(AppError::NotAuthenticated)?;
    let (user_id, cart) = state
        .sessions
        .with_session(token, |s| (s.user_id, s.cart.clone()))
        .ok_or(AppError::NotAuthenticated)?;

    let service = state.checkout.clone();
    let snapshot = cart.clone();
    let order = web::block(move || service.commit(Some(user_id), &snapshot))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    // Only the committed snapshot is cleared; lines added to the session
    // while the commit was in flight stay in the cart.
    state.sessions.clear_cart_if_unchanged(token, &cart);
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}
