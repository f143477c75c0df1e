use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::Order;
use crate::domain::ports::StorefrontStore;
use crate::errors::AppError;
use crate::AppState;

use super::session_token;

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub status: String,
    pub total: String,
    pub created_at: String,
    pub lines: Vec<OrderLineResponse>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            status: order.status.as_str().to_string(),
            total: order.total.to_string(),
            created_at: order.created_at.to_rfc3339(),
            lines: order
                .lines
                .into_iter()
                .map(|l| OrderLineResponse {
                    product_id: l.product_id,
                    name: l.name,
                    quantity: l.quantity,
                    unit_price: l.unit_price.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderHistoryResponse {
    pub orders: Vec<OrderResponse>,
}

/// GET /orders
///
/// The session user's order history, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Order history", body = OrderHistoryResponse),
        (status = 401, description = "No session"),
    ),
    tag = "orders"
)]
pub async fn list_orders<S: StorefrontStore>(
    state: web::Data<AppState<S>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let token = session_token(&req).ok_or(AppError::NotAuthenticated)?;
    let user_id = state
        .sessions
        .with_session(token, |s| s.user_id)
        .ok_or(AppError::NotAuthenticated)?;

    let service = state.orders.clone();
    let orders = web::block(move || service.for_user(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderHistoryResponse {
        orders: orders.into_iter().map(Into::into).collect(),
    }))
}
