use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::StorefrontStore;
use crate::domain::product::Product;
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub stock: i32,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            image_url: p.image_url,
            price: p.price.to_string(),
            stock: p.stock,
        }
    }
}

/// GET /products
#[utoipa::path(
    get,
    path = "/products",
    responses((status = 200, description = "Full catalog", body = [ProductResponse])),
    tag = "products"
)]
pub async fn list_products<S: StorefrontStore>(
    state: web::Data<AppState<S>>,
) -> Result<HttpResponse, AppError> {
    let store = state.store.clone();
    let products = web::block(move || store.list_products())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product<S: StorefrontStore>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let store = state.store.clone();
    let product = web::block(move || store.get_product(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??
        .ok_or(AppError::NotFound)?;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}
