use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vitrine_catalog::{DiscountType, FlashSale, FlashSaleProduct, Product};
use vitrine_shared::models::events::FlashSaleCreatedEvent;

use crate::error::{repo_error, AppError};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateFlashSaleRequest {
    pub name: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    pub products: Vec<FlashSaleEntryRequest>,
}

fn default_is_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct FlashSaleEntryRequest {
    pub product_id: Uuid,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub max_per_customer: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
    pub category: String,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
    pub category: String,
    pub is_active: bool,
    pub metadata: serde_json::Value,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price_cents: product.price_cents,
            stock: product.stock,
            category: product.category,
            is_active: product.is_active,
            metadata: product.metadata,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/admin/flash-sales",
            post(create_flash_sale).get(list_flash_sales),
        )
        .route(
            "/v1/admin/flash-sales/{id}",
            get(get_flash_sale)
                .put(update_flash_sale)
                .delete(delete_flash_sale),
        )
        .route("/v1/admin/products", post(create_product).get(list_products))
}

// ============================================================================
// Flash Sale Handlers
// ============================================================================

/// POST /v1/admin/flash-sales
pub async fn create_flash_sale(
    State(state): State<AppState>,
    Json(req): Json<CreateFlashSaleRequest>,
) -> Result<(StatusCode, Json<FlashSale>), AppError> {
    let sale = FlashSale::new(
        req.name,
        req.description,
        req.starts_at,
        req.ends_at,
        req.is_active,
        req.products.into_iter().map(entry_from_request).collect(),
    );

    sale.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    state.sales.create_sale(&sale).await.map_err(repo_error)?;

    let event = FlashSaleCreatedEvent {
        sale_id: sale.id,
        product_count: sale.products.len(),
        starts_at: sale.starts_at.timestamp(),
        ends_at: sale.ends_at.timestamp(),
    };
    tracing::info!(sale_id = %event.sale_id, products = event.product_count, "flash sale created");

    Ok((StatusCode::CREATED, Json(sale)))
}

/// GET /v1/admin/flash-sales
pub async fn list_flash_sales(
    State(state): State<AppState>,
) -> Result<Json<Vec<FlashSale>>, AppError> {
    let sales = state.sales.list_sales().await.map_err(repo_error)?;
    Ok(Json(sales))
}

/// GET /v1/admin/flash-sales/:id
pub async fn get_flash_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> Result<Json<FlashSale>, AppError> {
    let sale = state
        .sales
        .get_sale(sale_id)
        .await
        .map_err(repo_error)?
        .ok_or_else(|| AppError::NotFoundError(format!("flash sale not found: {}", sale_id)))?;

    Ok(Json(sale))
}

/// PUT /v1/admin/flash-sales/:id
pub async fn update_flash_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
    Json(req): Json<CreateFlashSaleRequest>,
) -> Result<Json<FlashSale>, AppError> {
    let existing = state
        .sales
        .get_sale(sale_id)
        .await
        .map_err(repo_error)?
        .ok_or_else(|| AppError::NotFoundError(format!("flash sale not found: {}", sale_id)))?;

    let updated = FlashSale {
        id: existing.id,
        name: req.name,
        description: req.description,
        starts_at: req.starts_at,
        ends_at: req.ends_at,
        is_active: req.is_active,
        products: req.products.into_iter().map(entry_from_request).collect(),
        created_at: existing.created_at,
    };

    updated
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    state
        .sales
        .update_sale(sale_id, &updated)
        .await
        .map_err(repo_error)?;

    Ok(Json(updated))
}

/// DELETE /v1/admin/flash-sales/:id
pub async fn delete_flash_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sales.delete_sale(sale_id).await.map_err(repo_error)?;
    Ok(StatusCode::NO_CONTENT)
}

fn entry_from_request(req: FlashSaleEntryRequest) -> FlashSaleProduct {
    FlashSaleProduct {
        product_id: req.product_id,
        discount_type: req.discount_type,
        discount_value: req.discount_value,
        max_per_customer: req.max_per_customer,
    }
}

// ============================================================================
// Product Handlers
// ============================================================================

/// POST /v1/admin/products
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    if req.price_cents < 0 {
        return Err(AppError::ValidationError(
            "price_cents must be non-negative".to_string(),
        ));
    }
    if req.stock < 0 {
        return Err(AppError::ValidationError(
            "stock must be non-negative".to_string(),
        ));
    }

    let product = Product::new(
        req.name,
        req.description,
        req.price_cents,
        req.stock,
        req.category,
        req.metadata.unwrap_or_else(|| serde_json::json!({})),
    );

    state
        .products
        .create_product(&product)
        .await
        .map_err(repo_error)?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// GET /v1/admin/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state
        .products
        .list_products(query.category.as_deref())
        .await
        .map_err(repo_error)?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}
