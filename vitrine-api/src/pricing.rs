use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vitrine_catalog::{LineQuote, PriceQuote};
use vitrine_shared::models::events::{ProductViewedEvent, ViewSource};

use crate::error::{pricing_error, repo_error, AppError};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct QuickViewResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub stock: i32,
    pub category: String,
    pub price: PriceQuote,
}

#[derive(Debug, Serialize)]
pub struct ViewsResponse {
    pub product_id: Uuid,
    pub views: u64,
}

#[derive(Debug, Deserialize)]
pub struct CartQuoteRequest {
    pub items: Vec<CartItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CartQuoteResponse {
    pub lines: Vec<LineQuote>,
    pub total_cents: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/products/{id}/price", get(get_price))
        .route("/v1/products/{id}/quick-view", get(quick_view))
        .route("/v1/products/{id}/views", get(get_views))
        .route("/v1/cart/quote", post(quote_cart))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/products/:id/price
/// Current effective price, flash sale applied if one is live
pub async fn get_price(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<PriceQuote>, AppError> {
    let quote = state
        .resolver
        .get_product_price(product_id)
        .await
        .map_err(pricing_error)?;

    Ok(Json(quote))
}

/// GET /v1/products/:id/quick-view
/// Product summary plus live price; records a product view as a side channel
pub async fn quick_view(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<QuickViewResponse>, AppError> {
    let product = state
        .products
        .get_product(product_id)
        .await
        .map_err(repo_error)?
        .ok_or_else(|| AppError::NotFoundError(format!("product not found: {}", product_id)))?;

    let price = state.resolver.quote_for_product(&product).await;

    // View counting is best effort and never affects the response.
    let event = ProductViewedEvent {
        product_id,
        source: ViewSource::QuickView,
        timestamp: chrono::Utc::now().timestamp(),
    };
    if let Err(err) = state.views.record_view(&event).await {
        tracing::warn!(product_id = %product_id, error = %err, "failed to record product view");
    }

    Ok(Json(QuickViewResponse {
        id: product.id,
        name: product.name,
        description: product.description,
        stock: product.stock,
        category: product.category,
        price,
    }))
}

/// GET /v1/products/:id/views
pub async fn get_views(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ViewsResponse>, AppError> {
    let views = state.views.view_count(product_id).await.map_err(repo_error)?;
    Ok(Json(ViewsResponse { product_id, views }))
}

/// POST /v1/cart/quote
/// Live line quotes for a cart; totals are recomputed, never snapshotted
pub async fn quote_cart(
    State(state): State<AppState>,
    Json(req): Json<CartQuoteRequest>,
) -> Result<Json<CartQuoteResponse>, AppError> {
    let mut lines = Vec::with_capacity(req.items.len());
    for item in &req.items {
        let line = state
            .resolver
            .price_line(item.product_id, item.quantity)
            .await
            .map_err(pricing_error)?;
        lines.push(line);
    }

    let total_cents = lines.iter().map(|l| l.total_cents).sum();
    Ok(Json(CartQuoteResponse { lines, total_cents }))
}
