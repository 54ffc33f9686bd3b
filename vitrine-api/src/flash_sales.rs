use axum::{extract::State, routing::get, Json, Router};
use vitrine_core::PricedSale;

use crate::error::{pricing_error, AppError};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/flash-sales", get(list_flash_sales))
}

/// GET /v1/flash-sales
/// Live sales with every entry priced, for the listing page
pub async fn list_flash_sales(
    State(state): State<AppState>,
) -> Result<Json<Vec<PricedSale>>, AppError> {
    let sales = state.resolver.live_sales().await.map_err(pricing_error)?;
    Ok(Json(sales))
}
