//! Pick-up locations

use axum::{extract::State, Json};

use crate::AppState;

/// Pick-up locations offered by the storefront
#[utoipa::path(
    get,
    path = "/locations",
    tag = "locations",
    responses(
        (status = 200, description = "Configured pick-up locations", body = Vec<String>)
    )
)]
pub async fn list_locations(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.config.locations.clone())
}
