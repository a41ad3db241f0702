use crate::models::StatusResponse;
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// GET / handler - Reports that the service is running
#[utoipa::path(
    get,
    path = routes::ROOT,
    responses(
        (status = 200, description = "Service is running", body = StatusResponse)
    ),
    tag = "status"
)]
pub async fn root_handler(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    (
        StatusCode::OK,
        Json(StatusResponse {
            message: format!("{} Service is running", state.config.display_name),
            service: state.config.service_tag.clone(),
        }),
    )
}
