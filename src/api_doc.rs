use utoipa::OpenApi;

use crate::config::ServiceConfig;
use crate::handlers;
use crate::models::{HealthResponse, MessageResponse, StatusResponse};
use crate::routes;

/// OpenAPI documentation shared by every service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "fitness-services API",
        version = "1.0.0",
        description = "Minimal fitness platform service"
    ),
    paths(
        handlers::root::root_handler,
        handlers::health::health_handler,
        handlers::api_test::api_test_handler
    ),
    components(
        schemas(
            StatusResponse,
            MessageResponse,
            HealthResponse
        )
    ),
    tags(
        (name = "status", description = "Service status"),
        (name = "health", description = "Health check operations"),
        (name = "api", description = "Service API placeholder")
    )
)]
pub struct ApiDoc;

/// Document for one service: its own info block, the test route under its
/// concrete path, and `/health` only where it is registered.
pub fn openapi_for(config: &ServiceConfig) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = config.title.clone();
    doc.info.description = Some(config.description.clone());
    doc.info.version = config.version.clone();

    if let Some(mut item) = doc.paths.paths.get(routes::API_TEST_TEMPLATE).cloned() {
        if let Some(operation) = item.get.as_mut() {
            operation.parameters = None;
        }
        doc.paths.paths.insert(routes::api_test(&config.domain), item);
    }

    doc.paths.paths.retain(|path, _| {
        path.as_str() != routes::API_TEST_TEMPLATE
            && (config.health_route || path.as_str() != routes::HEALTH)
    });

    doc
}
