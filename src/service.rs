use std::future::Future;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::openapi_for;
use crate::config::{ServiceConfig, ServiceProfile};
use crate::handlers::{api_test_handler, health_handler, root_handler};
use crate::routes;
use crate::state::AppState;

/// An HTTP application under construction: configuration, routes and the
/// cross-origin policy that wraps them.
pub struct Application {
    state: AppState,
    router: Router<AppState>,
    cors: CorsLayer,
}

impl Application {
    pub fn config(&self) -> &ServiceConfig {
        &self.state.config
    }

    /// Apply the middleware stack and bind the state, producing a router that
    /// can be served or driven directly in tests.
    pub fn into_router(self) -> Router {
        self.router
            .layer(self.cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state)
    }
}

/// Create an application for `config` with a permissive cross-origin policy.
pub fn create_service(config: ServiceConfig) -> Application {
    Application {
        state: AppState::new(config),
        router: Router::new(),
        cors: permissive_cors(),
    }
}

/// Any origin, method and header, with credentials.
///
/// Browsers reject a literal `*` alongside credentials, so the request's own
/// origin, method and headers are echoed back instead.
fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Register the status, placeholder and documentation routes for the
/// application's service.
pub fn register_routes(app: Application) -> Application {
    let config = app.config().clone();

    let mut router = app
        .router
        .route(routes::ROOT, get(root_handler))
        .route(&routes::api_test(&config.domain), get(api_test_handler));

    if config.health_route {
        router = router.route(routes::HEALTH, get(health_handler));
    }

    let router =
        router.merge(SwaggerUi::new(routes::DOCS).url(routes::OPENAPI_JSON, openapi_for(&config)));

    Application { router, ..app }
}

/// Bind `host:port` and serve `app` until Ctrl+C or SIGTERM.
///
/// A bind failure is returned immediately; there is no retry.
pub async fn run(app: Application, host: &str, port: u16) -> Result<()> {
    let address = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    serve(listener, app.into_router(), shutdown_signal()).await
}

/// Serve `router` on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener
        .local_addr()
        .context("Failed to read listener address")?;
    tracing::info!("Listening on {}", local_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    tracing::info!("Server on {} shut down", local_addr);
    Ok(())
}

/// Process entry point shared by every service binary.
///
/// Loads `.env` itself so the per-service binaries need no setup of their own.
/// Loading it a second time is a no-op for variables already set.
pub async fn start(profile: ServiceProfile) -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("{}-service starting", profile);

    let config = ServiceConfig::from_env(profile)?;
    config.log_startup();

    let host = config.bind_host.clone();
    let port = config.bind_port;
    let app = register_routes(create_service(config));

    run(app, &host, port).await
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn app_for(profile: ServiceProfile) -> Router {
        register_routes(create_service(profile.config())).into_router()
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, axum::body::Bytes) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_root_and_api_routes_for_every_service() {
        for profile in ServiceProfile::ALL {
            let config = profile.config();

            let (status, body) = get_body(app_for(profile), "/").await;
            assert_eq!(status, StatusCode::OK, "{}", profile);
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(
                json,
                serde_json::json!({
                    "message": format!("{} Service is running", config.display_name),
                    "service": config.service_tag,
                })
            );

            let (status, body) = get_body(app_for(profile), &routes::api_test(&config.domain)).await;
            assert_eq!(status, StatusCode::OK, "{}", profile);
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(
                json,
                serde_json::json!({
                    "message": format!("{} service API is working", config.display_name),
                })
            );
        }
    }

    #[tokio::test]
    async fn test_health_route_only_on_user_service() {
        let (status, body) = get_body(app_for(ServiceProfile::User), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], br#"{"status":"healthy","service":"user-service"}"#);

        for profile in [
            ServiceProfile::AiCoach,
            ServiceProfile::Exercise,
            ServiceProfile::Progress,
            ServiceProfile::Workout,
        ] {
            let (status, _) = get_body(app_for(profile), "/health").await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", profile);
        }
    }

    #[tokio::test]
    async fn test_unknown_path_returns_empty_not_found() {
        let (status, body) = get_body(app_for(ServiceProfile::Exercise), "/api/unknown").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_method_returns_method_not_allowed() {
        let response = app_for(ServiceProfile::Workout)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/workouts/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_cors_preflight_is_permissive() {
        let response = app_for(ServiceProfile::Progress)
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/progress/test")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization, x-custom")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "GET"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            "authorization, x-custom"
        );
    }

    #[tokio::test]
    async fn test_cors_headers_on_simple_request() {
        let response = app_for(ServiceProfile::Exercise)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/")
                    .header(header::ORIGIN, "https://app.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://app.example.com"
        );
    }

    #[tokio::test]
    async fn test_repeated_requests_are_byte_identical() {
        let app = app_for(ServiceProfile::User);

        let (_, first) = get_body(app.clone(), "/").await;
        for _ in 0..5 {
            let (status, body) = get_body(app.clone(), "/").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, first);
        }
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_independent() {
        let app = app_for(ServiceProfile::Exercise);

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let app = app.clone();
                tokio::spawn(async move {
                    let uri = if i % 2 == 0 { "/" } else { "/api/exercise/test" };
                    let (status, body) = get_body(app, uri).await;
                    (uri, status, body)
                })
            })
            .collect();

        for task in tasks {
            let (uri, status, body) = task.await.unwrap();
            assert_eq!(status, StatusCode::OK);
            let expected: &[u8] = if uri == "/" {
                br#"{"message":"Exercise Service is running","service":"workout-service"}"#
            } else {
                br#"{"message":"Exercise service API is working"}"#
            };
            assert_eq!(&body[..], expected);
        }
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let (status, body) = get_body(app_for(ServiceProfile::User), routes::OPENAPI_JSON).await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["info"]["title"], "User Service");
        assert_eq!(json["info"]["version"], "1.0.0");
        assert!(json["paths"]["/api/users/test"].is_object());
        assert!(json["paths"]["/health"].is_object());
    }

    #[tokio::test]
    async fn test_docs_redirects_to_swagger_ui() {
        let response = app_for(ServiceProfile::Exercise)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(routes::DOCS)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/docs/");

        let (status, body) = get_body(app_for(ServiceProfile::Exercise), "/docs/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.is_empty());
    }

    #[tokio::test]
    async fn test_run_fails_when_port_in_use() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let app = register_routes(create_service(ServiceProfile::Workout.config()));
        let err = run(app, "127.0.0.1", port).await.unwrap_err();

        assert!(err.to_string().contains("Failed to bind"));
    }
}
