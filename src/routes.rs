// Route path constants - single source of truth for all API paths

pub const ROOT: &str = "/";
pub const HEALTH: &str = "/health";
pub const OPENAPI_JSON: &str = "/openapi.json";
pub const DOCS: &str = "/docs";

/// Path documented for the test route before the service's domain is known.
pub const API_TEST_TEMPLATE: &str = "/api/{domain}/test";

pub fn api_test(domain: &str) -> String {
    format!("/api/{}/test", domain)
}
