pub mod health;
pub mod root;

pub use api_test::api_test_handler;
pub use health::health_handler;
pub use root::root_handler;
