use tower_http::cors::{Any, CorsLayer};

/// Build the CORS layer. The editor runs on another origin and writes with
/// `PUT`, so any origin, method and header is allowed.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
