use tower_http::limit::RequestBodyLimitLayer;

/// Reject request bodies over `bytes` with 413.
pub fn body_limit_layer(bytes: usize) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(bytes)
}
