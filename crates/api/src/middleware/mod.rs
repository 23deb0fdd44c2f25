pub mod cors;
pub mod limits;
pub mod request_tracing;
