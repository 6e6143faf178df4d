pub mod axum_http;
#[cfg(test)]
pub mod in_memory;
pub mod postgres;
