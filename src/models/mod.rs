mod api;

pub use api::{HealthResponse, WhoamiResponse};
