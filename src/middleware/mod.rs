//! HTTP middleware wrapped around every diagnostic handler.
//!
//! # Architecture
//!
//! ```text
//! Request → CORS → Access Log → Bearer Auth → Handler → Response
//!             ↓                      ↓
//!       200 for OPTIONS        401 Unauthorized
//! ```
//!
//! CORS sits outermost so preflights are answered before they are logged or
//! authenticated, and so its headers land on every response, rejections
//! included.

pub mod auth;
pub mod cors;
pub mod logging;

pub use auth::{AuthOutcome, BearerAuth, check_authorization};
pub use cors::CorsLayer;
pub use logging::AccessLogLayer;
