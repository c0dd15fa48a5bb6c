//! HTTP middleware: sessions, the member gate and security headers.

pub mod auth;
pub mod security_headers;
pub mod session;

pub use auth::{RequireMember, load_state, save_state, sign_in, sign_out};
pub use security_headers::security_headers_middleware;
pub use session::with_session_layer;
