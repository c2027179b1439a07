//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, routes)
//!     → request.rs (request ID generation and propagation)
//!     → api (per-route guard chain + body strategy)
//!     → response.rs (HeaderView/Body split, two-phase run, Reply → Response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::serve_gated;
pub use server::HttpServer;
