//! Web server module for receiving encrypted form submissions.
//!
//! This module provides:
//! - Signature header parsing and verification
//! - The `/submissions` webhook and `/health` handlers
//! - Router construction shared by the binary and tests

pub mod handlers;
pub mod header;
pub mod signature;

use std::path::PathBuf;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub use handlers::{health, submissions, AppState, HealthResponse, MessageResponse};
pub use header::{HeaderFormatError, SignatureHeader, SIGNATURE_HEADER};
pub use signature::{authenticate, now_millis, AuthError, SignatureVerifier};

/// Build the application router.
///
/// When `serve_dir` is set, its contents are exposed under `/temp/`.
pub fn router(state: AppState, serve_dir: Option<PathBuf>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/submissions", post(submissions));

    if let Some(dir) = serve_dir {
        app = app.nest_service("/temp", ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
