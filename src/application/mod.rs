// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - Wires storage, repositories and services from configuration
// - Translates service results into caller-facing responses
// - Holds no business rules

pub mod error_handling;
pub mod state;

pub use error_handling::{ApiResponse, ErrorResponse, ErrorType, ToErrorResponse};
pub use state::AppState;
