pub mod config;
pub mod error;
pub mod inference;
pub mod models;
pub mod pipeline;
pub mod service;

pub use config::ServiceConfig;
pub use error::{ClaimError, InferenceError, RasterizeError};
pub use models::*;
pub use service::{AppState, create_app};
