pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod service;
pub mod session;
pub mod tasks;
pub mod workflow;

pub use config::Config;
pub use error::{AnalysisError, ConfigError};
pub use service::{AppState, build_router, create_app};
pub use session::SessionState;
pub use workflow::AnalysisWorkflow;
pub use models::*;
