pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod source;

pub use config::AppConfig;
pub use error::{PlanError, SourceError, UnitError};
pub use service::{PlanEditor, PricingService};
pub use source::MemoryBackend;
