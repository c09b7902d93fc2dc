pub mod handlers;

pub use handlers::*;

use crate::service::PricingService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 构建全部路由
pub fn router(service: Arc<PricingService>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/products/unit-rules", get(unit_rules))
        .route("/api/units/normalize", post(normalize))
        .route("/api/pricing/quantize", post(quantize))
        .route("/api/products/range/validate", post(validate_range))
        .route("/api/plans/validate", post(validate_plan))
        .with_state(service)
}
