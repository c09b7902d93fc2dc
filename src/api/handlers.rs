use crate::error::PlanError;
use crate::models::decimal;
use crate::models::{LineItem, PlanSavePayload};
use crate::service::product_rules::build_range;
use crate::service::unit_rules::normalize_unit;
use crate::service::PricingService;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 单位规则响应
#[derive(Debug, Serialize)]
pub struct UnitRulesResponse {
    pub splittable_units: Vec<String>,
    pub splittable_step: String,
    pub default_step: String,
    pub tooltip: String,
}

/// 请求体: 单位标准化
#[derive(Debug, Deserialize)]
pub struct NormalizeUnitRequest {
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Serialize)]
pub struct NormalizeUnitResponse {
    pub success: bool,
    pub value: String,
    pub message: String,
}

/// 请求体: 数量量化与金额计算
#[derive(Debug, Deserialize)]
pub struct QuantizeRequest {
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "decimal::lenient")]
    pub quantity: BigDecimal,
    #[serde(default, deserialize_with = "decimal::lenient")]
    pub price: BigDecimal,
}

#[derive(Debug, Serialize)]
pub struct QuantizeResponse {
    pub success: bool,
    pub message: String,
    pub unit: Option<String>,
    pub step: Option<String>,
    pub precision: Option<u32>,
    pub quantity: Option<String>,
    pub amount: Option<String>,
}

impl QuantizeResponse {
    fn failed(message: String) -> Self {
        Self {
            success: false,
            message,
            unit: None,
            step: None,
            precision: None,
            quantity: None,
            amount: None,
        }
    }
}

/// 请求体: 产品数量范围校验
#[derive(Debug, Deserialize)]
pub struct RangeValidateRequest {
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "decimal::lenient_opt")]
    pub min: Option<BigDecimal>,
    #[serde(default, deserialize_with = "decimal::lenient_opt")]
    pub max: Option<BigDecimal>,
    pub label: Option<String>,
}

/// 通用响应体
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// 请求体: 保存前校验
#[derive(Debug, Deserialize)]
pub struct PlanValidateRequest {
    #[serde(default)]
    pub items: Vec<LineItem>,
}

#[derive(Debug, Serialize)]
pub struct PlanValidateResponse {
    pub success: bool,
    pub message: String,
    pub needs_confirmation: bool,
    pub adjusted_names: Vec<String>,
    pub payload: Option<PlanSavePayload>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 当前可分割单位与步进
pub async fn unit_rules(State(service): State<Arc<PricingService>>) -> Response {
    let rules = service.rules();
    let response = UnitRulesResponse {
        splittable_units: rules.splittable_units(),
        splittable_step: "0.1".to_string(),
        default_step: "1".to_string(),
        tooltip: rules.quantity_rule_tooltip(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// 单位标准化接口
pub async fn normalize(Json(req): Json<NormalizeUnitRequest>) -> Response {
    match normalize_unit(&req.unit) {
        Ok(value) => {
            let response = NormalizeUnitResponse {
                success: true,
                value,
                message: String::new(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let response = NormalizeUnitResponse {
                success: false,
                value: e.raw_value().to_string(),
                message: e.to_string(),
            };
            (StatusCode::BAD_REQUEST, Json(response)).into_response()
        }
    }
}

/// 数量量化接口：按单位步进取整并计算金额
pub async fn quantize(
    State(service): State<Arc<PricingService>>,
    Json(req): Json<QuantizeRequest>,
) -> Response {
    match service.quote(&req.unit, &req.quantity, &req.price) {
        Ok(line) => {
            let response = QuantizeResponse {
                success: true,
                message: String::new(),
                unit: Some(line.unit),
                step: Some(line.step.to_string()),
                precision: Some(line.precision),
                quantity: Some(line.quantity.to_string()),
                amount: Some(line.amount.to_string()),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let response = QuantizeResponse::failed(e.to_string());
            (StatusCode::BAD_REQUEST, Json(response)).into_response()
        }
    }
}

/// 产品数量范围校验接口
pub async fn validate_range(
    State(service): State<Arc<PricingService>>,
    Json(req): Json<RangeValidateRequest>,
) -> Response {
    let label = req.label.unwrap_or_else(|| "数量范围".to_string());
    let result = build_range(req.min, req.max, &label)
        .and_then(|range| service.validate_range(range.as_ref(), &req.unit, &label));

    match result {
        Ok(()) => {
            let response = MessageResponse {
                success: true,
                message: String::new(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let response = MessageResponse {
                success: false,
                message: e.to_string(),
            };
            (status_for(&e), Json(response)).into_response()
        }
    }
}

/// 保存前校验接口：重新量化、必填检查、最低金额修正，返回可提交的请求体
pub async fn validate_plan(
    State(service): State<Arc<PricingService>>,
    Json(req): Json<PlanValidateRequest>,
) -> Response {
    let mut items = req.items;
    match service.prepare_items(&mut items) {
        Ok(preparation) => {
            let message = preparation
                .notice(service.min_amount())
                .map(|notice| notice.message())
                .unwrap_or_default();
            let response = PlanValidateResponse {
                success: true,
                message,
                needs_confirmation: preparation.needs_confirmation,
                adjusted_names: preparation.adjusted_names,
                payload: Some(service.build_payload(&items)),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::warn!("保存前校验未通过: {}", e);
            let response = PlanValidateResponse {
                success: false,
                message: e.to_string(),
                needs_confirmation: false,
                adjusted_names: Vec::new(),
                payload: None,
            };
            (status_for(&e), Json(response)).into_response()
        }
    }
}

/// 单位输入错误为 400，其余校验错误为 422
fn status_for(error: &PlanError) -> StatusCode {
    match error {
        PlanError::Unit(_) => StatusCode::BAD_REQUEST,
        e if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
