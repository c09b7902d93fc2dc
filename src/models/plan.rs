use super::decimal;
use super::LineItem;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 计划源返回的计划详情
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRecord {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "decimal::lenient")]
    pub total_amount: BigDecimal,
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// 原样保留，解析失败时视为无保存时间
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl PlanRecord {
    pub fn updated_at_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.updated_at.as_deref()?)
    }
}

/// 宽松解析时间戳：RFC3339 或无时区的 `YYYY-MM-DDTHH:MM:SS[.f]`（按 UTC）
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// 会话内的计划表头 (总金额为缓存值，保存成功后刷新)
#[derive(Debug, Clone)]
pub struct PlanHeader {
    pub date: NaiveDate,
    pub total_amount: BigDecimal,
    pub items: Vec<SavePayloadItem>,
}

/// 保存请求明细：数值按精度转为十进制字符串
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayloadItem {
    pub product_id: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub name: String,
    pub unit: String,
    pub price: String,
    pub quantity: String,
    pub amount: String,
}

/// 保存请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSavePayload {
    pub items: Vec<SavePayloadItem>,
    pub total_amount: String,
}
