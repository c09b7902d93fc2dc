//! 宽松的十进制反序列化
//!
//! 接口数值可能是字符串、整数或浮点。浮点按最短十进制表示转换，
//! 避免 0.15 变成其二进制展开；null 或缺省按 0 处理。

use crate::service::rounding::{decimal_from_f64, is_within_input_range, parse_decimal};
use bigdecimal::{BigDecimal, Zero};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDecimal {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawDecimal {
    fn into_decimal(self) -> Result<BigDecimal, String> {
        match self {
            Self::Int(n) => Ok(BigDecimal::from(n)),
            Self::Float(f) => Some(decimal_from_f64(f))
                .filter(is_within_input_range)
                .ok_or_else(|| format!("decimal out of range: {f}")),
            Self::Text(s) if s.trim().is_empty() => Ok(BigDecimal::zero()),
            Self::Text(s) => parse_decimal(&s).ok_or_else(|| format!("invalid decimal: {s:?}")),
        }
    }
}

/// `null`/缺省 -> 0
pub fn lenient<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawDecimal>::deserialize(deserializer)? {
        Some(raw) => raw.into_decimal().map_err(D::Error::custom),
        None => Ok(BigDecimal::zero()),
    }
}

/// `null`/缺省 -> None
pub fn lenient_opt<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawDecimal>::deserialize(deserializer)? {
        Some(raw) => raw.into_decimal().map(Some).map_err(D::Error::custom),
        None => Ok(None),
    }
}
