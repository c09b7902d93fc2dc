//! 银行家舍入 (Round half to even)
//!
//! 与服务端金额汇总使用同一舍入规则。全程十进制运算，中点判定是精确的。

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use std::str::FromStr;

/// 金额统一保留两位小数
pub const MONEY_PRECISION: u32 = 2;

/// 按精度做银行家舍入
pub fn bankers_round(value: &BigDecimal, precision: u32) -> BigDecimal {
    value.with_scale_round(i64::from(precision), RoundingMode::HalfEven)
}

/// 浮点入口：非有限值返回 0，不报错
pub fn bankers_round_f64(value: f64, precision: u32) -> BigDecimal {
    bankers_round(&decimal_from_f64(value), precision)
}

/// f64 -> BigDecimal，取最短十进制表示；NaN/Inf 为 0
pub fn decimal_from_f64(value: f64) -> BigDecimal {
    if !value.is_finite() {
        return BigDecimal::zero();
    }
    BigDecimal::from_str(&value.to_string()).unwrap_or_else(|_| BigDecimal::zero())
}

/// 输入数值的有效位数上限
pub const MAX_INPUT_DIGITS: u64 = 30;
/// 输入数值规整后的小数位/指数绝对值上限
pub const MAX_INPUT_SCALE: i64 = 18;
const MAX_INPUT_LEN: usize = 64;

/// 是否在可运算范围内
///
/// 舍入会按目标精度展开整数，超大指数 (如 `1E+20000000`) 会占满 CPU 与内存。
pub fn is_within_input_range(value: &BigDecimal) -> bool {
    if value.digits() > MAX_INPUT_DIGITS {
        return false;
    }
    let (_, scale) = value.normalized().as_bigint_and_exponent();
    (-MAX_INPUT_SCALE..=MAX_INPUT_SCALE).contains(&scale)
}

/// 解析用户/接口输入的数值文本；超出范围视为无效
pub fn parse_decimal(raw: &str) -> Option<BigDecimal> {
    let raw = raw.trim();
    if raw.len() > MAX_INPUT_LEN {
        return None;
    }
    BigDecimal::from_str(raw).ok().filter(is_within_input_range)
}

/// 金额格式化：舍入后固定两位小数
pub fn format_money(value: &BigDecimal) -> String {
    bankers_round(value, MONEY_PRECISION).to_string()
}

/// 一组金额求和后统一舍入
pub fn sum_amounts<'a, I>(amounts: I) -> BigDecimal
where
    I: IntoIterator<Item = &'a BigDecimal>,
{
    let total = amounts
        .into_iter()
        .fold(BigDecimal::zero(), |acc, amount| acc + amount);
    bankers_round(&total, MONEY_PRECISION)
}
