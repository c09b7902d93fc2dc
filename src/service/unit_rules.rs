//! 单位标准化与数量步进规则
//!
//! - 可分割单位（克/千克/斤/两/毫升/升）采购数量步进 0.1，保留 1 位小数
//! - 其他单位步进 1，保留 0 位小数
//! - 英文单位只接受内置别名；未识别英文报错；未识别中文原样保留

use crate::error::UnitError;
use bigdecimal::{BigDecimal, RoundingMode};
use std::collections::BTreeSet;

/// 内置可分割单位
pub const DEFAULT_SPLITTABLE_UNITS: [&str; 6] = ["克", "千克", "斤", "两", "毫升", "升"];

/// 步进整除判定容差的小数位 (1e-8)
const STEP_TOLERANCE_SCALE: i64 = 8;

/// 别名 -> 中文标准单位 (键已去空白并小写)
const UNIT_ALIASES: &[(&str, &str)] = &[
    // 中文别名
    ("公斤", "千克"),
    ("公升", "升"),
    // 英文缩写
    ("g", "克"),
    ("kg", "千克"),
    ("ml", "毫升"),
    ("l", "升"),
    ("jin", "斤"),
    ("liang", "两"),
    // 英文全称
    ("gram", "克"),
    ("grams", "克"),
    ("kilogram", "千克"),
    ("kilograms", "千克"),
    ("milliliter", "毫升"),
    ("milliliters", "毫升"),
    ("millilitre", "毫升"),
    ("millilitres", "毫升"),
    ("liter", "升"),
    ("liters", "升"),
    ("litre", "升"),
    ("litres", "升"),
    // 中文标准值
    ("克", "克"),
    ("千克", "千克"),
    ("斤", "斤"),
    ("两", "两"),
    ("毫升", "毫升"),
    ("升", "升"),
];

fn alias_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// 标准化单位输入
pub fn normalize_unit(raw: &str) -> Result<String, UnitError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UnitError::Empty);
    }

    let key = alias_key(raw);
    if let Some((_, canonical)) = UNIT_ALIASES.iter().find(|(alias, _)| *alias == key) {
        return Ok((*canonical).to_string());
    }

    if raw.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(UnitError::UnrecognizedLatin(raw.to_string()));
    }

    Ok(raw.to_string())
}

/// 单位对应的数量步进规则 (派生值，不落库)
#[derive(Debug, Clone, PartialEq)]
pub struct UnitStepRule {
    pub step: BigDecimal,
    pub precision: u32,
}

impl UnitStepRule {
    pub fn fractional() -> Self {
        Self {
            step: BigDecimal::new(1.into(), 1),
            precision: 1,
        }
    }

    pub fn whole() -> Self {
        Self {
            step: BigDecimal::from(1),
            precision: 0,
        }
    }
}

/// 可分割单位清单；外部规则源可整体覆盖内置清单
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRules {
    splittable: BTreeSet<String>,
}

impl Default for UnitRules {
    fn default() -> Self {
        Self {
            splittable: DEFAULT_SPLITTABLE_UNITS.iter().map(|u| u.to_string()).collect(),
        }
    }
}

impl UnitRules {
    /// 用外部下发的清单覆盖内置清单；清单为空视为不可用，回落到内置
    pub fn from_units<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let splittable: BTreeSet<String> = units
            .into_iter()
            .filter_map(|u| normalize_unit(u.as_ref()).ok())
            .collect();
        if splittable.is_empty() {
            return Self::default();
        }
        Self { splittable }
    }

    /// 是否可分割；无法标准化的单位按整数单位处理
    pub fn is_splittable(&self, unit: &str) -> bool {
        normalize_unit(unit)
            .map(|u| self.splittable.contains(&u))
            .unwrap_or(false)
    }

    pub fn step_rule(&self, unit: &str) -> UnitStepRule {
        if self.is_splittable(unit) {
            UnitStepRule::fractional()
        } else {
            UnitStepRule::whole()
        }
    }

    pub fn step_for_unit(&self, unit: &str) -> BigDecimal {
        self.step_rule(unit).step
    }

    pub fn precision_for_unit(&self, unit: &str) -> u32 {
        self.step_rule(unit).precision
    }

    /// `value / step` 与最近整数之差小于 1e-8
    pub fn is_multiple_of_step(&self, value: &BigDecimal, unit: &str) -> bool {
        let step = self.step_for_unit(unit);
        let scaled = value / &step;
        let nearest = scaled.with_scale_round(0, RoundingMode::HalfEven);
        let tolerance = BigDecimal::new(1.into(), STEP_TOLERANCE_SCALE);
        (scaled - nearest).abs() < tolerance
    }

    /// 排序后的可分割单位
    pub fn splittable_units(&self) -> Vec<String> {
        self.splittable.iter().cloned().collect()
    }

    /// 数量步进提示文案
    pub fn quantity_rule_tooltip(&self) -> String {
        format!(
            "数量按单位自动步进：{} 用 0.1；其他单位用 1。",
            self.splittable_units().join("、")
        )
    }
}
