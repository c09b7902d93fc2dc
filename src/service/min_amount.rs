//! 最低金额自动修正：金额低于下限时抬升数量到最小合法步进

use super::quantity::{compute_amount, quantize};
use super::unit_rules::UnitRules;
use crate::models::LineItem;
use bigdecimal::{BigDecimal, RoundingMode, Zero};

/// 默认最低金额 (1 元)
pub fn default_floor() -> BigDecimal {
    BigDecimal::from(1)
}

/// 金额低于 `floor` 时抬升数量，返回是否发生了调整
///
/// 单价非正或金额已达标时不做任何修改。
/// 所需数量 = `ceil((floor / price) / step) * step`，再按单位量化。
pub fn adjust_to_floor(row: &mut LineItem, floor: &BigDecimal, rules: &UnitRules) -> bool {
    if row.price <= BigDecimal::zero() || row.amount >= *floor {
        return false;
    }

    let rule = rules.step_rule(&row.unit);
    let steps = (floor / &row.price / &rule.step).with_scale_round(0, RoundingMode::Ceiling);
    let needed = steps * &rule.step;

    row.quantity = quantize(&needed, &rule);
    row.amount = compute_amount(&row.price, &row.quantity);
    true
}
