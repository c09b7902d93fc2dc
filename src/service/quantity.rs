//! 数量量化与金额计算

use super::rounding::{bankers_round, decimal_from_f64, MONEY_PRECISION};
use super::unit_rules::{UnitRules, UnitStepRule};
use crate::models::{LineItem, Product};
use bigdecimal::{BigDecimal, Zero};

/// 按步进把数量吸附到合法网格：`round(round(q / step) * step, precision)`
///
/// 步数与结果都用银行家舍入，因此 0.15 斤 -> 1.5 步 -> 2 步 -> 0.2。
pub fn quantize(raw: &BigDecimal, rule: &UnitStepRule) -> BigDecimal {
    if rule.step <= BigDecimal::zero() {
        return bankers_round(raw, 0);
    }
    let steps = bankers_round(&(raw / &rule.step), 0);
    bankers_round(&(steps * &rule.step), rule.precision)
}

/// 浮点入口：非有限值量化为 0
pub fn quantize_f64(raw: f64, rule: &UnitStepRule) -> BigDecimal {
    if !raw.is_finite() {
        return BigDecimal::zero();
    }
    quantize(&decimal_from_f64(raw), rule)
}

/// 金额 = 单价 * 数量，保留两位
pub fn compute_amount(price: &BigDecimal, quantity: &BigDecimal) -> BigDecimal {
    bankers_round(&(price * quantity), MONEY_PRECISION)
}

/// 数量变化后量化并重算金额（是否标记未保存由会话决定）
pub fn apply_quantity_change(row: &mut LineItem, rules: &UnitRules) {
    let rule = rules.step_rule(&row.unit);
    row.quantity = quantize(&row.quantity, &rule);
    row.amount = compute_amount(&row.price, &row.quantity);
}

/// 把产品主数据复制到行
///
/// 行原本没有有效数量时默认一个步进；单位变化时按新单位重新量化。
pub fn apply_product(row: &mut LineItem, product: &Product, rules: &UnitRules) {
    let prev_unit = std::mem::take(&mut row.unit);
    row.product_id = Some(product.id.clone());
    row.name = product.name.clone();
    row.unit = product.unit.clone();
    row.price = product.base_price.clone();
    row.category_id = product.category_id.clone();
    row.category_name = product.category_name.clone();

    let rule = rules.step_rule(&row.unit);
    if row.quantity <= BigDecimal::zero() {
        row.quantity = rule.step.clone();
    }
    if prev_unit != row.unit {
        row.quantity = quantize(&row.quantity, &rule);
    }
    apply_quantity_change(row, rules);
}
