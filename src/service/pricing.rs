use super::product_rules;
use super::quantity::{apply_quantity_change, compute_amount, quantize};
use super::rounding::{bankers_round, format_money, sum_amounts, MONEY_PRECISION};
use super::unit_rules::{normalize_unit, UnitRules};
use super::validation::{self, SavePreparation};
use crate::config::PricingConfig;
use crate::error::{PlanError, UnitError};
use crate::models::{LineItem, PlanSavePayload, QuantityRange, SavePayloadItem};
use bigdecimal::BigDecimal;
use serde::Serialize;

/// 单行报价结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotedLine {
    pub unit: String,
    pub step: BigDecimal,
    pub precision: u32,
    pub quantity: BigDecimal,
    pub amount: BigDecimal,
}

/// 定价服务：持有当前单位规则与最低金额
#[derive(Debug, Clone)]
pub struct PricingService {
    rules: UnitRules,
    min_amount: BigDecimal,
}

impl PricingService {
    pub fn new(rules: UnitRules, min_amount: BigDecimal) -> Self {
        Self { rules, min_amount }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        Self::new(UnitRules::from_units(&config.splittable_units), config.min_amount.clone())
    }

    pub fn rules(&self) -> &UnitRules {
        &self.rules
    }

    pub fn min_amount(&self) -> &BigDecimal {
        &self.min_amount
    }

    /// 规则源下发新清单后替换
    pub fn set_rules(&mut self, rules: UnitRules) {
        self.rules = rules;
    }

    /// 标准化单位后量化数量并计算金额
    pub fn quote(&self, unit: &str, quantity: &BigDecimal, price: &BigDecimal) -> Result<QuotedLine, UnitError> {
        let unit = normalize_unit(unit)?;
        let rule = self.rules.step_rule(&unit);
        let quantity = quantize(quantity, &rule);
        let amount = compute_amount(price, &quantity);
        Ok(QuotedLine {
            unit,
            step: rule.step,
            precision: rule.precision,
            quantity,
            amount,
        })
    }

    /// 服务端口径：逐行重新量化后执行保存前校验（不含确认交互）
    pub fn prepare_items(&self, items: &mut [LineItem]) -> Result<SavePreparation, PlanError> {
        for row in items.iter_mut() {
            apply_quantity_change(row, &self.rules);
        }
        validation::prepare(items, &self.min_amount, &self.rules)
    }

    pub fn validate_range(&self, range: Option<&QuantityRange>, unit: &str, label: &str) -> Result<(), PlanError> {
        let unit = normalize_unit(unit)?;
        product_rules::validate_range_by_unit_step(range, &unit, label, &self.rules)
    }

    pub fn total_amount(&self, items: &[LineItem]) -> BigDecimal {
        sum_amounts(items.iter().map(|item| &item.amount))
    }

    /// 构建保存请求体：数值转十进制字符串，避免传输中的浮点漂移
    pub fn build_payload(&self, items: &[LineItem]) -> PlanSavePayload {
        let total_amount = format_money(&self.total_amount(items));
        let items = items
            .iter()
            .map(|row| SavePayloadItem {
                product_id: row.product_id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
                category_id: row.category_id.as_ref().map(|id| id.to_string()),
                category_name: row.category_name.clone(),
                name: row.name.clone(),
                unit: row.unit.clone(),
                price: format_money(&row.price),
                quantity: bankers_round(&row.quantity, self.rules.precision_for_unit(&row.unit)).to_string(),
                amount: bankers_round(&row.amount, MONEY_PRECISION).to_string(),
            })
            .collect();
        PlanSavePayload { items, total_amount }
    }
}
