//! 保存前校验流水线
//!
//! 1. 空计划检查
//! 2. 逐行必填检查（遇到第一处问题即失败）
//! 3. 最低金额自动修正
//! 4. 有修正时交由用户确认，拒绝则整个保存取消
//!
//! 确认步骤拆成两段：`prepare` 只做 1-3 并返回是否需要确认，
//! 调用方确认后再提交，流水线内部不阻塞。

use super::min_amount::adjust_to_floor;
use super::unit_rules::UnitRules;
use crate::error::{PlanError, RowField};
use crate::models::LineItem;
use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;
use std::future::Future;

/// 自动修正提示 (非错误，需用户确认)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentNotice {
    pub adjusted_names: Vec<String>,
    pub floor: BigDecimal,
}

impl AdjustmentNotice {
    pub const TITLE: &'static str = "金额已调整";
    pub const CONFIRM_TEXT: &'static str = "继续保存";
    pub const CANCEL_TEXT: &'static str = "取消";

    pub fn message(&self) -> String {
        format!(
            "以下产品金额低于 {} 元，已自动调整到不少于 {} 元：\n{}",
            self.floor,
            self.floor,
            self.adjusted_names.join("、")
        )
    }
}

/// 第一阶段结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavePreparation {
    pub needs_confirmation: bool,
    pub adjusted_names: Vec<String>,
}

impl SavePreparation {
    pub fn notice(&self, floor: &BigDecimal) -> Option<AdjustmentNotice> {
        self.needs_confirmation.then(|| AdjustmentNotice {
            adjusted_names: self.adjusted_names.clone(),
            floor: floor.clone(),
        })
    }
}

/// 确认弹窗等外部交互面
pub trait ConfirmationGate {
    /// 用户选择"继续保存"返回 true，"取消"返回 false
    fn confirm(&self, notice: &AdjustmentNotice) -> impl Future<Output = bool> + Send;
}

/// 空计划与逐行必填检查
pub fn check_rows(items: &[LineItem]) -> Result<(), PlanError> {
    if items.is_empty() {
        return Err(PlanError::EmptyPlan);
    }

    for (index, row) in items.iter().enumerate() {
        let field = if row.product_id.is_none() {
            Some(RowField::Product)
        } else if row.name.trim().is_empty() {
            Some(RowField::Name)
        } else if row.unit.trim().is_empty() {
            Some(RowField::Unit)
        } else if row.price < BigDecimal::zero() {
            Some(RowField::Price)
        } else {
            None
        };

        if let Some(field) = field {
            return Err(PlanError::Structural { row: index + 1, field });
        }
    }

    Ok(())
}

/// 对每行执行最低金额修正，返回被调整行的展示名称
pub fn apply_min_amount(items: &mut [LineItem], floor: &BigDecimal, rules: &UnitRules) -> Vec<String> {
    let mut adjusted = Vec::new();
    for (index, row) in items.iter_mut().enumerate() {
        if adjust_to_floor(row, floor, rules) {
            tracing::debug!(
                "第 {} 行金额低于下限, 数量调整为 {} {}",
                index + 1,
                row.quantity,
                row.unit
            );
            adjusted.push(row.display_name(index + 1));
        }
    }
    adjusted
}

/// 第一阶段：校验并修正，不做任何交互
pub fn prepare(items: &mut [LineItem], floor: &BigDecimal, rules: &UnitRules) -> Result<SavePreparation, PlanError> {
    check_rows(items)?;
    let adjusted_names = apply_min_amount(items, floor, rules);
    if !adjusted_names.is_empty() {
        tracing::warn!("{} 行金额低于 {} 元已自动调整: {:?}", adjusted_names.len(), floor, adjusted_names);
    }
    Ok(SavePreparation {
        needs_confirmation: !adjusted_names.is_empty(),
        adjusted_names,
    })
}

/// 完整流水线：有修正时等待确认，拒绝时返回 `SaveCancelled`
///
/// 成功时返回被修正的行名称（可能为空）。
pub async fn validate_before_save<G>(
    items: &mut [LineItem],
    floor: &BigDecimal,
    rules: &UnitRules,
    gate: &G,
) -> Result<Vec<String>, PlanError>
where
    G: ConfirmationGate,
{
    let preparation = prepare(items, floor, rules)?;
    if let Some(notice) = preparation.notice(floor) {
        if !gate.confirm(&notice).await {
            tracing::info!("用户取消保存 (金额调整未确认)");
            return Err(PlanError::SaveCancelled);
        }
    }
    Ok(preparation.adjusted_names)
}
