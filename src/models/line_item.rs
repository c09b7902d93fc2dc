use super::decimal;
use super::EntityId;
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// 采购计划明细行 (编辑会话内存态)
///
/// `amount` 总是 `price * quantity` 的舍入结果，不单独编辑。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, deserialize_with = "deserialize_product_id")]
    pub product_id: Option<EntityId>,
    #[serde(default)]
    pub category_id: Option<EntityId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "decimal::lenient")]
    pub price: BigDecimal,
    #[serde(default, deserialize_with = "decimal::lenient")]
    pub quantity: BigDecimal,
    #[serde(default, deserialize_with = "decimal::lenient")]
    pub amount: BigDecimal,
}

/// 空串/null 的产品ID视为未选择
fn deserialize_product_id<'de, D>(deserializer: D) -> Result<Option<EntityId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let id = Option::<EntityId>::deserialize(deserializer)?;
    Ok(id.filter(|id| !id.is_empty()))
}

impl LineItem {
    /// 新增行时的空行
    pub fn empty() -> Self {
        Self {
            product_id: None,
            category_id: None,
            category_name: None,
            name: String::new(),
            unit: String::new(),
            price: BigDecimal::zero(),
            quantity: BigDecimal::zero(),
            amount: BigDecimal::zero(),
        }
    }

    /// 重复选择产品时把行还原为空行
    pub fn reset(&mut self) {
        *self = Self::empty();
    }

    /// 展示名称；名称为空时用 `第N行` 占位 (`row` 为 1 起始)
    pub fn display_name(&self, row: usize) -> String {
        if self.name.is_empty() {
            format!("第{}行", row)
        } else {
            self.name.clone()
        }
    }
}

impl Default for LineItem {
    fn default() -> Self {
        Self::empty()
    }
}
