use crate::models::{EntityId, LineItem};
use serde::Serialize;

/// 重复选择产品的提示 (非致命，行会被自动还原)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateProductWarning {
    pub product_id: EntityId,
    /// 被还原的行 (1 起始)
    pub row: usize,
    /// 已持有该产品的行 (1 起始)
    pub existing_row: usize,
}

impl DuplicateProductWarning {
    pub fn message(&self) -> &'static str {
        "该产品已在明细中，请勿重复选择"
    }
}

/// 查找除 `row_index` 外已引用 `product_id` 的行
pub fn find_duplicate(items: &[LineItem], row_index: usize, product_id: &EntityId) -> Option<usize> {
    items
        .iter()
        .enumerate()
        .find(|(index, item)| *index != row_index && item.product_id.as_ref() == Some(product_id))
        .map(|(index, _)| index)
}

/// 明细中的产品ID是否互不相同
pub fn has_unique_products(items: &[LineItem]) -> bool {
    let mut seen = std::collections::HashSet::new();
    items
        .iter()
        .filter_map(|item| item.product_id.as_ref())
        .all(|id| seen.insert(id))
}
