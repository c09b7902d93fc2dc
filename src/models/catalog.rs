use super::decimal;
use super::EntityId;
use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 品类采购周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum PurchaseMode {
    Daily,
    Periodic,
    /// 未配置或无法识别
    #[default]
    Unset,
}

impl From<Option<String>> for PurchaseMode {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref().map(str::trim) {
            Some("daily") => Self::Daily,
            Some("periodic") => Self::Periodic,
            _ => Self::Unset,
        }
    }
}

impl From<PurchaseMode> for String {
    fn from(mode: PurchaseMode) -> Self {
        mode.as_str().to_string()
    }
}

impl PurchaseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Periodic => "periodic",
            Self::Unset => "",
        }
    }
}

/// 品类 (只读参考数据，含停用品类)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub purchase_mode: PurchaseMode,
}

/// 单品采购数量范围
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityRange {
    #[serde(deserialize_with = "decimal::lenient")]
    pub min: BigDecimal,
    #[serde(deserialize_with = "decimal::lenient")]
    pub max: BigDecimal,
}

/// 产品 (只读参考数据，选中后复制到明细行)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<EntityId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "decimal::lenient")]
    pub base_price: BigDecimal,
    #[serde(default)]
    pub item_quantity_range: Option<QuantityRange>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// 分页结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// 单位规则源返回的可分割单位清单
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitRuleList {
    #[serde(default)]
    pub splittable_units: Vec<String>,
}

/// 品类缓存 - 按ID查找采购周期
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    categories: IndexMap<EntityId, Category>,
}

impl CategoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_categories(categories: Vec<Category>) -> Self {
        let categories = categories
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        Self { categories }
    }

    pub fn get(&self, id: &EntityId) -> Option<&Category> {
        self.categories.get(id)
    }

    /// 行所属品类的采购周期；缺少品类或品类未配置时为 `Unset`
    pub fn purchase_mode(&self, id: Option<&EntityId>) -> PurchaseMode {
        id.and_then(|id| self.get(id))
            .map(|c| c.purchase_mode)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn clear(&mut self) {
        self.categories.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_mode_tolerates_missing_and_unknown() {
        let json = r#"[
            {"id": 1, "name": "蔬菜", "purchase_mode": "daily"},
            {"id": "2", "name": "调料", "purchase_mode": "periodic"},
            {"id": "3", "name": "杂项", "purchase_mode": null},
            {"id": "4", "name": "其他"}
        ]"#;
        let categories: Vec<Category> = serde_json::from_str(json).unwrap();
        let index = CategoryIndex::from_categories(categories);

        assert_eq!(index.purchase_mode(Some(&"1".into())), PurchaseMode::Daily);
        assert_eq!(index.purchase_mode(Some(&"2".into())), PurchaseMode::Periodic);
        assert_eq!(index.purchase_mode(Some(&"3".into())), PurchaseMode::Unset);
        assert_eq!(index.purchase_mode(Some(&"4".into())), PurchaseMode::Unset);
        assert_eq!(index.purchase_mode(Some(&"missing".into())), PurchaseMode::Unset);
        assert_eq!(index.purchase_mode(None), PurchaseMode::Unset);
    }

    #[test]
    fn product_defaults_to_active_with_lenient_price() {
        let product: Product =
            serde_json::from_str(r#"{"id": 7, "name": "土豆", "unit": "斤", "base_price": 1.2}"#)
                .unwrap();
        assert!(product.is_active);
        assert_eq!(product.id.as_str(), "7");
        assert_eq!(product.base_price, "1.2".parse::<BigDecimal>().unwrap());
    }
}
