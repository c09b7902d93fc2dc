//! 明细排序：数值列按数值、文本列按中文拼音、采购周期按权重
//!
//! 排序稳定，相等元素保持原有相对顺序。

use crate::models::{CategoryIndex, LineItem, PurchaseMode};
use pinyin::ToPinyin;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Price,
    Quantity,
    Amount,
    CategoryName,
    PurchaseMode,
    Unit,
    /// 默认列
    Name,
}

impl SortColumn {
    /// 表格列属性名 -> 排序列；未知列按名称排序
    pub fn from_prop(prop: &str) -> Self {
        match prop {
            "price" => Self::Price,
            "quantity" => Self::Quantity,
            "amount" => Self::Amount,
            "category_name" => Self::CategoryName,
            "purchase_mode" => Self::PurchaseMode,
            "unit" => Self::Unit,
            _ => Self::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// 表格组件的 `{prop, order}`；任一为空表示取消排序
    pub fn from_table(prop: &str, order: &str) -> Option<Self> {
        if prop.is_empty() {
            return None;
        }
        let direction = match order {
            "ascending" => SortDirection::Ascending,
            "descending" => SortDirection::Descending,
            _ => return None,
        };
        Some(Self::new(SortColumn::from_prop(prop), direction))
    }
}

/// 采购周期排序权重：每日 < 定期 < 其他
pub fn purchase_mode_rank(mode: PurchaseMode) -> u8 {
    match mode {
        PurchaseMode::Daily => 1,
        PurchaseMode::Periodic => 2,
        PurchaseMode::Unset => 99,
    }
}

/// 一级比较：汉字按拼音、其他字符忽略大小写
fn compare_char(left: char, right: char) -> Ordering {
    match (left.to_pinyin(), right.to_pinyin()) {
        (Some(l), Some(r)) => l.plain().cmp(r.plain()),
        // 汉字排在非汉字之后
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => left.to_lowercase().cmp(right.to_lowercase()),
    }
}

fn compare_primary(left: &str, right: &str) -> Ordering {
    let mut l = left.chars();
    let mut r = right.chars();
    loop {
        match (l.next(), r.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) => match compare_char(a, b) {
                Ordering::Equal => continue,
                other => return other,
            },
        }
    }
}

/// 中文文本比较 (按拼音)
///
/// 整串一级相等后才区分大小写 (小写在前) 与同音字。
pub fn compare_text(left: &str, right: &str) -> Ordering {
    compare_primary(left, right).then_with(|| {
        let key = |c: char| (c.is_uppercase(), c);
        left.chars().map(key).cmp(right.chars().map(key))
    })
}

fn compare_rows(a: &LineItem, b: &LineItem, column: SortColumn, categories: &CategoryIndex) -> Ordering {
    match column {
        SortColumn::Price => a.price.cmp(&b.price),
        SortColumn::Quantity => a.quantity.cmp(&b.quantity),
        SortColumn::Amount => a.amount.cmp(&b.amount),
        SortColumn::PurchaseMode => {
            let left = purchase_mode_rank(categories.purchase_mode(a.category_id.as_ref()));
            let right = purchase_mode_rank(categories.purchase_mode(b.category_id.as_ref()));
            left.cmp(&right)
        }
        SortColumn::CategoryName => compare_text(
            a.category_name.as_deref().unwrap_or_default(),
            b.category_name.as_deref().unwrap_or_default(),
        ),
        SortColumn::Unit => compare_text(&a.unit, &b.unit),
        SortColumn::Name => compare_text(&a.name, &b.name),
    }
}

/// 返回排好序的新列表，不修改入参
pub fn sort_items(items: &[LineItem], spec: &SortSpec, categories: &CategoryIndex) -> Vec<LineItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| spec.direction.apply(compare_rows(a, b, spec.column, categories)));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, EntityId};
    use bigdecimal::BigDecimal;

    fn item(name: &str, category: Option<&str>, price: &str) -> LineItem {
        LineItem {
            name: name.into(),
            category_id: category.map(EntityId::new),
            category_name: category.map(|c| format!("品类{c}")),
            price: price.parse::<BigDecimal>().unwrap(),
            ..LineItem::empty()
        }
    }

    fn categories() -> CategoryIndex {
        let raw = r#"[
            {"id": "d", "name": "蔬菜", "purchase_mode": "daily"},
            {"id": "p", "name": "调料", "purchase_mode": "periodic"},
            {"id": "x", "name": "其他", "purchase_mode": ""}
        ]"#;
        CategoryIndex::from_categories(serde_json::from_str::<Vec<Category>>(raw).unwrap())
    }

    fn names(items: &[LineItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn purchase_mode_rank_groups_stably() {
        let items = vec![
            item("a", Some("x"), "1"),
            item("b", Some("p"), "1"),
            item("c", Some("d"), "1"),
            item("d", None, "1"),
            item("e", Some("p"), "1"),
            item("f", Some("d"), "1"),
        ];
        let spec = SortSpec::new(SortColumn::PurchaseMode, SortDirection::Ascending);
        let sorted = sort_items(&items, &spec, &categories());
        assert_eq!(names(&sorted), vec!["c", "f", "b", "e", "a", "d"]);
        // 入参未被修改
        assert_eq!(names(&items), vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn descending_numeric_keeps_ties_in_order() {
        let items = vec![
            item("a", None, "2"),
            item("b", None, "5"),
            item("c", None, "2"),
            item("d", None, "0.5"),
        ];
        let spec = SortSpec::new(SortColumn::Price, SortDirection::Descending);
        let sorted = sort_items(&items, &spec, &CategoryIndex::new());
        assert_eq!(names(&sorted), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn chinese_text_sorts_by_pinyin() {
        assert_eq!(compare_text("白菜", "菠菜"), Ordering::Less);
        assert_eq!(compare_text("菠菜", "土豆"), Ordering::Less);
        assert_eq!(compare_text("土豆", "土豆丝"), Ordering::Less);
        assert_eq!(compare_text("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_text("Zebra", "鸡蛋"), Ordering::Less);
        assert_eq!(compare_text("", ""), Ordering::Equal);
    }

    #[test]
    fn case_breaks_ties_only_after_whole_string() {
        assert_eq!(compare_text("aa", "Ab"), Ordering::Less);
        assert_eq!(compare_text("Ab", "aa"), Ordering::Greater);
        assert_eq!(compare_text("ab", "Ab"), Ordering::Less);
        assert_eq!(compare_text("Ab", "Ab"), Ordering::Equal);
    }

    #[test]
    fn name_column_sorts_both_directions() {
        let items = vec![
            item("土豆", None, "1"),
            item("Apple", None, "1"),
            item("白菜", None, "1"),
            item("apple", None, "1"),
        ];
        let asc = SortSpec::new(SortColumn::Name, SortDirection::Ascending);
        let sorted = sort_items(&items, &asc, &CategoryIndex::new());
        assert_eq!(names(&sorted), vec!["apple", "Apple", "白菜", "土豆"]);

        let desc = SortSpec::new(SortColumn::Name, SortDirection::Descending);
        let sorted = sort_items(&items, &desc, &CategoryIndex::new());
        assert_eq!(names(&sorted), vec!["土豆", "白菜", "Apple", "apple"]);
    }

    #[test]
    fn category_column_puts_missing_names_first_when_ascending() {
        let mut items = vec![
            item("a", Some("x"), "1"),
            item("b", None, "1"),
            item("c", Some("d"), "1"),
            item("d", None, "1"),
        ];
        items[0].category_name = Some("蔬菜".into());
        items[2].category_name = Some("粮油".into());

        let asc = SortSpec::new(SortColumn::CategoryName, SortDirection::Ascending);
        let sorted = sort_items(&items, &asc, &categories());
        assert_eq!(names(&sorted), vec!["b", "d", "c", "a"]);

        let desc = SortSpec::new(SortColumn::CategoryName, SortDirection::Descending);
        let sorted = sort_items(&items, &desc, &categories());
        assert_eq!(names(&sorted), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn table_sort_parsing() {
        assert_eq!(
            SortSpec::from_table("amount", "descending"),
            Some(SortSpec::new(SortColumn::Amount, SortDirection::Descending))
        );
        assert_eq!(
            SortSpec::from_table("whatever", "ascending").map(|s| s.column),
            Some(SortColumn::Name)
        );
        assert!(SortSpec::from_table("price", "").is_none());
        assert!(SortSpec::from_table("", "ascending").is_none());
    }
}
