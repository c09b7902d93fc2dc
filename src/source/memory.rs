use super::{CatalogSource, PlanSource};
use crate::error::SourceError;
use crate::models::{
    Category, EntityId, LineItem, Page, PlanRecord, PlanSavePayload, Product, UnitRuleList,
};
use crate::service::rounding::parse_decimal;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, SecondsFormat, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// 进程内数据源：计划表为并发安全的 DashMap，可注入保存失败
#[derive(Debug, Default)]
pub struct MemoryBackend {
    products: Vec<Product>,
    categories: Vec<Category>,
    splittable_units: Vec<String>,
    plans: DashMap<NaiveDate, PlanRecord>,
    saved: DashMap<NaiveDate, PlanSavePayload>,
    save_calls: AtomicUsize,
    product_page_calls: AtomicUsize,
    category_calls: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_unit_rules(mut self, units: Vec<String>) -> Self {
        self.splittable_units = units;
        self
    }

    pub fn with_plan(self, plan: PlanRecord) -> Self {
        self.plans.insert(plan.date, plan);
        self
    }

    /// 之后的保存请求全部失败（模拟网络错误）
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn product_page_calls(&self) -> usize {
        self.product_page_calls.load(Ordering::SeqCst)
    }

    pub fn category_calls(&self) -> usize {
        self.category_calls.load(Ordering::SeqCst)
    }

    pub fn saved_payload(&self, date: NaiveDate) -> Option<PlanSavePayload> {
        self.saved.get(&date).map(|entry| entry.value().clone())
    }

    fn payload_to_record(date: NaiveDate, payload: &PlanSavePayload) -> PlanRecord {
        let decimal = |raw: &str| parse_decimal(raw).unwrap_or_else(|| BigDecimal::from(0));
        let items = payload
            .items
            .iter()
            .map(|item| LineItem {
                product_id: EntityId::parse_optional(&item.product_id),
                category_id: item.category_id.as_deref().and_then(EntityId::parse_optional),
                category_name: item.category_name.clone(),
                name: item.name.clone(),
                unit: item.unit.clone(),
                price: decimal(&item.price),
                quantity: decimal(&item.quantity),
                amount: decimal(&item.amount),
            })
            .collect();
        PlanRecord {
            date,
            total_amount: decimal(&payload.total_amount),
            items,
            updated_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

impl CatalogSource for MemoryBackend {
    async fn fetch_product_page(&self, page: u32, page_size: u32) -> Result<Page<Product>, SourceError> {
        self.product_page_calls.fetch_add(1, Ordering::SeqCst);
        let active: Vec<&Product> = self.products.iter().filter(|p| p.is_active).collect();
        let start = (page.saturating_sub(1) as usize).saturating_mul(page_size as usize);
        let items = active
            .iter()
            .skip(start)
            .take(page_size as usize)
            .map(|p| (*p).clone())
            .collect();
        Ok(Page {
            items,
            total: active.len(),
        })
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, SourceError> {
        self.category_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.categories.clone())
    }

    async fn fetch_unit_rules(&self) -> Result<UnitRuleList, SourceError> {
        Ok(UnitRuleList {
            splittable_units: self.splittable_units.clone(),
        })
    }
}

impl PlanSource for MemoryBackend {
    async fn fetch_plan(&self, date: NaiveDate) -> Result<PlanRecord, SourceError> {
        self.plans
            .get(&date)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SourceError::NotFound(format!("plan {}", date)))
    }

    async fn save_plan(&self, date: NaiveDate, payload: &PlanSavePayload) -> Result<(), SourceError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("save rejected by transport".to_string()));
        }
        self.plans.insert(date, Self::payload_to_record(date, payload));
        self.saved.insert(date, payload.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::fetch_all_products;

    fn product(id: usize, active: bool) -> Product {
        Product {
            id: EntityId::new(id.to_string()),
            name: format!("产品{id}"),
            category_id: None,
            category_name: None,
            unit: "份".into(),
            base_price: BigDecimal::from(1),
            item_quantity_range: None,
            is_active: active,
        }
    }

    #[tokio::test]
    async fn pages_until_all_active_products_collected() {
        let products = (1..=7).map(|i| product(i, i != 4)).collect();
        let backend = MemoryBackend::new().with_products(products);
        let all = fetch_all_products(&backend, 2).await.unwrap();
        assert_eq!(all.len(), 6);
        assert!(all.iter().all(|p| p.id.as_str() != "4"));
        assert_eq!(backend.product_page_calls(), 3);
    }

    #[tokio::test]
    async fn failed_save_changes_nothing() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let backend = MemoryBackend::new();
        backend.set_fail_saves(true);
        let payload = PlanSavePayload {
            items: vec![],
            total_amount: "0.00".into(),
        };
        assert!(backend.save_plan(date, &payload).await.is_err());
        assert!(backend.saved_payload(date).is_none());
        assert!(backend.fetch_plan(date).await.is_err());
        assert_eq!(backend.save_calls(), 1);
    }
}
