//! 外部协作方边界：产品/品类/单位规则/计划数据源

pub mod memory;

pub use memory::MemoryBackend;

use crate::error::SourceError;
use crate::models::{Category, Page, PlanRecord, PlanSavePayload, Product, UnitRuleList};
use chrono::NaiveDate;
use std::future::Future;

/// 产品、品类与单位规则数据源
pub trait CatalogSource {
    /// 分页拉取启用中的产品，`page` 从 1 开始
    fn fetch_product_page(
        &self,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<Page<Product>, SourceError>> + Send;

    /// 全部品类（含停用）
    fn fetch_categories(&self) -> impl Future<Output = Result<Vec<Category>, SourceError>> + Send;

    fn fetch_unit_rules(&self) -> impl Future<Output = Result<UnitRuleList, SourceError>> + Send;
}

/// 采购计划数据源
pub trait PlanSource {
    fn fetch_plan(&self, date: NaiveDate) -> impl Future<Output = Result<PlanRecord, SourceError>> + Send;

    /// 单次保存要么全部生效要么不生效
    fn save_plan(
        &self,
        date: NaiveDate,
        payload: &PlanSavePayload,
    ) -> impl Future<Output = Result<(), SourceError>> + Send;
}

/// 分页拉取全部产品：累计数达到总数或遇到不满一页时停止
pub async fn fetch_all_products<S>(source: &S, page_size: u32) -> Result<Vec<Product>, SourceError>
where
    S: CatalogSource + Sync,
{
    let page_size = page_size.max(1);
    let mut collected: Vec<Product> = Vec::new();
    let mut page = 1;
    loop {
        let data = source.fetch_product_page(page, page_size).await?;
        let fetched = data.items.len();
        collected.extend(data.items);
        tracing::debug!("产品分页 {} 拉取 {} 条, 累计 {}/{}", page, fetched, collected.len(), data.total);
        if collected.len() >= data.total || fetched < page_size as usize {
            break;
        }
        page += 1;
    }
    Ok(collected)
}
