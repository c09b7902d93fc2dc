use super::duplicate_guard::{find_duplicate, has_unique_products, DuplicateProductWarning};
use super::pricing::PricingService;
use super::quantity::{apply_product, apply_quantity_change};
use super::rounding::sum_amounts;
use super::sorting::{sort_items, SortSpec};
use super::unit_rules::UnitRules;
use super::validation::{self, ConfirmationGate, SavePreparation};
use crate::config::PricingConfig;
use crate::error::{PlanError, SourceError};
use crate::models::{CategoryIndex, EntityId, LineItem, PlanHeader, Product, PurchaseMode};
use crate::source::{fetch_all_products, CatalogSource, PlanSource};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;

/// 行内选择产品的结果
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// 空选择，不做处理
    Ignored,
    Applied,
    /// 产品不在缓存中，行保持不变
    UnknownProduct,
    /// 重复选择，行已被还原为空行
    Duplicate(DuplicateProductWarning),
}

/// 单个日期的采购计划编辑会话
///
/// 产品/品类缓存归会话所有，只在首次加载或显式 `reload` 时拉取。
/// 所有修改都是单写者顺序执行；唯一的挂起点是保存前的用户确认。
pub struct PlanEditor<B> {
    backend: B,
    date: NaiveDate,
    pricing: PricingService,
    default_rules: UnitRules,
    product_page_size: u32,
    plan: Option<PlanHeader>,
    items: Vec<LineItem>,
    products: IndexMap<EntityId, Product>,
    categories: CategoryIndex,
    dirty: bool,
    prepared: bool,
    last_saved_at: Option<DateTime<Utc>>,
    sort: Option<SortSpec>,
}

impl<B> PlanEditor<B>
where
    B: CatalogSource + PlanSource + Sync,
{
    pub fn new(backend: B, date: NaiveDate, config: &PricingConfig) -> Self {
        let pricing = PricingService::from_config(config);
        Self {
            backend,
            date,
            default_rules: pricing.rules().clone(),
            pricing,
            product_page_size: config.product_page_size,
            plan: None,
            items: Vec::new(),
            products: IndexMap::new(),
            categories: CategoryIndex::new(),
            dirty: false,
            prepared: false,
            last_saved_at: None,
            sort: None,
        }
    }

    /// 并发拉取计划、产品、品类与单位规则
    pub async fn load(&mut self) -> Result<(), PlanError> {
        let backend = &self.backend;
        let date = self.date;
        let page_size = self.product_page_size;
        let need_products = self.products.is_empty();
        let need_categories = self.categories.is_empty();

        let (record, products, categories, unit_rules) = futures::try_join!(
            backend.fetch_plan(date),
            async {
                if need_products {
                    fetch_all_products(backend, page_size).await.map(Some)
                } else {
                    Ok(None)
                }
            },
            async {
                if need_categories {
                    backend.fetch_categories().await.map(Some)
                } else {
                    Ok(None)
                }
            },
            async {
                // 单位规则不可用时回落到内置清单，不阻断加载
                match backend.fetch_unit_rules().await {
                    Ok(list) => Ok(Some(list)),
                    Err(e) => {
                        tracing::warn!("单位规则拉取失败, 使用内置清单: {}", e);
                        Ok::<_, SourceError>(None)
                    }
                }
            },
        )?;

        if let Some(products) = products {
            self.products = products.into_iter().map(|p| (p.id.clone(), p)).collect();
        }
        if let Some(categories) = categories {
            self.categories = CategoryIndex::from_categories(categories);
        }
        let rules = match unit_rules {
            Some(list) if !list.splittable_units.is_empty() => UnitRules::from_units(&list.splittable_units),
            _ => self.default_rules.clone(),
        };
        self.pricing.set_rules(rules);

        let last_saved_at = record.updated_at_timestamp();
        let mut items = record.items;
        for row in items.iter_mut() {
            apply_quantity_change(row, self.pricing.rules());
        }
        let header_items = self.pricing.build_payload(&items).items;
        self.items = items;
        self.plan = Some(PlanHeader {
            date: record.date,
            total_amount: record.total_amount.clone(),
            items: header_items,
        });
        self.dirty = false;
        self.prepared = false;
        self.last_saved_at = last_saved_at;
        self.restore_sort();
        if self.has_duplicate_products() {
            tracing::warn!("计划 {} 的明细中存在重复产品, 保存前请删除重复行", self.date);
        }

        tracing::info!(
            "计划 {} 加载完成: {} 条明细, 产品缓存 {}, 品类缓存 {}",
            self.date,
            self.items.len(),
            self.products.len(),
            self.categories.len()
        );
        Ok(())
    }

    /// 显式失效缓存后重新加载
    pub async fn reload(&mut self) -> Result<(), PlanError> {
        self.products.clear();
        self.categories.clear();
        self.load().await
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn plan(&self) -> Option<&PlanHeader> {
        self.plan.as_ref()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn categories(&self) -> &CategoryIndex {
        &self.categories
    }

    pub fn pricing(&self) -> &PricingService {
        &self.pricing
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    /// 历史数据可能带入重复产品；行内选择不会再产生新的重复
    pub fn has_duplicate_products(&self) -> bool {
        !has_unique_products(&self.items)
    }

    pub fn sort_spec(&self) -> Option<SortSpec> {
        self.sort
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.prepared = false;
    }

    /// 在表头新增一行空数据
    pub fn add_row(&mut self) {
        self.items.insert(0, LineItem::empty());
        self.touch();
    }

    pub fn remove_row(&mut self, index: usize) -> Result<LineItem, PlanError> {
        if index >= self.items.len() {
            return Err(PlanError::RowOutOfRange(index + 1));
        }
        let removed = self.items.remove(index);
        self.touch();
        Ok(removed)
    }

    /// 写入原始数量并立即量化
    pub fn update_quantity(&mut self, index: usize, raw: BigDecimal) -> Result<(), PlanError> {
        self.items
            .get_mut(index)
            .ok_or(PlanError::RowOutOfRange(index + 1))?
            .quantity = raw;
        self.on_quantity_blur(index)
    }

    /// 数量输入失焦：量化并重算金额
    pub fn on_quantity_blur(&mut self, index: usize) -> Result<(), PlanError> {
        let row = self
            .items
            .get_mut(index)
            .ok_or(PlanError::RowOutOfRange(index + 1))?;
        apply_quantity_change(row, self.pricing.rules());
        self.touch();
        Ok(())
    }

    /// 行内切换产品，包含去重拦截
    pub fn on_product_selected(&mut self, index: usize, product_id: &str) -> Result<SelectionOutcome, PlanError> {
        let Some(product_id) = EntityId::parse_optional(product_id) else {
            return Ok(SelectionOutcome::Ignored);
        };
        if index >= self.items.len() {
            return Err(PlanError::RowOutOfRange(index + 1));
        }

        if let Some(existing) = find_duplicate(&self.items, index, &product_id) {
            tracing::warn!(
                "产品 {} 已在第 {} 行, 第 {} 行选择被还原",
                product_id,
                existing + 1,
                index + 1
            );
            self.items[index].reset();
            self.touch();
            return Ok(SelectionOutcome::Duplicate(DuplicateProductWarning {
                product_id,
                row: index + 1,
                existing_row: existing + 1,
            }));
        }

        let Some(product) = self.products.get(&product_id) else {
            tracing::debug!("产品 {} 不在缓存中, 忽略选择", product_id);
            return Ok(SelectionOutcome::UnknownProduct);
        };
        apply_product(&mut self.items[index], product, self.pricing.rules());
        self.touch();
        Ok(SelectionOutcome::Applied)
    }

    /// 设置排序；`None` 取消排序并保留当前顺序
    pub fn sort_by(&mut self, spec: Option<SortSpec>) {
        self.sort = spec;
        self.restore_sort();
    }

    fn restore_sort(&mut self) {
        if let Some(spec) = &self.sort {
            self.items = sort_items(&self.items, spec, &self.categories);
        }
    }

    pub fn total_amount(&self) -> BigDecimal {
        self.pricing.total_amount(&self.items)
    }

    /// 按采购周期汇总：无品类或未配置的行计入每日
    fn amount_where(&self, periodic: bool) -> BigDecimal {
        sum_amounts(
            self.items
                .iter()
                .filter(|item| {
                    let mode = self.categories.purchase_mode(item.category_id.as_ref());
                    (mode == PurchaseMode::Periodic) == periodic
                })
                .map(|item| &item.amount),
        )
    }

    pub fn daily_amount(&self) -> BigDecimal {
        self.amount_where(false)
    }

    pub fn periodic_amount(&self) -> BigDecimal {
        self.amount_where(true)
    }

    pub fn quantity_rule_tooltip(&self) -> String {
        self.pricing.rules().quantity_rule_tooltip()
    }

    /// 保存第一阶段：校验并自动修正，返回是否需要用户确认
    pub fn prepare_save(&mut self) -> Result<SavePreparation, PlanError> {
        if self.plan.is_none() {
            return Err(PlanError::PlanNotLoaded);
        }
        self.prepared = false;
        let preparation = validation::prepare(&mut self.items, self.pricing.min_amount(), self.pricing.rules())?;
        if preparation.needs_confirmation {
            self.dirty = true;
        }
        self.prepared = true;
        Ok(preparation)
    }

    /// 保存第二阶段：提交到计划源
    ///
    /// 提交失败时编辑状态保持不变，可直接重试。
    pub async fn commit_save(&mut self) -> Result<(), PlanError> {
        let Some(date) = self.plan.as_ref().map(|plan| plan.date) else {
            return Err(PlanError::PlanNotLoaded);
        };
        if !self.prepared {
            return Err(PlanError::NotPrepared);
        }

        let payload = self.pricing.build_payload(&self.items);
        if let Err(e) = self.backend.save_plan(date, &payload).await {
            tracing::error!("计划 {} 保存失败: {}", date, e);
            return Err(e.into());
        }

        let total_amount = self.total_amount();
        if let Some(plan) = self.plan.as_mut() {
            plan.total_amount = total_amount;
            plan.items = payload.items;
        }
        self.dirty = false;
        self.prepared = false;
        self.last_saved_at = Some(Utc::now());
        tracing::info!("计划 {} 已保存, 总金额 {}", date, payload.total_amount);
        Ok(())
    }

    /// 完整保存流程：校验 -> (需要时) 确认 -> 提交
    ///
    /// 返回被自动修正的行名称。用户取消时返回 `SaveCancelled`，不提交任何内容。
    pub async fn save<G>(&mut self, gate: &G) -> Result<Vec<String>, PlanError>
    where
        G: ConfirmationGate,
    {
        let preparation = self.prepare_save()?;
        if let Some(notice) = preparation.notice(self.pricing.min_amount()) {
            if !gate.confirm(&notice).await {
                self.prepared = false;
                tracing::info!("计划 {} 保存已取消", self.date);
                return Err(PlanError::SaveCancelled);
            }
        }
        self.commit_save().await?;
        Ok(preparation.adjusted_names)
    }
}
