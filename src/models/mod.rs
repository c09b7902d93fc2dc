pub mod catalog;
pub mod decimal;
pub mod id;
pub mod line_item;
pub mod plan;

pub use catalog::{Category, CategoryIndex, Page, Product, PurchaseMode, QuantityRange, UnitRuleList};
pub use id::EntityId;
pub use line_item::LineItem;
pub use plan::{parse_timestamp, PlanHeader, PlanRecord, PlanSavePayload, SavePayloadItem};
