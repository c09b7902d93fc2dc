pub mod duplicate_guard;
pub mod editor;
pub mod min_amount;
pub mod pricing;
pub mod product_rules;
pub mod quantity;
pub mod rounding;
pub mod sorting;
pub mod unit_rules;
pub mod validation;

pub use editor::{PlanEditor, SelectionOutcome};
pub use pricing::{PricingService, QuotedLine};
pub use sorting::{SortColumn, SortDirection, SortSpec};
pub use unit_rules::{normalize_unit, UnitRules, UnitStepRule};
pub use validation::{AdjustmentNotice, ConfirmationGate, SavePreparation};
