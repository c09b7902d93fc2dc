use bigdecimal::BigDecimal;
use std::fmt;
use thiserror::Error;

/// 单位输入错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("单位不能为空")]
    Empty,
    /// 含英文字母但不在别名表中，保留原始输入
    #[error("单位英文未识别，请使用中文单位")]
    UnrecognizedLatin(String),
}

impl UnitError {
    /// 出错时的原始输入（已去首尾空白）
    pub fn raw_value(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::UnrecognizedLatin(raw) => raw,
        }
    }
}

/// 明细行必填字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Product,
    Name,
    Unit,
    Price,
}

impl fmt::Display for RowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Product => "请选择产品",
            Self::Name => "产品名称不能为空",
            Self::Unit => "单位不能为空",
            Self::Price => "单价无效",
        };
        f.write_str(text)
    }
}

/// 外部数据源错误（拉取/保存失败）
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Source unavailable: {0}")]
    Unavailable(String),
    #[error("Rejected by server: {0}")]
    Rejected(String),
}

/// 采购计划编辑错误
///
/// 全部为可恢复错误：调用方重新渲染表单即可，行数据不会丢弃。
#[derive(Debug, Clone, Error)]
pub enum PlanError {
    #[error("请至少保留一条明细")]
    EmptyPlan,

    /// `row` 为 1 起始的行号
    #[error("第 {row} 行{field}")]
    Structural { row: usize, field: RowField },

    #[error("{label}需符合单位步进 {step}")]
    RangeStep { label: String, step: BigDecimal },

    #[error("{label}请同时填写最小值与最大值，或全部留空")]
    IncompleteRange { label: String },

    #[error("{label}最小值不能大于最大值")]
    InvertedRange { label: String },

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error("第 {0} 行不存在")]
    RowOutOfRange(usize),

    #[error("计划尚未加载")]
    PlanNotLoaded,

    #[error("保存前需要先完成校验")]
    NotPrepared,

    #[error("保存已取消")]
    SaveCancelled,

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl PlanError {
    /// 是否为保存前校验类错误（空计划、必填缺失、步进不符）
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyPlan
                | Self::Structural { .. }
                | Self::RangeStep { .. }
                | Self::IncompleteRange { .. }
                | Self::InvertedRange { .. }
                | Self::Unit(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_message_uses_one_based_row() {
        let err = PlanError::Structural { row: 3, field: RowField::Unit };
        assert_eq!(err.to_string(), "第 3 行单位不能为空");
    }

    #[test]
    fn range_step_message_shows_step() {
        let err = PlanError::RangeStep {
            label: "单品数量范围".to_string(),
            step: "0.1".parse().unwrap(),
        };
        assert_eq!(err.to_string(), "单品数量范围需符合单位步进 0.1");
        assert!(err.is_validation());
    }

    #[test]
    fn source_errors_are_not_validation() {
        let err = PlanError::from(SourceError::Unavailable("timeout".into()));
        assert!(!err.is_validation());
    }
}
