//! 产品数量范围规则

use super::unit_rules::UnitRules;
use crate::error::PlanError;
use crate::models::QuantityRange;
use bigdecimal::BigDecimal;

/// 由表单的最小/最大值构造范围；两者都空表示不设范围
pub fn build_range(
    min: Option<BigDecimal>,
    max: Option<BigDecimal>,
    label: &str,
) -> Result<Option<QuantityRange>, PlanError> {
    match (min, max) {
        (None, None) => Ok(None),
        (Some(min), Some(max)) => {
            if min > max {
                return Err(PlanError::InvertedRange { label: label.to_string() });
            }
            Ok(Some(QuantityRange { min, max }))
        }
        _ => Err(PlanError::IncompleteRange { label: label.to_string() }),
    }
}

/// 范围上下限都必须是单位步进的整数倍
pub fn validate_range_by_unit_step(
    range: Option<&QuantityRange>,
    unit: &str,
    label: &str,
    rules: &UnitRules,
) -> Result<(), PlanError> {
    let Some(range) = range else {
        return Ok(());
    };
    if rules.is_multiple_of_step(&range.min, unit) && rules.is_multiple_of_step(&range.max, unit) {
        return Ok(());
    }
    Err(PlanError::RangeStep {
        label: label.to_string(),
        step: rules.step_for_unit(unit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn range_requires_both_or_neither_bound() {
        assert!(build_range(None, None, "数量范围").unwrap().is_none());
        let err = build_range(Some(dec("1")), None, "数量范围").unwrap_err();
        assert_eq!(err.to_string(), "数量范围请同时填写最小值与最大值，或全部留空");
        let err = build_range(Some(dec("3")), Some(dec("1")), "数量范围").unwrap_err();
        assert_eq!(err.to_string(), "数量范围最小值不能大于最大值");
        let range = build_range(Some(dec("1")), Some(dec("1")), "数量范围").unwrap().unwrap();
        assert_eq!(range.min, range.max);
    }

    #[test]
    fn range_bounds_follow_unit_step() {
        let rules = UnitRules::default();
        let tenth = QuantityRange { min: dec("0.5"), max: dec("2.5") };
        assert!(validate_range_by_unit_step(Some(&tenth), "斤", "数量范围", &rules).is_ok());

        let err = validate_range_by_unit_step(Some(&tenth), "份", "数量范围", &rules).unwrap_err();
        assert_eq!(err.to_string(), "数量范围需符合单位步进 1");

        assert!(validate_range_by_unit_step(None, "份", "数量范围", &rules).is_ok());
    }
}
