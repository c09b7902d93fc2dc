use crate::service::unit_rules::DEFAULT_SPLITTABLE_UNITS;
use bigdecimal::BigDecimal;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 定价引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// 单行最低金额，低于此值自动抬升数量
    pub min_amount: BigDecimal,
    /// 内置可分割单位；规则源下发的清单会覆盖它
    pub splittable_units: Vec<String>,
    /// 分页拉取产品的每页条数
    pub product_page_size: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            min_amount: BigDecimal::from(1),
            splittable_units: DEFAULT_SPLITTABLE_UNITS.iter().map(|u| u.to_string()).collect(),
            product_page_size: 200,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            pricing: PricingConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置：内置默认值 < `config/default.*` < 环境变量
    ///
    /// 环境变量前缀 `PLAN`，层级用 `__` 分隔，例如 `PLAN_SERVER__PORT=9000`、
    /// `PLAN_PRICING__SPLITTABLE_UNITS=斤,千克`。
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("pricing.min_amount", defaults.pricing.min_amount.to_string())?
            .set_default("pricing.splittable_units", defaults.pricing.splittable_units)?
            .set_default("pricing.product_page_size", i64::from(defaults.pricing.product_page_size))?
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                Environment::with_prefix("PLAN")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("pricing.splittable_units")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builtin_rules() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.pricing.min_amount, BigDecimal::from(1));
        assert_eq!(config.pricing.splittable_units.len(), 6);
        assert_eq!(config.pricing.product_page_size, 200);
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let config = AppConfig::load().unwrap();
        assert_eq!(config.pricing.product_page_size, 200);
        assert!(config.pricing.splittable_units.iter().any(|u| u == "斤"));
    }
}
