use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

use crate::service::ComparisonOptions;

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// 未配置 url 时使用内存存储
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
}

/// 比对容差
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToleranceConfig {
    /// 供应商名称相似度阈值 (0-100)
    pub vendor_fuzzy_threshold: f64,
    /// 总金额容差 (百分比)
    pub amount_tolerance_percent: f64,
    pub date_tolerance_days: i64,
    /// 两侧均为空的字段是否计入 matched_fields
    #[serde(default)]
    pub count_empty_matches: bool,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            vendor_fuzzy_threshold: 85.0,
            amount_tolerance_percent: 0.5,
            date_tolerance_days: 3,
            count_empty_matches: false,
        }
    }
}

impl ToleranceConfig {
    pub fn comparison_options(&self) -> ComparisonOptions {
        ComparisonOptions {
            count_empty_matches: self.count_empty_matches,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: "data/exports".to_string(),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> RECON__* 环境变量 -> DATABASE_URL / SERVER_HOST / SERVER_PORT
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let mut builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default(
                "tolerance.vendor_fuzzy_threshold",
                defaults.tolerance.vendor_fuzzy_threshold,
            )?
            .set_default(
                "tolerance.amount_tolerance_percent",
                defaults.tolerance.amount_tolerance_percent,
            )?
            .set_default("tolerance.date_tolerance_days", defaults.tolerance.date_tolerance_days)?
            .set_default("tolerance.count_empty_matches", defaults.tolerance.count_empty_matches)?
            .set_default("export.dir", defaults.export.dir)?
            .add_source(
                Environment::with_prefix("RECON")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }
        if let Ok(host) = std::env::var("SERVER_HOST") {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_tolerances() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert!(config.database.url.is_none());
        assert_eq!(config.tolerance.vendor_fuzzy_threshold, 85.0);
        assert_eq!(config.tolerance.amount_tolerance_percent, 0.5);
        assert_eq!(config.tolerance.date_tolerance_days, 3);
        assert!(!config.tolerance.comparison_options().count_empty_matches);
    }
}
