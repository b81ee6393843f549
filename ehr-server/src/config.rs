//! 配置管理
//!
//! 配置来源按优先级从低到高：内置默认值、配置文件（TOML）、`EHR_` 前缀的环境变量
//! （层级用 `__` 分隔，例如 `EHR_SERVER__PORT=9000`）、命令行参数。

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use ehr_web::WebConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 系统完整配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EhrConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// Web服务配置
    pub web: WebSettings,
    /// 分析引擎配置
    pub analysis: AnalysisConfig,
    /// 摘要生成配置
    pub summary: SummaryConfig,
    /// 患者目录配置
    pub patients: PatientsConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听主机
    pub host: String,
    /// 监听端口
    pub port: u16,
}

/// Web服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSettings {
    pub enable_cors: bool,
    /// 影像目录，挂载在 /images
    pub images_dir: PathBuf,
    /// 前端静态文件目录
    pub static_dir: Option<PathBuf>,
    /// 上传大小上限（字节）
    pub max_upload_bytes: usize,
}

/// 分析引擎配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// 自定义规则文件，未设置时使用标准规则表
    pub rules_file: Option<PathBuf>,
}

/// 摘要生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    pub prefix: String,
    pub suffix: String,
    pub max_chars: usize,
}

/// 患者目录配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientsConfig {
    /// JSON格式的患者列表，未设置时使用演示数据
    pub seed_file: Option<PathBuf>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别或 EnvFilter 表达式
    pub level: String,
}

impl EhrConfig {
    /// 加载配置
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&EhrConfig::default()).context("Failed to build default configuration")?,
        );

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("EHR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration")?;

        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }
        if self.web.max_upload_bytes == 0 {
            anyhow::bail!("web.max_upload_bytes cannot be 0");
        }
        if self.summary.max_chars == 0 {
            anyhow::bail!("summary.max_chars cannot be 0");
        }
        Ok(())
    }

    pub fn web_config(&self) -> WebConfig {
        WebConfig {
            enable_cors: self.web.enable_cors,
            images_dir: self.web.images_dir.clone(),
            static_dir: self.web.static_dir.clone(),
            max_upload_bytes: self.web.max_upload_bytes,
        }
    }
}

impl Default for EhrConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            web: WebSettings::default(),
            analysis: AnalysisConfig::default(),
            summary: SummaryConfig::default(),
            patients: PatientsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for WebSettings {
    fn default() -> Self {
        let web = WebConfig::default();
        Self {
            enable_cors: web.enable_cors,
            images_dir: web.images_dir,
            static_dir: web.static_dir,
            max_upload_bytes: web.max_upload_bytes,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            prefix: "AI Medical Summary: ".to_string(),
            suffix: "... [Professional evaluation recommended]".to_string(),
            max_chars: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("ehr-config-{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = EhrConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.summary.max_chars, 100);
        assert!(config.analysis.rules_file.is_none());
    }

    #[test]
    fn test_load_file_overrides_defaults() {
        let path = write_temp_config(
            "override",
            r#"
[server]
port = 9100

[web]
static_dir = "frontend/build"
max_upload_bytes = 1024

[summary]
max_chars = 40
"#,
        );

        let config = EhrConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.web.static_dir, Some(PathBuf::from("frontend/build")));
        assert_eq!(config.web.max_upload_bytes, 1024);
        assert!(config.web.enable_cors);
        assert_eq!(config.summary.max_chars, 40);
        assert_eq!(config.summary.prefix, "AI Medical Summary: ");
    }

    #[test]
    fn test_example_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/ehr.example.toml");
        let config = EhrConfig::load(Some(&path)).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.logging.level, "info,tower_http=debug");
        assert!(config.web.static_dir.is_none());
    }

    #[test]
    fn test_missing_file_is_error() {
        let path = std::env::temp_dir().join("ehr-config-does-not-exist.toml");
        assert!(EhrConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = EhrConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = EhrConfig::default();
        config.summary.max_chars = 0;
        assert!(config.validate().is_err());

        let mut config = EhrConfig::default();
        config.web.max_upload_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_web_config_mapping() {
        let mut config = EhrConfig::default();
        config.web.images_dir = PathBuf::from("/srv/images");
        config.web.enable_cors = false;

        let web = config.web_config();
        assert_eq!(web.images_dir, PathBuf::from("/srv/images"));
        assert!(!web.enable_cors);
    }
}
