use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 应用配置。
///
/// 在 `main` 中加载一次，再显式传递给各组件，不使用全局单例。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub sources: SourcesConfig,
    pub cache: CacheConfig,
    pub log: LoggingConfig,
}

/// 数据源地址与请求头。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    pub free_proxy_list_url: String,
    pub geo_node_url: String,
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// free-proxy.cz 原始页面的缓存目录
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub console_levels: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        let headers = [
            ("Connection", "keep-alive"),
            ("Pragma", "no-cache"),
            ("Cache-Control", "no-cache"),
            ("Upgrade-Insecure-Requests", "1"),
            (
                "User-Agent",
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/95.0.4638.69 Safari/537.36",
            ),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9",
            ),
            ("Accept-Language", "en-US,en;q=0.9"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            free_proxy_list_url: "https://free-proxy-list.net/".to_string(),
            geo_node_url: "https://proxylist.geonode.com/api/proxy-list?limit=100&page=1&sort_by=lastChecked&sort_type=desc&speed=fast".to_string(),
            headers,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("cache") }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            console_levels: vec!["ERROR".into(), "WARN".into(), "INFO".into()],
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: SourcesConfig::default(),
            cache: CacheConfig::default(),
            log: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// 按「内置默认值 → 配置文件 → 环境变量」的顺序叠加加载配置。
    ///
    /// 配置文件可缺省；环境变量形如 `PROXY_SIEVE__CACHE__DIR=/tmp/cache`。
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("PROXY_SIEVE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        let config = config.try_deserialize()?;
        Ok(config)
    }
}
