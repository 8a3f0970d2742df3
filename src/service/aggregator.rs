//! # aggregator 模块
//!
//! 按站点选择抓取并解析代理，或从缓存目录回放。
//!
//! - 未指定站点：依次抓取 free-proxy-list 与 geonode，结果按此顺序拼接；
//! - `freeproxy` / `geonode`（忽略大小写）：只抓取对应站点；
//! - 其他取值：返回空列表，不报错。

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::fetcher::Fetcher;
use crate::model::{CacheConfig, ProxyAddress, SourcesConfig};
use crate::parser::{CacheReplay, FreeProxyCzParser, FreeProxyListParser, GeoNodeParser, ProxyParser};

/// 站点选择。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Site {
    All,
    FreeProxy,
    GeoNode,
    Unknown(String),
}

impl Site {
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector.map(str::trim) {
            None | Some("") => Site::All,
            Some(s) => match s.to_lowercase().as_str() {
                "freeproxy" => Site::FreeProxy,
                "geonode" => Site::GeoNode,
                _ => Site::Unknown(s.to_string()),
            },
        }
    }
}

pub struct ProxyAggregator<F: Fetcher> {
    fetcher: F,
    sources: SourcesConfig,
    cache_dir: PathBuf,
}

impl<F: Fetcher> ProxyAggregator<F> {
    pub fn new(fetcher: F, sources: SourcesConfig, cache: &CacheConfig) -> Self {
        Self { fetcher, sources, cache_dir: cache.dir.clone() }
    }

    pub async fn fetch_and_parse(&self, selector: Option<&str>) -> Result<Vec<ProxyAddress>> {
        info!("========== [代理采集阶段] ==========");
        let mut proxies = Vec::new();

        match Site::from_selector(selector) {
            Site::All => {
                proxies.extend(self.free_proxy_list().await?);
                proxies.extend(self.geo_node().await?);
            }
            Site::FreeProxy => proxies.extend(self.free_proxy_list().await?),
            Site::GeoNode => proxies.extend(self.geo_node().await?),
            Site::Unknown(name) => warn!("未知站点 `{}`，不抓取任何数据", name),
        }

        info!("抓取到总共 {} 条代理", proxies.len());
        Ok(proxies)
    }

    /// 从缓存目录回放 free-proxy.cz 页面，不发起网络请求。
    pub fn cached_proxies(&self) -> Result<CacheReplay> {
        FreeProxyCzParser
            .from_cache_dir(&self.cache_dir)
            .with_context(|| format!("failed to read cache dir {}", self.cache_dir.display()))
    }

    async fn free_proxy_list(&self) -> Result<Vec<ProxyAddress>> {
        self.fetch_with(&self.sources.free_proxy_list_url, FreeProxyListParser).await
    }

    async fn geo_node(&self) -> Result<Vec<ProxyAddress>> {
        self.fetch_with(&self.sources.geo_node_url, GeoNodeParser).await
    }

    async fn fetch_with<P: ProxyParser>(&self, url: &str, parser: P) -> Result<Vec<ProxyAddress>> {
        let response = self.fetcher.fetch(url).await?;
        let list = parser
            .parse(&response)
            .with_context(|| format!("failed to parse response from {}", response.url))?;
        Ok(list)
    }
}
