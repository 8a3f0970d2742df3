//! 网络抓取层：把数据源的 HTTP 响应收敛为与传输无关的 [`RawResponse`]，
//! 解析器只依赖这个结构，便于测试与缓存回放。

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, info};

/// 一次抓取得到的原始响应。
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// 最终请求地址（跟随重定向之后），仅用于日志
    pub url: String,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self { status, url: url.into(), body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// 抓取数据源的通用接口。
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RawResponse>;
}

/// 基于 `reqwest` 的默认实现，所有请求携带配置中的请求头。
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(headers: &HashMap<String, String>) -> Result<Self> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("invalid header name `{}`", name))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("invalid header value for `{}`", name))?;
            map.insert(name, value);
        }

        let client = reqwest::Client::builder().default_headers(map).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<RawResponse> {
        info!("正在请求 {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;
        debug!("[{}] {} 返回 {} 字节", status, final_url, body.len());

        Ok(RawResponse::new(status, final_url, body))
    }
}
