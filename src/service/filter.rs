//! # filter 模块
//!
//! 按 Google 支持、协议、匿名级别三个维度筛选代理。
//!
//! 三个过滤器都是纯函数：条件为空（`None` 或空集合）表示不过滤，而不是全部丢弃。
//! [`FilterPolicy::apply`] 固定按 Google → 协议 → 匿名级别 的顺序执行，并记录每一步剩余数量。

use tracing::info;

use crate::model::{Anonymity, Protocol, ProxyAddress};

pub struct ProxyFilters;

impl ProxyFilters {
    pub fn google(proxies: Vec<ProxyAddress>, use_google: Option<bool>) -> Vec<ProxyAddress> {
        match use_google {
            Some(flag) => proxies.into_iter().filter(|p| p.google == flag).collect(),
            None => proxies,
        }
    }

    pub fn protocol(proxies: Vec<ProxyAddress>, protocols: &[Protocol]) -> Vec<ProxyAddress> {
        if protocols.is_empty() {
            return proxies;
        }
        proxies.into_iter().filter(|p| protocols.contains(&p.protocol)).collect()
    }

    pub fn anonymity(proxies: Vec<ProxyAddress>, levels: &[Anonymity]) -> Vec<ProxyAddress> {
        if levels.is_empty() {
            return proxies;
        }
        proxies.into_iter().filter(|p| levels.contains(&p.anonymity)).collect()
    }
}

/// 一组筛选条件。
///
/// [`FilterPolicy::default`] 即命令行 `proxylist` 使用的默认策略：
/// 只保留 HTTPS / SOCKS4 / SOCKS5 协议的高匿代理，不限制 Google 支持。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPolicy {
    pub google: Option<bool>,
    pub protocols: Vec<Protocol>,
    pub anonymity: Vec<Anonymity>,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            google: None,
            protocols: vec![Protocol::Https, Protocol::Socks4, Protocol::Socks5],
            anonymity: vec![Anonymity::Hia],
        }
    }
}

impl FilterPolicy {
    /// 不做任何筛选的策略。
    pub fn permissive() -> Self {
        Self { google: None, protocols: Vec::new(), anonymity: Vec::new() }
    }

    /// 用命令行给出的条件覆盖当前策略；空集合表示沿用原值。
    pub fn with_overrides(
        self,
        google: Option<bool>,
        protocols: Vec<Protocol>,
        anonymity: Vec<Anonymity>,
    ) -> Self {
        Self {
            google,
            protocols: if protocols.is_empty() { self.protocols } else { protocols },
            anonymity: if anonymity.is_empty() { self.anonymity } else { anonymity },
        }
    }

    pub fn apply(&self, proxies: Vec<ProxyAddress>) -> Vec<ProxyAddress> {
        info!("========== [代理筛选阶段] ==========");
        info!("待筛选 {} 条", proxies.len());

        let proxies = ProxyFilters::google(proxies, self.google);
        info!("Google 筛选 {:?} 后剩余 {} 条", self.google, proxies.len());

        let proxies = ProxyFilters::protocol(proxies, &self.protocols);
        info!("协议筛选 {:?} 后剩余 {} 条", self.protocols, proxies.len());

        let proxies = ProxyFilters::anonymity(proxies, &self.anonymity);
        info!("匿名级别筛选 {:?} 后剩余 {} 条", self.anonymity, proxies.len());

        proxies
    }
}
