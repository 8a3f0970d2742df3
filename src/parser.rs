//! # parser 模块
//!
//! 将各数据源的原始响应解析为统一的 [`ProxyAddress`] 列表。
//!
//! - [`FreeProxyListParser`]：free-proxy-list.net，普通 HTML 表格；
//! - [`GeoNodeParser`]：proxylist.geonode.com，JSON 接口；
//! - [`FreeProxyCzParser`]：free-proxy.cz，IP 列经 base64 混淆的 HTML 表格，支持缓存回放。
//!
//! 每个解析器维护自己的协议/匿名级别映射表，无法识别的文本统一归为 `Unknown`。

mod free_proxy_cz;
mod free_proxy_list;
mod geonode;

pub use free_proxy_cz::{CacheReplay, FreeProxyCzParser};
pub use free_proxy_list::FreeProxyListParser;
pub use geonode::GeoNodeParser;

#[cfg(test)]
pub(crate) use free_proxy_cz::tests as cz_fixtures;

use scraper::{ElementRef, Selector};

use crate::error::ParseError;
use crate::fetcher::RawResponse;
use crate::model::ProxyAddress;

/// 解析器的统一能力接口：原始响应 → 代理列表。
pub trait ProxyParser {
    fn parse(&self, response: &RawResponse) -> Result<Vec<ProxyAddress>, ParseError>;
}

fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector(format!("{}: {:?}", css, e)))
}

/// 单元格内全部文本拼接后去除首尾空白。
fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// 单元格内第一个匹配子元素的文本。
fn nested_text(cell: &ElementRef, sel: &Selector) -> Option<String> {
    cell.select(sel).next().map(|e| cell_text(&e))
}
