use scraper::Html;
use tracing::{debug, info};

use super::{ProxyParser, cell_text, selector};
use crate::common::utils::parse_port;
use crate::error::ParseError;
use crate::fetcher::RawResponse;
use crate::model::{Anonymity, Protocol, ProxyAddress};

const ROWS: &str = ".fpl-list > table tr";
const COLUMNS: usize = 8;

/// free-proxy-list.net 表格解析器。
///
/// 每行依次为：ip、端口、国家代码（不使用）、国家、匿名级别、Google、Https、最后更新时间。
/// 协议不直接给出，由 Https 列推导。
#[derive(Debug, Default, Clone, Copy)]
pub struct FreeProxyListParser;

impl FreeProxyListParser {
    fn anonymity(text: &str) -> Anonymity {
        match text {
            "elite proxy" => Anonymity::Hia,
            "anonymous" => Anonymity::Anm,
            "transparent" => Anonymity::Noa,
            _ => Anonymity::Unknown,
        }
    }

    fn protocol(https: &str) -> Protocol {
        if https == "yes" { Protocol::Https } else { Protocol::Http }
    }
}

impl ProxyParser for FreeProxyListParser {
    fn parse(&self, response: &RawResponse) -> Result<Vec<ProxyAddress>, ParseError> {
        if !response.is_success() {
            info!("Response: [{}] : {}", response.status, response.url);
            return Ok(Vec::new());
        }

        let document = Html::parse_document(&response.body);
        let rows = selector(ROWS)?;
        let td = selector("td")?;

        let mut list = Vec::new();
        for row in document.select(&rows) {
            let tds: Vec<_> = row.select(&td).map(|c| cell_text(&c)).collect();
            if tds.is_empty() {
                continue;
            }
            if tds.len() < COLUMNS {
                debug!("跳过列数不足的行：{:?}", tds);
                continue;
            }

            let port = parse_port(&tds[1])?;
            let proxy = ProxyAddress::new(
                tds[0].as_str(),
                port,
                Self::protocol(&tds[6]),
                tds[3].as_str(),
                tds[7].as_str(),
                Self::anonymity(&tds[4]),
            )
            .with_google(tds[5] == "yes");
            list.push(proxy);
        }

        info!("free-proxy-list 解析到 {} 条代理", list.len());
        Ok(list)
    }
}
