use serde_json::Value;
use tracing::info;

use super::ProxyParser;
use crate::common::utils::parse_port;
use crate::error::ParseError;
use crate::fetcher::RawResponse;
use crate::model::{Anonymity, Protocol, ProxyAddress, Speed};

/// proxylist.geonode.com JSON 接口解析器。
///
/// 读取顶层 `data` 数组；`speed` 与 `responseTime` 均按耗时类型记录，缺省为 -1。
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoNodeParser;

impl GeoNodeParser {
    fn anonymity(text: &str) -> Anonymity {
        match text {
            "transparent" | "level3" => Anonymity::Noa,
            "anonymous" | "level2" => Anonymity::Anm,
            "elite" | "elite proxy" | "High anonymity" | "level1" => Anonymity::Hia,
            _ => Anonymity::Unknown,
        }
    }

    fn protocol(text: &str) -> Protocol {
        match text.to_uppercase().as_str() {
            "HTTP" => Protocol::Http,
            "HTTPS" => Protocol::Https,
            "SOCKS4" => Protocol::Socks4,
            "SOCKS5" => Protocol::Socks5,
            _ => Protocol::Unknown,
        }
    }

    // 端口可能是数字，也可能是数字字符串
    fn port(value: Option<&Value>) -> Result<u16, ParseError> {
        match value {
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|p| u16::try_from(p).ok())
                .ok_or_else(|| ParseError::InvalidPort(n.to_string())),
            Some(Value::String(s)) => parse_port(s),
            other => Err(ParseError::InvalidPort(
                other.map(|v| v.to_string()).unwrap_or_default(),
            )),
        }
    }

    fn ip(proxy: &Value) -> Result<String, ParseError> {
        proxy
            .get("ip")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string)
            .ok_or(ParseError::MissingField("ip"))
    }

    fn text(proxy: &Value, key: &str) -> String {
        proxy.get(key).and_then(|v| v.as_str()).unwrap_or_default().to_string()
    }

    fn timing(proxy: &Value, key: &str) -> Speed {
        Speed::time(proxy.get(key).and_then(|v| v.as_f64()).unwrap_or(-1.0))
    }
}

impl ProxyParser for GeoNodeParser {
    fn parse(&self, response: &RawResponse) -> Result<Vec<ProxyAddress>, ParseError> {
        if !response.is_success() {
            info!("Response: [{}] : {}", response.status, response.url);
            return Ok(Vec::new());
        }

        let payload: Value = serde_json::from_str(&response.body)?;
        let data = payload
            .get("data")
            .and_then(|d| d.as_array())
            .ok_or(ParseError::MissingData)?;

        let mut list = Vec::with_capacity(data.len());
        for proxy in data {
            let protocol = proxy
                .get("protocols")
                .and_then(|p| p.as_array())
                .and_then(|p| p.first())
                .and_then(|p| p.as_str())
                .unwrap_or("");

            let address = ProxyAddress::new(
                Self::ip(proxy)?,
                Self::port(proxy.get("port"))?,
                Self::protocol(protocol),
                Self::text(proxy, "country"),
                Self::text(proxy, "updated_at"),
                Self::anonymity(&Self::text(proxy, "anonymityLevel")),
            )
            .with_google(proxy.get("google").and_then(|g| g.as_bool()).unwrap_or(false))
            .with_speed(Some(Self::timing(proxy, "speed")))
            .with_response(Some(Self::timing(proxy, "responseTime")));
            list.push(address);
        }

        info!("geonode 解析到 {} 条代理", list.len());
        Ok(list)
    }
}
