use once_cell::sync::Lazy;
use regex::Regex;
use tracing::Level;

use crate::error::ParseError;
use crate::model::Speed;

static THROUGHPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*([\d.]+)\s*([kmg]?)b/s").expect("valid throughput regex"));

static MILLIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*([\d.]+)\s*ms").expect("valid millis regex"));

// 把字符串转换成 Level，忽略大小写，不识别时返回 None
pub fn parse_level(s: &str) -> Option<Level> {
    match s.to_uppercase().as_str() {
        "ERROR" => Some(Level::ERROR),
        "WARN" | "WARNING" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}

/// 将端口文本解析为 `u16`，非数字或越界时报错。
pub fn parse_port(s: &str) -> Result<u16, ParseError> {
    let s = s.trim();
    s.parse::<u16>().map_err(|_| ParseError::InvalidPort(s.to_string()))
}

/// 解析形如 `"2.3 kB/s"` 的吞吐量文本，统一换算为 字节/秒。
pub fn parse_throughput(s: &str) -> Option<Speed> {
    let cap = THROUGHPUT.captures(s)?;
    let value: f64 = cap.get(1)?.as_str().parse().ok()?;
    let factor = match cap.get(2).map(|m| m.as_str().to_ascii_lowercase()).as_deref() {
        Some("k") => 1_000.0,
        Some("m") => 1_000_000.0,
        Some("g") => 1_000_000_000.0,
        _ => 1.0,
    };
    Some(Speed::bps(value * factor))
}

/// 解析形如 `"1234 ms"` 的耗时文本。
pub fn parse_millis(s: &str) -> Option<Speed> {
    let cap = MILLIS.captures(s)?;
    let value: f64 = cap.get(1)?.as_str().parse().ok()?;
    Some(Speed::time(value))
}
