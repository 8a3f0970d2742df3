use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use super::{ProxyParser, cell_text, nested_text, selector};
use crate::common::utils::{parse_millis, parse_port, parse_throughput};
use crate::error::{ParseError, ProxyError};
use crate::fetcher::RawResponse;
use crate::model::{Anonymity, Protocol, ProxyAddress};

const ROWS: &str = "table#proxy_list tbody > tr";
const HEADERS: &str = "table#proxy_list th";
const COLUMNS: usize = 11;

static IP_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#".*\("(.+)""#).expect("valid ip token regex"));

// 页面里的 base64 可能不带 `=` 填充
const IP_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// free-proxy.cz 表格解析器。
///
/// IP 列不是明文，而是内联脚本里的一段 base64，例如：
/// ```html
/// <td><script>document.write(Base64.decode("MTg1LjE2Mi4yMzEuMTA2"))</script></td>
/// ```
/// 列数与表头不一致的行（广告、分隔行）直接跳过；表头少于 11 列时整页视为格式错误。
/// IP 无法还原时整个解析调用返回错误，而不是静默丢弃。
#[derive(Debug, Default, Clone, Copy)]
pub struct FreeProxyCzParser;

/// 缓存目录回放的结果。
#[derive(Debug, Default)]
pub struct CacheReplay {
    /// 按值去重后的代理，顺序不保证
    pub proxies: Vec<ProxyAddress>,
    /// 读取或解析失败的文件
    pub failures: Vec<ProxyError>,
}

impl FreeProxyCzParser {
    fn anonymity(text: &str) -> Anonymity {
        match text {
            "High anonymity" => Anonymity::Hia,
            "Anonymous" => Anonymity::Anm,
            "Transparent" => Anonymity::Noa,
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

    /// 从内联脚本中还原 IP。
    fn decode_ip(cell: &ElementRef, script: &Selector) -> Result<String, ParseError> {
        let text = cell
            .select(script)
            .next()
            .map(|s| s.text().collect::<String>())
            .unwrap_or_default();

        let token = IP_TOKEN
            .captures(&text)
            .and_then(|c| c.get(1))
            .ok_or_else(|| ParseError::MissingIpToken(cell_text(cell)))?
            .as_str();
        let token = token.split("\")").next().unwrap_or(token);

        let bytes = IP_ENGINE.decode(token)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// 解析一份完整的 HTML 文档（直接响应或缓存文件内容）。
    pub fn parse_html(&self, html: &str) -> Result<Vec<ProxyAddress>, ParseError> {
        let document = Html::parse_document(html);
        let rows = selector(ROWS)?;
        let td = selector("td")?;
        let link = selector("a")?;
        let small = selector("small")?;
        let script = selector("script")?;

        let columns = document.select(&selector(HEADERS)?).count();
        if columns < COLUMNS {
            return Err(ParseError::ShortTable(columns, COLUMNS));
        }

        let mut proxies = Vec::new();
        for row in document.select(&rows) {
            let tds: Vec<ElementRef> = row.select(&td).collect();
            if tds.len() != columns {
                debug!("跳过列数为 {} 的行（表头 {} 列）", tds.len(), columns);
                continue;
            }

            // 列顺序：ip、端口、协议、国家、地区、城市、匿名级别、速度、在线率、响应时间、最后检查时间
            let ip = Self::decode_ip(&tds[0], &script)?;
            let port = parse_port(&cell_text(&tds[1]))?;
            let protocol = Self::protocol(&cell_text(&tds[2]));
            let country = nested_text(&tds[3], &link).unwrap_or_default();
            let anonymity = Self::anonymity(&cell_text(&tds[6]));
            let speed = nested_text(&tds[7], &small).and_then(|s| parse_throughput(&s));
            let response = nested_text(&tds[9], &small).and_then(|s| parse_millis(&s));
            let last_checked =
                nested_text(&tds[10], &small).unwrap_or_else(|| cell_text(&tds[10]));

            let proxy = ProxyAddress::new(ip, port, protocol, country, last_checked, anonymity)
                .with_speed(speed)
                .with_response(response);
            proxies.push(proxy);
        }

        Ok(proxies)
    }

    /// 回放缓存目录中的全部原始页面。
    ///
    /// 目录本身不可读时返回 I/O 错误；单个文件读取或解析失败只记录到
    /// [`CacheReplay::failures`]，继续处理其余文件。
    pub fn from_cache_dir(&self, dir: &Path) -> std::io::Result<CacheReplay> {
        info!("========== [缓存回放] {} ==========", dir.display());
        let mut proxies = HashSet::new();
        let mut failures = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path: PathBuf = entry?.path();
            if !path.is_file() {
                continue;
            }

            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(source) => {
                    warn!("读取缓存文件 {} 失败：{}", path.display(), source);
                    failures.push(ProxyError::Io { path, source });
                    continue;
                }
            };

            match self.parse_html(&text) {
                Ok(list) => {
                    debug!("{} 解析到 {} 条代理", path.display(), list.len());
                    proxies.extend(list);
                }
                Err(source) => {
                    warn!("解析缓存文件 {} 失败：{}", path.display(), source);
                    failures.push(ProxyError::Parse { path, source });
                }
            }
        }

        info!("缓存回放得到 {} 条代理，{} 个文件失败", proxies.len(), failures.len());
        Ok(CacheReplay { proxies: proxies.into_iter().collect(), failures })
    }
}

impl ProxyParser for FreeProxyCzParser {
    fn parse(&self, response: &RawResponse) -> Result<Vec<ProxyAddress>, ParseError> {
        self.parse_html(&response.body)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::Speed;

    const HEAD: &str = "<tr><th>IP address</th><th>Port</th><th>Protocol</th><th>Country</th>\
        <th>Region</th><th>City</th><th>Anonymity</th><th>Speed</th><th>Uptime</th>\
        <th>Response</th><th>Last checked</th></tr>";

    pub(crate) fn page(rows: &str) -> String {
        format!(
            r#"<html><body><table id="proxy_list"><thead>{}</thead><tbody>{}</tbody></table></body></html>"#,
            HEAD, rows
        )
    }

    pub(crate) fn row(encoded_ip: &str, port: &str, protocol: &str, anonymity: &str) -> String {
        format!(
            r#"<tr><td><script type="text/javascript">document.write(Base64.decode("{encoded_ip}"))</script></td>
            <td><span>{port}</span></td><td><small>{protocol}</small></td>
            <td><img src="/flags/cz.png"/> <a href="/en/proxylist/country/CZ/all/ping/all">Czech Republic</a></td>
            <td>Prague</td><td>Prague</td><td><small>{anonymity}</small></td>
            <td><small>2.5 kB/s</small></td><td><small>87%</small></td>
            <td><small>340 ms</small></td><td><small>2024-05-01 10:00:00</small></td></tr>"#
        )
    }

    #[test]
    fn test_parse_obfuscated_row() {
        // "185.162.231.106"
        let html = page(&row("MTg1LjE2Mi4yMzEuMTA2", "8080", "HTTPS", "High anonymity"));
        let list = FreeProxyCzParser.parse_html(&html).unwrap();

        assert_eq!(list.len(), 1);
        let p = &list[0];
        assert_eq!(p.ip, "185.162.231.106");
        assert_eq!(p.port, 8080);
        assert_eq!(p.protocol, Protocol::Https);
        assert_eq!(p.country, "Czech Republic");
        assert_eq!(p.anonymity, Anonymity::Hia);
        assert_eq!(p.speed, Some(Speed::bps(2500.0)));
        assert_eq!(p.response, Some(Speed::time(340.0)));
        assert_eq!(p.updated, "2024-05-01 10:00:00");
        assert!(p.uptime.is_none());
        assert!(!p.google);
    }

    #[test]
    fn test_unpadded_token_decodes() {
        // "1.2.3.4" 去掉填充
        let html = page(&row("MS4yLjMuNA", "3128", "socks5", "Transparent"));
        let p = &FreeProxyCzParser.parse_html(&html).unwrap()[0];
        assert_eq!(p.ip, "1.2.3.4");
        assert_eq!(p.protocol, Protocol::Socks5);
        assert_eq!(p.anonymity, Anonymity::Noa);
    }

    #[test]
    fn test_rows_with_wrong_column_count_skipped() {
        let rows = "<tr><td colspan=\"11\">advert</td></tr>".to_string()
            + &row("MS4yLjMuNA==", "80", "HTTP", "Anonymous");
        let list = FreeProxyCzParser.parse_html(&page(&rows)).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].anonymity, Anonymity::Anm);
    }

    #[test]
    fn test_missing_ip_token_is_error() {
        let rows = row("MS4yLjMuNA==", "80", "HTTP", "Anonymous")
            .replace(r#"document.write(Base64.decode("MS4yLjMuNA=="))"#, "document.write(ip)");
        let result = FreeProxyCzParser.parse_html(&page(&rows));
        assert!(matches!(result, Err(ParseError::MissingIpToken(_))));
    }

    #[test]
    fn test_parse_response_ignores_status() {
        let html = page(&row("MS4yLjMuNA==", "80", "HTTP", "elite"));
        let response = RawResponse::new(404, "http://free-proxy.cz/en/", html);
        let list = FreeProxyCzParser.parse(&response).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].anonymity, Anonymity::Unknown);
    }

    #[test]
    fn test_cache_dir_dedups_and_collects_failures() {
        let dir = tempfile::tempdir().unwrap();
        let same = page(&row("MS4yLjMuNA==", "80", "HTTP", "Anonymous"));
        fs::write(dir.path().join("a.html"), &same).unwrap();
        fs::write(dir.path().join("b.html"), &same).unwrap();
        fs::write(
            dir.path().join("c.html"),
            page(&row("NS42LjcuOA==", "1080", "SOCKS4", "High anonymity")),
        )
        .unwrap();
        fs::write(
            dir.path().join("broken.html"),
            page(&row("MS4yLjMuNA==", "80", "HTTP", "Anonymous").replace("(\"MS4yLjMuNA==\")", "(ip)")),
        )
        .unwrap();

        let replay = FreeProxyCzParser.from_cache_dir(dir.path()).unwrap();
        assert_eq!(replay.proxies.len(), 2);
        assert_eq!(replay.failures.len(), 1);
        assert!(matches!(replay.failures[0], ProxyError::Parse { .. }));
    }

    #[test]
    fn test_short_header_is_error() {
        let html = r#"<table id="proxy_list"><thead><tr><th>IP</th><th>Port</th><th>Protocol</th></tr></thead>
            <tbody><tr><td>a</td><td>80</td><td>HTTP</td></tr></tbody></table>"#;
        let result = FreeProxyCzParser.parse_html(html);
        assert!(matches!(result, Err(ParseError::ShortTable(3, COLUMNS))));
    }

    #[test]
    fn test_cache_dir_skips_headerless_table() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.html"), page(&row("MS4yLjMuNA==", "80", "HTTP", "Anonymous"))).unwrap();
        fs::write(
            dir.path().join("empty.html"),
            r#"<table id="proxy_list"><tbody><tr></tr></tbody></table>"#,
        )
        .unwrap();

        let replay = FreeProxyCzParser.from_cache_dir(dir.path()).unwrap();
        assert_eq!(replay.proxies.len(), 1);
        assert_eq!(replay.failures.len(), 1);
        assert!(matches!(
            replay.failures[0],
            ProxyError::Parse { source: ParseError::ShortTable(0, COLUMNS), .. }
        ));
    }

    #[test]
    fn test_missing_cache_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(FreeProxyCzParser.from_cache_dir(&missing).is_err());
    }
}
