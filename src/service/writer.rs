use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::model::ProxyAddress;

/// 把代理以 `ip:port` 每行一条写入文件，覆盖已有内容。
///
/// 相同的 `ip:port` 只写一行，其余字段不参与去重；行的顺序不保证。
pub fn write_proxy_file(path: impl AsRef<Path>, proxies: &[ProxyAddress]) -> std::io::Result<()> {
    let path = path.as_ref();
    let lines: HashSet<String> = proxies.iter().map(|p| p.addr()).collect();
    let count = lines.len();
    let text = lines.into_iter().collect::<Vec<_>>().join("\n");

    fs::write(path, text)?;
    info!("已写入 {} 条代理到 {}", count, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Anonymity, Protocol, Speed};

    #[test]
    fn test_same_addr_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxies.txt");

        let proxies = vec![
            ProxyAddress::new("1.2.3.4", 80, Protocol::Http, "US", "a", Anonymity::Hia),
            ProxyAddress::new("1.2.3.4", 80, Protocol::Socks5, "DE", "b", Anonymity::Noa)
                .with_google(true)
                .with_speed(Some(Speed::time(3.0))),
            ProxyAddress::new("5.6.7.8", 1080, Protocol::Socks4, "FR", "c", Anonymity::Anm),
        ];
        write_proxy_file(&path, &proxies).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines: Vec<_> = text.lines().collect();
        lines.sort();
        assert_eq!(lines, vec!["1.2.3.4:80", "5.6.7.8:1080"]);
    }

    #[test]
    fn test_existing_file_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxies.txt");
        fs::write(&path, "9.9.9.9:9\n8.8.8.8:8\n7.7.7.7:7").unwrap();

        let proxies = vec![ProxyAddress::new("1.1.1.1", 443, Protocol::Https, "", "", Anonymity::Hia)];
        write_proxy_file(&path, &proxies).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "1.1.1.1:443");
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("proxies.txt");
        assert!(write_proxy_file(&path, &[]).is_err());
    }
}
