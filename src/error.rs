use std::path::PathBuf;

use thiserror::Error;

/// 解析单个数据源响应时可能出现的错误。
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid css selector `{0}`")]
    Selector(String),
    #[error("obfuscated ip token not found in `{0}`")]
    MissingIpToken(String),
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("proxy table has {0} columns, expected at least {1}")]
    ShortTable(usize, usize),
    #[error("invalid port `{0}`")]
    InvalidPort(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("payload has no `data` array")]
    MissingData,
}

/// 缓存回放中单个文件的失败原因。
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}
