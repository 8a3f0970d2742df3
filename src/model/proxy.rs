use std::hash::{Hash, Hasher};

/// 代理协议类型。
///
/// 各数据源的原始文本统一映射到此封闭枚举，无法识别的值一律归为 `Unknown`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Protocol {
    #[value(skip)]
    Unknown,
    Http,
    Https,
    Socks4,
    Socks5,
}

/// 代理匿名级别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Anonymity {
    /// 未知匿名级别
    #[value(skip)]
    Unknown,
    /// 高匿代理
    Hia,
    /// 普通匿名代理
    Anm,
    /// 透明代理（不匿名）
    Noa,
}

/// 速度指标的类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeedType {
    /// 吞吐量，单位 字节/秒
    Bps,
    /// 耗时，单位 毫秒
    Time,
}

/// 带类型标记的速度值，用于统一不同数据源的测速字段。
#[derive(Debug, Clone, Copy)]
pub struct Speed {
    pub speed_type: SpeedType,
    pub value: f64,
}

impl Speed {
    pub fn bps(value: f64) -> Self {
        Self { speed_type: SpeedType::Bps, value }
    }

    pub fn time(value: f64) -> Self {
        Self { speed_type: SpeedType::Time, value }
    }
}

// 按位比较 value，保证 Eq 与 Hash 一致
impl PartialEq for Speed {
    fn eq(&self, other: &Self) -> bool {
        self.speed_type == other.speed_type && self.value.to_bits() == other.value.to_bits()
    }
}

impl Eq for Speed {}

impl Hash for Speed {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.speed_type.hash(state);
        self.value.to_bits().hash(state);
    }
}

/// 统一的代理地址记录。
///
/// 只在解析器内部构造，构造后不再修改。
/// 相等性与哈希基于全部字段，缓存回放时依赖它做集合去重。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyAddress {
    /// 代理的 IP 地址。
    pub ip: String,

    /// 代理端口，解析阶段即校验为合法的 `u16`。
    pub port: u16,

    pub protocol: Protocol,

    pub country: String,

    /// 数据源给出的更新时间，保持原始格式，不做归一化。
    pub updated: String,

    pub anonymity: Anonymity,

    /// 是否支持访问 Google。
    pub google: bool,

    pub speed: Option<Speed>,
    pub uptime: Option<Speed>,
    pub response: Option<Speed>,
    pub latency: Option<Speed>,
}

impl ProxyAddress {
    /// 构造一条不含测速信息的代理记录，`google` 默认为 `false`。
    pub fn new(
        ip: impl Into<String>,
        port: u16,
        protocol: Protocol,
        country: impl Into<String>,
        updated: impl Into<String>,
        anonymity: Anonymity,
    ) -> Self {
        Self {
            ip: ip.into(),
            port,
            protocol,
            country: country.into(),
            updated: updated.into(),
            anonymity,
            google: false,
            speed: None,
            uptime: None,
            response: None,
            latency: None,
        }
    }

    pub fn with_google(mut self, google: bool) -> Self {
        self.google = google;
        self
    }

    pub fn with_speed(mut self, speed: Option<Speed>) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_response(mut self, response: Option<Speed>) -> Self {
        self.response = response;
        self
    }

    /// `ip:port` 形式的地址字符串。
    pub fn addr(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}
