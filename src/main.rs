mod common;
mod error;
mod fetcher;
mod model;
mod parser;
mod service;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::common::log::init_logging;
use crate::fetcher::HttpFetcher;
use crate::model::{AppConfig, Anonymity, Protocol};
use crate::service::aggregator::ProxyAggregator;
use crate::service::filter::FilterPolicy;
use crate::service::writer::write_proxy_file;

/// 从公开代理列表网站采集、筛选代理
#[derive(Parser)]
#[command(name = "proxy-sieve", version)]
struct Cli {
    /// 配置文件路径（可省略扩展名）
    #[arg(short, long, default_value = "Config", global = true)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write proxy list to a file.
    Proxylist {
        /// 输出文件
        filename: String,

        /// 只抓取指定站点
        #[arg(long, ignore_case = true, value_parser = ["geonode", "freeproxy"])]
        site: Option<String>,

        /// 从缓存目录回放 free-proxy.cz 页面，不访问网络
        #[arg(long)]
        cached: bool,

        /// 只保留（不）支持 Google 的代理
        #[arg(long)]
        google: Option<bool>,

        /// 允许的协议，默认 https,socks4,socks5
        #[arg(long, value_enum, value_delimiter = ',')]
        protocol: Vec<Protocol>,

        /// 允许的匿名级别，默认 hia
        #[arg(long, value_enum, value_delimiter = ',')]
        anonymity: Vec<Anonymity>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    // 必须先于其他调用初始化日志
    init_logging(&config.log)?;

    match cli.command {
        Commands::Proxylist { filename, site, cached, google, protocol, anonymity } => {
            let policy = FilterPolicy::default().with_overrides(google, protocol, anonymity);

            let fetcher = HttpFetcher::new(&config.sources.headers)?;
            let aggregator = ProxyAggregator::new(fetcher, config.sources.clone(), &config.cache);

            let proxies = if cached {
                let replay = aggregator.cached_proxies()?;
                for failure in &replay.failures {
                    warn!("跳过缓存文件 {}", failure);
                }
                info!("CACHED: {}", replay.proxies.len());
                replay.proxies
            } else {
                aggregator.fetch_and_parse(site.as_deref()).await?
            };

            let proxies = policy.apply(proxies);
            write_proxy_file(&filename, &proxies)?;
        }
    }

    Ok(())
}
