use std::fs::{File, create_dir_all};

use tracing::level_filters::LevelFilter;
use tracing::{Level, Metadata};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

use crate::common::utils::parse_level;
use crate::model::LoggingConfig;

/// 初始化日志：文件记录 DEBUG 及以上全部日志，控制台只输出配置中列出的级别。
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    create_dir_all(&config.dir)?;

    let allowed_levels: Vec<Level> = config
        .console_levels
        .iter()
        .filter_map(|lvl_str| parse_level(lvl_str))
        .collect();

    let file = File::create(config.dir.join("all.log"))?;
    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_filter(filter_fn(move |metadata: &Metadata| {
            allowed_levels.contains(metadata.level())
        }));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;

    Ok(())
}
