use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use std::sync::Arc;

use cloze_reader_lib::config::Config;
use cloze_reader_lib::corpus::{
    CorpusCache, CorpusRetrieval, CorpusSource, HttpTransport, LocalDataset, SystemClock,
};
use cloze_reader_lib::passage::ClozeGenerator;
use cloze_reader_lib::tools::{self, ToolRequest};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let mut logger_builder = env_logger::Builder::from_default_env();
    logger_builder.filter_level(
        config
            .log_level
            .parse()
            .unwrap_or(log::LevelFilter::Info),
    );
    logger_builder.init();

    if config.list_tools {
        println!("{}", serde_json::to_string_pretty(&tools::tool_definitions())?);
        return Ok(());
    }

    let retrieval_config = config.to_retrieval_config();
    let cache = Arc::new(CorpusCache::new(retrieval_config.cache_ttl, Arc::new(SystemClock)));

    match &config.dataset_file {
        Some(path) => {
            info!("使用本地数据集: {:?}", path);
            run(LocalDataset::new(path.clone(), cache), &config).await
        }
        None => {
            if retrieval_config.bearer_token.is_some() && retrieval_config.usable_token().is_none() {
                warn!("HF_TOKEN 格式不正确，将以匿名方式访问数据集");
            }
            let transport = HttpTransport::new(retrieval_config.request_timeout)?;
            run(
                CorpusRetrieval::with_cache(transport, retrieval_config, cache),
                &config,
            )
            .await
        }
    }
}

async fn run<S: CorpusSource>(source: S, config: &Config) -> Result<()> {
    let mut generator = ClozeGenerator::with_seed(source, config.to_generator_config(), config.seed);

    let output = match &config.tool {
        Some(name) => {
            let request = ToolRequest::from_call(name, config.arguments.as_deref().unwrap_or(""))?;
            tools::dispatch(&mut generator, request).await?
        }
        None => {
            let result = generator.get_cloze_passage(&config.to_request()).await?;
            if result.is_fallback() {
                warn!("没有可用的书籍，输出备用段落《{}》", result.metadata.title);
            }
            serde_json::to_value(result)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
