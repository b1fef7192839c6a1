use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::corpus::RetrievalConfig;
use crate::passage::{Difficulty, GeneratorConfig, PassageRequest};

/// 命令行配置
#[derive(Debug, Clone, Parser)]
#[command(name = "cloze-reader")]
#[command(about = "Generate a difficulty-calibrated cloze passage from Project Gutenberg")]
pub struct Config {
    /// Bookshelf category, e.g. "bookshelf/480" or "Poetry"
    #[arg(long)]
    pub category: Option<String>,

    /// Author name substring
    #[arg(long)]
    pub author: Option<String>,

    /// Century number, e.g. 19
    #[arg(long)]
    pub century: Option<String>,

    /// Number of blanks to create
    #[arg(short, long, default_value = "3")]
    pub blanks: usize,

    /// Difficulty level (1-5)
    #[arg(short, long, default_value = "1")]
    pub difficulty: i64,

    /// Dataset language split
    #[arg(long, default_value = "en")]
    pub language: String,

    /// HuggingFace access token
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Rows endpoint of the datasets server
    #[arg(long, default_value = "https://datasets-server.huggingface.co/rows")]
    pub endpoint: String,

    /// Dataset name
    #[arg(long, default_value = "manu/project_gutenberg")]
    pub dataset: String,

    /// Read books from a local JSON file instead of the remote dataset
    #[arg(long)]
    pub dataset_file: Option<PathBuf>,

    /// Base delay between retries in milliseconds
    #[arg(long, default_value = "1000")]
    pub retry_base_delay_ms: u64,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Seed for the random number generator (for deterministic output)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Run a single tool call by name instead of a plain passage request
    #[arg(long)]
    pub tool: Option<String>,

    /// JSON arguments for --tool
    #[arg(long, requires = "tool")]
    pub arguments: Option<String>,

    /// Print the tool definitions and exit
    #[arg(long)]
    pub list_tools: bool,
}

impl Config {
    /// 检索配置，命令行没有给出凭证时读取环境变量
    pub fn to_retrieval_config(&self) -> RetrievalConfig {
        let from_env = RetrievalConfig::from_env();
        RetrievalConfig {
            endpoint: self.endpoint.clone(),
            dataset: self.dataset.clone(),
            bearer_token: self.hf_token.clone().or(from_env.bearer_token),
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            request_timeout: Duration::from_secs(self.timeout_secs),
            ..from_env
        }
    }

    pub fn to_generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            language: self.language.clone(),
            ..GeneratorConfig::default()
        }
    }

    pub fn to_request(&self) -> PassageRequest {
        PassageRequest {
            category: self.category.clone(),
            author: self.author.clone(),
            century: self.century.clone(),
            blanks_count: self.blanks,
            difficulty: Difficulty::clamped(self.difficulty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        Config {
            category: Some("bookshelf/433".to_string()),
            author: None,
            century: Some("19".to_string()),
            blanks: 4,
            difficulty: 7,
            language: "de".to_string(),
            hf_token: Some("hf_testtoken1".to_string()),
            endpoint: "http://localhost:9000/rows".to_string(),
            dataset: "manu/project_gutenberg".to_string(),
            dataset_file: None,
            retry_base_delay_ms: 10,
            timeout_secs: 5,
            seed: Some(3),
            log_level: "debug".to_string(),
            tool: None,
            arguments: None,
            list_tools: false,
        }
    }

    #[test]
    fn test_parse_defaults() {
        let config = Config::parse_from(["cloze-reader"]);
        assert_eq!(config.blanks, 3);
        assert_eq!(config.difficulty, 1);
        assert_eq!(config.language, "en");
        assert_eq!(config.retry_base_delay_ms, 1000);
        assert_eq!(config.log_level, "info");
        assert!(config.tool.is_none());
        assert!(!config.list_tools);
    }

    #[test]
    fn test_parse_arguments() {
        let config = Config::parse_from([
            "cloze-reader",
            "--category",
            "bookshelf/480",
            "-b",
            "5",
            "-d",
            "3",
            "--seed",
            "42",
        ]);
        assert_eq!(config.category.as_deref(), Some("bookshelf/480"));
        assert_eq!(config.blanks, 5);
        assert_eq!(config.difficulty, 3);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_arguments_require_tool() {
        let result = Config::try_parse_from(["cloze-reader", "--arguments", "{}"]);
        assert!(result.is_err());

        let config = Config::try_parse_from([
            "cloze-reader",
            "--tool",
            "getWordAnalysis",
            "--arguments",
            r#"{"sentence": "A b c.", "word": "b"}"#,
        ])
        .unwrap();
        assert_eq!(config.tool.as_deref(), Some("getWordAnalysis"));
    }

    #[test]
    fn test_conversions() {
        let config = create_test_config();

        let retrieval = config.to_retrieval_config();
        assert_eq!(retrieval.endpoint, "http://localhost:9000/rows");
        assert_eq!(retrieval.bearer_token.as_deref(), Some("hf_testtoken1"));
        assert_eq!(retrieval.base_delay, Duration::from_millis(10));
        assert_eq!(retrieval.max_retries, 3);

        let request = config.to_request();
        assert_eq!(request.blanks_count, 4);
        assert_eq!(request.difficulty.level(), 5);

        assert_eq!(config.to_generator_config().language, "de");
    }
}
