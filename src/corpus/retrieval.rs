use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

use super::cache::{CorpusCache, DEFAULT_TTL_HOURS};
use super::clock::SystemClock;
use super::filters::apply_filters;
use super::retry::{RetryPolicy, MAX_RETRIES};
use super::transport::{parse_rows_response, RowTransport, RowsRequest};
use super::{Book, CorpusSource, SearchArgs};
use crate::error::ClozeError;

/// 默认行接口地址
pub const DEFAULT_ENDPOINT: &str = "https://datasets-server.huggingface.co/rows";
/// 默认数据集
pub const DEFAULT_DATASET: &str = "manu/project_gutenberg";
/// 未指定 limit 时的分页长度
pub const DEFAULT_PAGE_LENGTH: usize = 100;

/// 检索配置
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalConfig {
    pub endpoint: String,
    pub dataset: String,
    pub config: String,
    /// 可选的 Bearer 凭证
    pub bearer_token: Option<String>,
    pub max_retries: u32,
    pub base_delay: Duration,
    pub request_timeout: Duration,
    pub cache_ttl: chrono::Duration,
}

impl RetrievalConfig {
    /// 从环境变量读取凭证，其余字段使用默认值
    pub fn from_env() -> Self {
        let bearer_token = std::env::var("HF_TOKEN")
            .or_else(|_| std::env::var("HUGGINGFACE_TOKEN"))
            .ok()
            .filter(|t| !t.trim().is_empty());

        Self {
            bearer_token,
            ..Self::default()
        }
    }

    /// 格式正确的凭证
    ///
    /// 格式不正确时视为未配置，直接匿名请求
    pub fn usable_token(&self) -> Option<&str> {
        let token = self.bearer_token.as_deref()?.trim();
        if is_well_formed_token(token) {
            Some(token)
        } else {
            None
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.base_delay)
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
            config: "default".to_string(),
            bearer_token: None,
            max_retries: MAX_RETRIES,
            base_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            cache_ttl: chrono::Duration::hours(DEFAULT_TTL_HOURS),
        }
    }
}

/// 凭证格式检查：`hf_` 前缀，只含字母数字和下划线
pub fn is_well_formed_token(token: &str) -> bool {
    token.starts_with("hf_")
        && token.len() >= 8
        && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// 远程语料检索
///
/// 缓存检查 -> 带重试的分页请求 -> 解析 -> 过滤 -> 写入缓存
pub struct CorpusRetrieval<T: RowTransport> {
    transport: T,
    cache: Arc<CorpusCache>,
    config: RetrievalConfig,
    policy: RetryPolicy,
}

impl<T: RowTransport> CorpusRetrieval<T> {
    /// 创建检索器，使用系统时钟和配置中的缓存有效期
    pub fn new(transport: T, config: RetrievalConfig) -> Self {
        let cache = Arc::new(CorpusCache::new(config.cache_ttl, Arc::new(SystemClock)));
        Self::with_cache(transport, config, cache)
    }

    /// 使用共享缓存创建检索器
    pub fn with_cache(transport: T, config: RetrievalConfig, cache: Arc<CorpusCache>) -> Self {
        let policy = config.retry_policy();
        Self {
            transport,
            cache,
            config,
            policy,
        }
    }

    pub fn cache(&self) -> &Arc<CorpusCache> {
        &self.cache
    }

    fn build_request(&self, args: &SearchArgs) -> RowsRequest {
        RowsRequest {
            endpoint: self.config.endpoint.clone(),
            dataset: self.config.dataset.clone(),
            config: self.config.config.clone(),
            split: args.split().to_string(),
            offset: args.offset.unwrap_or(0),
            length: args.limit.unwrap_or(DEFAULT_PAGE_LENGTH),
        }
    }

    /// 单次尝试
    ///
    /// 带凭证请求遇到 401/403 时，同一次尝试内去掉凭证再请求一次
    async fn fetch_once(&self, request: &RowsRequest, attempt: u32) -> Result<Vec<Book>, ClozeError> {
        let token = self.config.usable_token();
        let mut reply = self.transport.fetch(request, token).await?;

        if reply.is_auth_failure() && token.is_some() {
            warn!(
                "第 {} 次尝试鉴权失败 (HTTP {})，改为匿名请求",
                attempt, reply.status
            );
            reply = self.transport.fetch(request, None).await?;
        }

        if reply.is_auth_failure() {
            return Err(ClozeError::Auth {
                status: reply.status,
            });
        }
        if !reply.is_success() {
            return Err(ClozeError::TransientFetch(format!("HTTP {}", reply.status)));
        }

        let books = parse_rows_response(&reply.body)?;
        // 空结果同样消耗一次重试机会
        if books.is_empty() {
            return Err(ClozeError::NoCandidate(format!(
                "第 {} 次尝试没有解析出有效书籍",
                attempt
            )));
        }

        debug!("第 {} 次尝试解析出 {} 本书", attempt, books.len());
        Ok(books)
    }
}

impl<T: RowTransport> CorpusSource for CorpusRetrieval<T> {
    async fn search(&self, args: &SearchArgs) -> Result<Arc<Vec<Book>>, ClozeError> {
        let key = args.cache_key();
        if let Some(books) = self.cache.get(&key) {
            return Ok(books);
        }

        let request = self.build_request(args);
        info!(
            "从远程数据集检索: split={} offset={} length={}",
            request.split, request.offset, request.length
        );

        let request = &request;
        let books = self
            .policy
            .run(
                move |attempt| self.fetch_once(request, attempt),
                tokio::time::sleep,
            )
            .await?;

        let filtered = apply_filters(books, args);
        info!("检索完成，{} 本书符合条件", filtered.len());
        Ok(self.cache.put(&key, filtered))
    }
}
