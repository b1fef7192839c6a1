use log::debug;
use regex::Regex;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

use super::{Book, BookId, UNKNOWN_AUTHOR, UNKNOWN_TITLE};
use crate::error::ClozeError;

/// 扫描标题/作者标签的最大行数
const HEADER_SCAN_LINES: usize = 20;

/// 分页行请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowsRequest {
    pub endpoint: String,
    pub dataset: String,
    pub config: String,
    pub split: String,
    pub offset: usize,
    pub length: usize,
}

impl RowsRequest {
    /// 查询参数列表
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("dataset", self.dataset.clone()),
            ("config", self.config.clone()),
            ("split", self.split.clone()),
            ("offset", self.offset.to_string()),
            ("length", self.length.to_string()),
        ]
    }
}

/// 传输层响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    pub status: u16,
    pub body: String,
}

impl TransportReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_auth_failure(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

/// 行数据传输
///
/// 只负责发送一次请求，重试与鉴权回退由检索层处理
pub trait RowTransport {
    /// 发送请求
    ///
    /// # 参数
    /// - `request`: 分页行请求
    /// - `bearer`: 可选的 Bearer 凭证
    ///
    /// # 返回
    /// 状态码和响应体；网络层失败返回 `TransientFetch`
    fn fetch(
        &self,
        request: &RowsRequest,
        bearer: Option<&str>,
    ) -> impl Future<Output = Result<TransportReply, ClozeError>>;
}

/// 基于 reqwest 的 HTTP 传输
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// 创建 HTTP 传输
    ///
    /// # 参数
    /// - `timeout`: 单次请求超时
    pub fn new(timeout: Duration) -> Result<Self, ClozeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClozeError::TransientFetch(format!("初始化 HTTP 客户端失败: {}", e)))?;
        Ok(Self { client })
    }
}

impl RowTransport for HttpTransport {
    async fn fetch(
        &self,
        request: &RowsRequest,
        bearer: Option<&str>,
    ) -> Result<TransportReply, ClozeError> {
        debug!(
            "请求语料: {} split={} offset={} length={} 凭证={}",
            request.endpoint,
            request.split,
            request.offset,
            request.length,
            bearer.is_some()
        );

        let mut builder = self
            .client
            .get(&request.endpoint)
            .query(&request.query_pairs());
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ClozeError::TransientFetch(format!("请求发送失败: {}", e)))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClozeError::TransientFetch(format!("读取响应失败: {}", e)))?;

        Ok(TransportReply { status, body })
    }
}

#[derive(Debug, Deserialize)]
struct RowsResponse {
    rows: Vec<RowEnvelope>,
}

#[derive(Debug, Deserialize)]
struct RowEnvelope {
    row: RawBook,
}

/// 数据集中的原始记录，字段都可能缺失
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBook {
    #[serde(default)]
    pub id: Option<BookId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub subjects: Option<Vec<String>>,
    #[serde(default)]
    pub bookshelves: Option<Vec<String>>,
}

impl RawBook {
    /// 转换为书籍
    ///
    /// 缺少正文、ID 或无法确定标题的记录返回 None
    pub fn into_book(self, labels: &HeaderLabels) -> Option<Book> {
        let id = self.id?;
        let text = self.text.filter(|t| !t.trim().is_empty())?;

        let title = non_empty(self.title)
            .or_else(|| labels.find_title(&text))
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        if title == UNKNOWN_TITLE {
            return None;
        }

        let author = non_empty(self.author)
            .or_else(|| labels.find_author(&text))
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        Some(Book {
            id,
            title,
            author,
            text,
            subjects: self.subjects.unwrap_or_default(),
            bookshelves: self.bookshelves.unwrap_or_default(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 正文开头的 `Title:` / `Author:` 标签
pub struct HeaderLabels {
    title_regex: Regex,
    author_regex: Regex,
}

impl HeaderLabels {
    pub fn new() -> Self {
        Self {
            title_regex: Regex::new(r"^\s*Title:\s*(.+?)\s*$").unwrap(),
            author_regex: Regex::new(r"^\s*Author:\s*(.+?)\s*$").unwrap(),
        }
    }

    /// 在前 20 行中查找标题
    pub fn find_title(&self, text: &str) -> Option<String> {
        Self::scan(&self.title_regex, text)
    }

    /// 在前 20 行中查找作者
    pub fn find_author(&self, text: &str) -> Option<String> {
        Self::scan(&self.author_regex, text)
    }

    fn scan(regex: &Regex, text: &str) -> Option<String> {
        text.lines()
            .take(HEADER_SCAN_LINES)
            .find_map(|line| regex.captures(line))
            .map(|caps| caps[1].to_string())
    }
}

impl Default for HeaderLabels {
    fn default() -> Self {
        Self::new()
    }
}

/// 解析行响应
///
/// # 参数
/// - `body`: 响应体
///
/// # 返回
/// 有效书籍列表（可能为空）；结构不符时返回 `MalformedResponse`
pub fn parse_rows_response(body: &str) -> Result<Vec<Book>, ClozeError> {
    let response: RowsResponse = serde_json::from_str(body)
        .map_err(|e| ClozeError::MalformedResponse(e.to_string()))?;
    let labels = HeaderLabels::new();
    let total = response.rows.len();

    let books: Vec<Book> = response
        .rows
        .into_iter()
        .filter_map(|envelope| envelope.row.into_book(&labels))
        .collect();

    if books.len() < total {
        debug!("丢弃了 {} 条不完整的记录", total - books.len());
    }

    Ok(books)
}
