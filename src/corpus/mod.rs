// Corpus 模块
// 负责从 Project Gutenberg 数据集检索候选书籍

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::ClozeError;

pub mod cache;
pub mod clock;
pub mod filters;
pub mod local_dataset;
pub mod retrieval;
pub mod retry;
pub mod transport;

pub use cache::CorpusCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use local_dataset::LocalDataset;
pub use retrieval::{CorpusRetrieval, RetrievalConfig};
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, RowTransport, RowsRequest, TransportReply};

/// 标题缺失时的占位值
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// 作者缺失时的占位值
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// 数据集支持的语言分区
pub const SUPPORTED_LANGUAGES: [&str; 11] =
    ["en", "de", "es", "fr", "it", "nl", "pl", "pt", "ru", "sv", "zh"];

/// 书籍 ID
///
/// 数据集中的 ID 既可能是数字，也可能是 "41496-8" 这样的字符串
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookId {
    Number(u64),
    Text(String),
}

impl BookId {
    /// 备用段落使用的 ID
    pub fn fallback() -> Self {
        BookId::Number(0)
    }

    /// 是否为有效的 Gutenberg ID（非 0、非空）
    pub fn is_known(&self) -> bool {
        match self {
            BookId::Number(n) => *n != 0,
            BookId::Text(s) => !s.trim().is_empty() && s.trim() != "0",
        }
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookId::Number(n) => write!(f, "{}", n),
            BookId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for BookId {
    fn from(value: u64) -> Self {
        BookId::Number(value)
    }
}

impl From<&str> for BookId {
    fn from(value: &str) -> Self {
        BookId::Text(value.to_string())
    }
}

/// 书籍
///
/// 检索成功后创建，之后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub text: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub bookshelves: Vec<String>,
}

impl Book {
    /// Gutenberg 书籍页面地址
    pub fn canonical_url(&self) -> Option<String> {
        canonical_url(&self.id)
    }
}

/// 根据 ID 生成 Gutenberg 书籍页面地址
pub fn canonical_url(id: &BookId) -> Option<String> {
    if id.is_known() {
        Some(format!("https://www.gutenberg.org/ebooks/{}", id))
    } else {
        None
    }
}

/// 检索参数
///
/// 字段顺序固定，序列化结果即为缓存键
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchArgs {
    pub bookshelf: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub century: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub exclude_ids: Vec<BookId>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl SearchArgs {
    /// 计算缓存键
    pub fn cache_key(&self) -> String {
        // 结构体字段都是可序列化的基础类型，序列化不会失败
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    /// 解析语言分区，未知语言回退到 en
    pub fn split(&self) -> &str {
        match self.language.as_deref() {
            Some(lang) => SUPPORTED_LANGUAGES
                .iter()
                .find(|l| l.eq_ignore_ascii_case(lang))
                .copied()
                .unwrap_or("en"),
            None => "en",
        }
    }
}

/// 语料来源
///
/// 远程检索与本地数据集都实现此 trait
pub trait CorpusSource {
    /// 检索符合条件的书籍
    ///
    /// # 参数
    /// - `args`: 检索参数
    ///
    /// # 返回
    /// 过滤后的书籍列表（缓存命中时返回同一份数据）
    fn search(
        &self,
        args: &SearchArgs,
    ) -> impl Future<Output = Result<Arc<Vec<Book>>, ClozeError>>;
}
