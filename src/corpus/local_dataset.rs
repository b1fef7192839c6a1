use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use super::cache::CorpusCache;
use super::filters::apply_filters;
use super::transport::{HeaderLabels, RawBook};
use super::{Book, CorpusSource, SearchArgs};
use crate::error::ClozeError;

/// 本地数据集
///
/// 从磁盘读取与行记录同结构的 JSON 数组，只读
pub struct LocalDataset {
    path: PathBuf,
    cache: Arc<CorpusCache>,
}

impl LocalDataset {
    /// 创建本地数据集
    ///
    /// # 参数
    /// - `path`: JSON 文件路径
    /// - `cache`: 共享缓存
    pub fn new(path: impl Into<PathBuf>, cache: Arc<CorpusCache>) -> Self {
        Self {
            path: path.into(),
            cache,
        }
    }

    /// 检测文件编码
    ///
    /// 依次检查 BOM、UTF-8，最后按 Windows-1252 处理
    ///
    /// # 参数
    /// - `bytes`: 文件字节数据
    ///
    /// # 返回
    /// 检测到的编码
    fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
        if let Some((encoding, _bom_length)) = Encoding::for_bom(bytes) {
            return encoding;
        }

        if std::str::from_utf8(bytes).is_ok() {
            return UTF_8;
        }

        WINDOWS_1252
    }

    /// 读取并解析整个文件
    async fn load(&self) -> Result<Vec<Book>, ClozeError> {
        let bytes = tokio::fs::read(&self.path).await?;

        let encoding = Self::detect_encoding(&bytes);
        let (content, encoding_used, had_errors) = encoding.decode(&bytes);
        if had_errors {
            warn!(
                "本地数据集按 {} 解码时出现错误，可能存在乱码",
                encoding_used.name()
            );
        }

        let raw: Vec<RawBook> = serde_json::from_str(&content)?;
        let labels = HeaderLabels::new();
        let books: Vec<Book> = raw
            .into_iter()
            .filter_map(|record| record.into_book(&labels))
            .collect();

        info!("从 {} 读取 {} 本书", self.path.display(), books.len());
        Ok(books)
    }
}

impl CorpusSource for LocalDataset {
    async fn search(&self, args: &SearchArgs) -> Result<Arc<Vec<Book>>, ClozeError> {
        let key = format!("local:{}:{}", self.path.display(), args.cache_key());
        if let Some(books) = self.cache.get(&key) {
            return Ok(books);
        }

        let books = self.load().await?;
        if books.is_empty() {
            return Err(ClozeError::NoCandidate(format!(
                "本地数据集 {} 中没有有效书籍",
                self.path.display()
            )));
        }

        let offset = args.offset.unwrap_or(0);
        let page: Vec<Book> = apply_filters(books, args)
            .into_iter()
            .skip(offset)
            .take(args.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(self.cache.put(&key, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::BookId;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_dataset(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    const DATASET: &str = r#"[
        {"id": 11, "title": "Alice's Adventures in Wonderland", "author": "Carroll, Lewis", "text": "Alice was beginning to get very tired.", "bookshelves": ["Children's Literature"]},
        {"id": 35, "text": "Title: The Time Machine\nAuthor: H. G. Wells\n\nThe Time Traveller was expounding.", "subjects": ["Science fiction", "19th century"]},
        {"id": 99, "text": "No title anywhere."}
    ]"#;

    #[test]
    fn test_detect_encoding() {
        assert_eq!(LocalDataset::detect_encoding("plain".as_bytes()), UTF_8);
        assert_eq!(
            LocalDataset::detect_encoding(&[0xEF, 0xBB, 0xBF, b'[', b']']),
            UTF_8
        );
        assert_eq!(LocalDataset::detect_encoding(&[b'c', b'a', b'f', 0xE9]), WINDOWS_1252);
    }

    #[tokio::test]
    async fn test_search_local_dataset() {
        let file = write_dataset(DATASET.as_bytes());
        let dataset = LocalDataset::new(file.path(), Arc::new(CorpusCache::default()));

        let books = dataset.search(&SearchArgs::default()).await.unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[1].title, "The Time Machine");
        assert_eq!(books[1].author, "H. G. Wells");

        let args = SearchArgs {
            century: Some("19".to_string()),
            ..Default::default()
        };
        let books = dataset.search(&args).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, BookId::Number(35));
    }

    #[tokio::test]
    async fn test_cached_result_is_shared() {
        let file = write_dataset(DATASET.as_bytes());
        let dataset = LocalDataset::new(file.path(), Arc::new(CorpusCache::default()));

        let first = dataset.search(&SearchArgs::default()).await.unwrap();
        let second = dataset.search(&SearchArgs::default()).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_windows_1252_text_is_decoded() {
        let mut bytes = br#"[{"id": 7, "title": "Caf"#.to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(br#"", "text": "Body"}]"#);
        let file = write_dataset(&bytes);
        let dataset = LocalDataset::new(file.path(), Arc::new(CorpusCache::default()));

        let books = dataset.search(&SearchArgs::default()).await.unwrap();
        assert_eq!(books[0].title, "Café");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dataset = LocalDataset::new("/nonexistent/books.json", Arc::new(CorpusCache::default()));
        let result = dataset.search(&SearchArgs::default()).await;
        assert!(matches!(result, Err(ClozeError::Io(_))));
    }
}
