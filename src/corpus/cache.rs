use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::clock::{Clock, SystemClock};
use super::Book;

/// 默认缓存有效期：24 小时
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// 缓存条目
///
/// 插入后不再修改，刷新时整体覆盖
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// 缓存的书籍列表
    pub data: Arc<Vec<Book>>,
    /// 写入时间
    pub timestamp: DateTime<Utc>,
}

/// 语料缓存
///
/// 进程内共享的 key -> 书籍列表 存储，只在读取时检查有效期。
/// 没有容量上限，条目只会被同 key 的新数据覆盖。
pub struct CorpusCache {
    /// 缓存条目（key -> entry）
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
    /// 有效期
    ttl: Duration,
    /// 时钟
    clock: Arc<dyn Clock>,
}

impl CorpusCache {
    /// 创建新的缓存
    ///
    /// # 参数
    /// - `ttl`: 条目有效期
    /// - `clock`: 时钟
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    /// 读取缓存
    ///
    /// 条目不存在或已过期时返回 None
    ///
    /// # 参数
    /// - `key`: 缓存键
    ///
    /// # 返回
    /// 命中时返回与写入时同一份数据
    pub fn get(&self, key: &str) -> Option<Arc<Vec<Book>>> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(key)?;
        let age = self.clock.now() - entry.timestamp;

        if age < self.ttl {
            debug!("语料缓存命中: {} (已缓存 {} 秒)", key, age.num_seconds());
            Some(Arc::clone(&entry.data))
        } else {
            debug!("语料缓存已过期: {}", key);
            None
        }
    }

    /// 写入缓存
    ///
    /// # 参数
    /// - `key`: 缓存键
    /// - `books`: 书籍列表
    ///
    /// # 返回
    /// 写入后的共享数据
    pub fn put(&self, key: &str, books: Vec<Book>) -> Arc<Vec<Book>> {
        let data = Arc::new(books);
        let entry = CacheEntry {
            data: Arc::clone(&data),
            timestamp: self.clock.now(),
        };

        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), entry);
            }
            Err(e) => warn!("锁定语料缓存失败: {}", e),
        }

        data
    }

    /// 缓存条目数量（包括已过期但未被覆盖的条目）
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// 缓存是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 有效期
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for CorpusCache {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_TTL_HOURS), Arc::new(SystemClock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::clock::ManualClock;
    use crate::corpus::BookId;

    fn create_test_book(id: u64) -> Book {
        Book {
            id: BookId::Number(id),
            title: format!("Book {}", id),
            author: "Test Author".to_string(),
            text: "text".to_string(),
            subjects: vec![],
            bookshelves: vec![],
        }
    }

    fn create_test_cache() -> (CorpusCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = CorpusCache::new(Duration::hours(24), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_cache_creation() {
        let cache = CorpusCache::default();
        assert!(cache.is_empty());
        assert_eq!(cache.ttl(), Duration::hours(24));
    }

    #[test]
    fn test_put_get_returns_same_allocation() {
        let (cache, _clock) = create_test_cache();
        let stored = cache.put("k", vec![create_test_book(1)]);

        let hit = cache.get("k").unwrap();
        assert!(Arc::ptr_eq(&stored, &hit));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_key() {
        let (cache, _clock) = create_test_cache();
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let (cache, clock) = create_test_cache();
        cache.put("k", vec![create_test_book(1)]);

        clock.advance(Duration::hours(23));
        assert!(cache.get("k").is_some());

        clock.advance(Duration::hours(1));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_put_overwrites_wholesale() {
        let (cache, clock) = create_test_cache();
        let first = cache.put("k", vec![create_test_book(1)]);
        clock.advance(Duration::hours(25));

        let second = cache.put("k", vec![create_test_book(2), create_test_book(3)]);
        let hit = cache.get("k").unwrap();

        assert!(Arc::ptr_eq(&second, &hit));
        assert_eq!(hit.len(), 2);
        // 旧数据本身没有被修改
        assert_eq!(first.len(), 1);
        assert_eq!(cache.len(), 1);
    }
}
