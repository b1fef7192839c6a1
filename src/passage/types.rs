use serde::{Deserialize, Serialize};

use crate::corpus::{canonical_url, Book, BookId};

/// 难度等级（1-5）
///
/// 反序列化同样经过 `clamped`，超出范围的值不会进入准则表
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// 将任意输入限制到 1-5
    pub fn clamped(level: i64) -> Self {
        Self(level.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    /// 当前等级对应的难度准则
    pub fn guideline(&self) -> &'static DifficultyGuideline {
        &DIFFICULTY_GUIDELINES[(self.0 - 1) as usize]
    }
}

impl From<i64> for Difficulty {
    fn from(level: i64) -> Self {
        Self::clamped(level)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(1)
    }
}

/// 难度准则
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyGuideline {
    /// 平均句长上限（词数）
    pub max_sentence_length: usize,
    /// 偏好词长范围
    pub preferred_word_length_range: (usize, usize),
    /// 复杂词占比范围
    pub complexity_ratio_range: (f64, f64),
}

impl DifficultyGuideline {
    /// 复杂词的最小长度
    pub fn complex_word_threshold(&self) -> usize {
        self.preferred_word_length_range.1.saturating_sub(2)
    }
}

/// 各难度等级的准则表，按等级 1-5 排列
pub const DIFFICULTY_GUIDELINES: [DifficultyGuideline; 5] = [
    DifficultyGuideline {
        max_sentence_length: 18,
        preferred_word_length_range: (3, 10),
        complexity_ratio_range: (0.0, 0.15),
    },
    DifficultyGuideline {
        max_sentence_length: 22,
        preferred_word_length_range: (4, 10),
        complexity_ratio_range: (0.05, 0.25),
    },
    DifficultyGuideline {
        max_sentence_length: 26,
        preferred_word_length_range: (4, 9),
        complexity_ratio_range: (0.15, 0.35),
    },
    DifficultyGuideline {
        max_sentence_length: 32,
        preferred_word_length_range: (5, 9),
        complexity_ratio_range: (0.25, 0.45),
    },
    DifficultyGuideline {
        max_sentence_length: 40,
        preferred_word_length_range: (5, 7),
        complexity_ratio_range: (0.35, 0.60),
    },
];

/// 打分后的候选词
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredWord {
    pub index: usize,
    pub word: String,
    pub score: f64,
    pub estimated_difficulty: u8,
}

/// 答案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub paragraph_index: usize,
    pub word_index: usize,
    pub answer: String,
}

/// 段落元信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassageMetadata {
    pub title: String,
    pub author: String,
    pub id: BookId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
}

impl PassageMetadata {
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            id: book.id.clone(),
            canonical_url: book.canonical_url(),
        }
    }

    /// 备用段落的元信息，ID 固定为 0
    pub fn fallback(title: &str, author: &str) -> Self {
        let id = BookId::fallback();
        Self {
            title: title.to_string(),
            author: author.to_string(),
            canonical_url: canonical_url(&id),
            id,
        }
    }
}

/// 生成结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageResult {
    /// 空格以下划线表示
    pub paragraphs: Vec<String>,
    pub answers: Vec<Answer>,
    pub metadata: PassageMetadata,
}

impl PassageResult {
    pub fn is_fallback(&self) -> bool {
        !self.metadata.id.is_known()
    }
}

/// 生成请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageRequest {
    /// 书架分类，如 "bookshelf/480"
    pub category: Option<String>,
    pub author: Option<String>,
    pub century: Option<String>,
    pub blanks_count: usize,
    pub difficulty: Difficulty,
}

impl Default for PassageRequest {
    fn default() -> Self {
        Self {
            category: None,
            author: None,
            century: None,
            blanks_count: 1,
            difficulty: Difficulty::default(),
        }
    }
}
