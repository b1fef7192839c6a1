use log::debug;
use regex::Regex;

use super::scoring_engine::word_core;
use super::types::DifficultyGuideline;

/// 段落的可读性指标
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadabilityStats {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub complexity_ratio: f64,
}

/// Difficulty Filter
/// 按句长和复杂词占比过滤段落
pub struct DifficultyFilter {
    sentence_end_regex: Regex,
}

impl DifficultyFilter {
    pub fn new() -> Self {
        Self {
            sentence_end_regex: Regex::new(r"[.!?]+").unwrap(),
        }
    }

    /// 计算段落指标
    ///
    /// # 参数
    /// - `paragraph`: 段落文本
    /// - `guideline`: 难度准则，决定复杂词的长度阈值
    pub fn stats(&self, paragraph: &str, guideline: &DifficultyGuideline) -> ReadabilityStats {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        let word_count = words.len();
        let sentence_count = self.sentence_end_regex.find_iter(paragraph).count().max(1);

        let threshold = guideline.complex_word_threshold();
        let complex = words
            .iter()
            .filter(|w| word_core(w).chars().count() >= threshold)
            .count();

        let complexity_ratio = if word_count == 0 {
            0.0
        } else {
            complex as f64 / word_count as f64
        };

        ReadabilityStats {
            word_count,
            sentence_count,
            avg_sentence_length: word_count as f64 / sentence_count as f64,
            complexity_ratio,
        }
    }

    /// 段落是否符合难度准则
    pub fn accepts(&self, paragraph: &str, guideline: &DifficultyGuideline) -> bool {
        let stats = self.stats(paragraph, guideline);
        let (min_ratio, max_ratio) = guideline.complexity_ratio_range;

        stats.word_count > 0
            && stats.avg_sentence_length <= guideline.max_sentence_length as f64
            && stats.complexity_ratio >= min_ratio
            && stats.complexity_ratio <= max_ratio
    }

    /// 过滤段落
    ///
    /// # 参数
    /// - `paragraphs`: 候选段落
    /// - `guideline`: 难度准则
    ///
    /// # 返回
    /// 符合准则的段落，保持原顺序
    pub fn filter(&self, paragraphs: Vec<String>, guideline: &DifficultyGuideline) -> Vec<String> {
        let total = paragraphs.len();
        let kept: Vec<String> = paragraphs
            .into_iter()
            .filter(|p| self.accepts(p, guideline))
            .collect();
        debug!("难度过滤保留 {}/{} 个段落", kept.len(), total);
        kept
    }
}

impl Default for DifficultyFilter {
    fn default() -> Self {
        Self::new()
    }
}
