use log::debug;
use regex::Regex;

use super::types::Difficulty;

/// 段落最短字符数
pub const MIN_PARAGRAPH_CHARS: usize = 150;
/// 最多返回的段落数
pub const MAX_PARAGRAPHS: usize = 12;

/// Paragraph Extractor
/// 从书籍正文中部挑选长度合适的段落
pub struct ParagraphExtractor {
    start_marker_regex: Regex,
    end_marker_regex: Regex,
    boilerplate_regex: Regex,
}

impl ParagraphExtractor {
    pub fn new() -> Self {
        Self {
            start_marker_regex: Regex::new(r"(?mi)^\s*\*{3}\s*START OF.*$").unwrap(),
            end_marker_regex: Regex::new(r"(?mi)^\s*\*{3}\s*END OF.*$").unwrap(),
            boilerplate_regex: Regex::new(
                r"(?i)project gutenberg|gutenberg\.org|https?://|www\.|\bebook\b|copyright|all rights reserved",
            )
            .unwrap(),
        }
    }

    /// 提取候选段落
    ///
    /// # 参数
    /// - `text`: 书籍全文
    /// - `difficulty`: 难度等级，越高允许的段落越长
    ///
    /// # 返回
    /// 按原文顺序排列的段落，空列表表示素材不适用
    pub fn extract(&self, text: &str, difficulty: Difficulty) -> Vec<String> {
        let body = self.strip_boilerplate(text);
        let paragraphs = self.split_into_paragraphs(body);

        // 去掉首尾各 10%
        let skip = paragraphs.len() / 10;
        let interior = &paragraphs[skip..paragraphs.len() - skip];

        let max_chars = Self::max_paragraph_chars(difficulty);
        let kept: Vec<String> = interior
            .iter()
            .filter(|p| {
                let len = p.chars().count();
                (MIN_PARAGRAPH_CHARS..=max_chars).contains(&len)
            })
            .filter(|p| !self.looks_like_boilerplate(p))
            .cloned()
            .collect();

        debug!(
            "共 {} 个段落，中部 {} 个，长度合格 {} 个",
            paragraphs.len(),
            interior.len(),
            kept.len()
        );

        Self::centre_window(kept)
    }

    /// 当前难度允许的最大段落长度
    pub fn max_paragraph_chars(difficulty: Difficulty) -> usize {
        400 + 200 * difficulty.level() as usize
    }

    /// 截掉 `*** START OF` 之前和 `*** END OF` 之后的内容
    fn strip_boilerplate<'a>(&self, text: &'a str) -> &'a str {
        let start = self
            .start_marker_regex
            .find(text)
            .map(|m| m.end())
            .unwrap_or(0);
        let body = &text[start..];

        match self.end_marker_regex.find(body) {
            Some(m) => &body[..m.start()],
            None => body,
        }
    }

    /// 按空行分割段落，段内换行合并为空格
    fn split_into_paragraphs(&self, content: &str) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut current_paragraph = String::new();

        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if !current_paragraph.is_empty() {
                    paragraphs.push(std::mem::take(&mut current_paragraph));
                }
            } else {
                if !current_paragraph.is_empty() {
                    current_paragraph.push(' ');
                }
                current_paragraph.push_str(trimmed);
            }
        }

        if !current_paragraph.is_empty() {
            paragraphs.push(current_paragraph);
        }

        paragraphs
    }

    fn looks_like_boilerplate(&self, paragraph: &str) -> bool {
        if self.boilerplate_regex.is_match(paragraph) {
            return true;
        }

        // 全大写的标题或声明
        let mut letters = paragraph.chars().filter(|c| c.is_alphabetic()).peekable();
        letters.peek().is_some() && letters.all(|c| !c.is_lowercase())
    }

    /// 超过上限时取最靠近中间的一段
    fn centre_window(paragraphs: Vec<String>) -> Vec<String> {
        if paragraphs.len() <= MAX_PARAGRAPHS {
            return paragraphs;
        }

        let start = (paragraphs.len() - MAX_PARAGRAPHS) / 2;
        paragraphs
            .into_iter()
            .skip(start)
            .take(MAX_PARAGRAPHS)
            .collect()
    }
}

impl Default for ParagraphExtractor {
    fn default() -> Self {
        Self::new()
    }
}
