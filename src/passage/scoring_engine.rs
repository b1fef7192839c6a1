use rand::Rng;
use regex::Regex;
use std::collections::HashSet;

use super::types::{Difficulty, ScoredWord};

/// 估计难度上限
const MAX_ESTIMATED_DIFFICULTY: u8 = 4;

const FUNCTION_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "if", "of", "at", "by", "for", "with", "about", "to",
    "from", "in", "on", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "shall", "should", "can", "could", "may", "might",
    "must", "that", "which", "who", "whom", "whose", "this", "these", "those", "am", "i", "we",
    "you", "he", "she", "they", "it",
];

const COMMON_WORDS: &[&str] = &[
    "not", "also", "as", "his", "her", "him", "them", "their", "there", "then", "than", "what",
    "when", "where", "why", "how", "all", "any", "some", "one", "two", "out", "up", "down",
    "into", "over", "under", "again", "here", "very", "just", "so", "no", "yes", "my", "your",
    "our", "its", "me", "us", "said", "say", "says", "came", "come", "went", "go", "goes",
    "get", "got", "make", "made", "know", "knew", "see", "saw", "seen", "look", "looked",
    "like", "time", "day", "man", "men", "way", "little", "good", "great", "old", "new",
    "long", "first", "last", "other", "more", "most", "much", "many", "such", "only", "own",
    "same", "each", "every", "now", "well", "even", "back", "still", "never", "always", "upon",
    "after", "before", "through", "thing", "things", "away", "once", "too",
];

/// 拆分出词首标点、词干和词尾标点
///
/// 词干从第一个字母或数字开始，到最后一个字母或数字结束
pub fn split_token(token: &str) -> (&str, &str, &str) {
    let start = token
        .char_indices()
        .find(|(_, c)| c.is_alphanumeric())
        .map(|(i, _)| i);
    let end = token
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_alphanumeric())
        .map(|(i, c)| i + c.len_utf8());

    match (start, end) {
        (Some(start), Some(end)) => (&token[..start], &token[start..end], &token[end..]),
        _ => (token, "", ""),
    }
}

/// 去掉首尾标点后的词干
pub fn word_core(token: &str) -> &str {
    split_token(token).1
}

/// Word Scorer
/// 按目标难度给词打分，分数越高越适合挖空
pub struct WordScorer {
    function_words: HashSet<&'static str>,
    common_words: HashSet<&'static str>,
    sentence_end_regex: Regex,
}

impl WordScorer {
    pub fn new() -> Self {
        Self {
            function_words: FUNCTION_WORDS.iter().copied().collect(),
            common_words: COMMON_WORDS.iter().copied().collect(),
            // 句末标点后可以跟引号或右括号
            sentence_end_regex: Regex::new(r#"[.!?]["'”’)\]]*$"#).unwrap(),
        }
    }

    pub fn is_function_word(&self, word: &str) -> bool {
        self.function_words.contains(word_core(word).to_lowercase().as_str())
    }

    pub fn is_common_word(&self, word: &str) -> bool {
        self.common_words.contains(word_core(word).to_lowercase().as_str())
    }

    /// 不能作为空格的词
    ///
    /// 空词、含非拉丁字母、含破折号、词干不足 3 个字符
    pub fn is_excluded(&self, token: &str) -> bool {
        if token.contains('—') || token.contains('–') {
            return true;
        }

        let core = word_core(token);
        if core.chars().count() < 3 {
            return true;
        }

        core.chars().any(|c| c.is_alphabetic() && c > '\u{024F}')
    }

    /// 估计词的难度（1-4）
    ///
    /// # 参数
    /// - `core`: 小写词干
    pub fn estimate_difficulty(&self, core: &str) -> u8 {
        if self.function_words.contains(core) {
            return 1;
        }
        if self.common_words.contains(core) {
            return 2;
        }

        let len = core.chars().count();
        let mut estimate = 1;
        if len >= 8 {
            estimate += 1;
        }
        if len >= 12 {
            estimate += 1;
        }
        if has_doubled_vowel(core) {
            estimate += 1;
        }
        if core.contains("tion") || core.contains("sion") {
            estimate += 1;
        }

        estimate.min(MAX_ESTIMATED_DIFFICULTY)
    }

    /// 位置 0 或紧跟句末标点的词视为句首
    pub fn is_sentence_start(&self, words: &[&str], index: usize) -> bool {
        index == 0 || self.sentence_end_regex.is_match(words[index - 1])
    }

    /// 给段落中的词打分
    ///
    /// # 参数
    /// - `words`: 按空白分割的词
    /// - `difficulty`: 目标难度
    /// - `rng`: 随机源，用于打破平局
    ///
    /// # 返回
    /// 未被排除的词及其分数，按原顺序
    pub fn score_words<R: Rng>(
        &self,
        words: &[&str],
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Vec<ScoredWord> {
        let target = difficulty.level() as i32;

        words
            .iter()
            .enumerate()
            .filter(|(_, word)| !self.is_excluded(word))
            .map(|(index, word)| {
                let core = word_core(word);
                let lower = core.to_lowercase();
                let len = core.chars().count();

                let mut score = 2.0 * len as f64;
                let estimated_difficulty = self.estimate_difficulty(&lower);

                if self.function_words.contains(lower.as_str()) {
                    score -= 15.0;
                } else if self.common_words.contains(lower.as_str()) {
                    score -= 5.0;
                }

                score += match (target - estimated_difficulty as i32).abs() {
                    0 => 20.0,
                    1 => 10.0,
                    2 => 0.0,
                    _ => -10.0,
                };

                if target <= 2 {
                    if len <= 6 {
                        score += 10.0;
                    }
                    if len > 10 {
                        score -= 15.0;
                    }
                } else if target >= 4 {
                    if len >= 8 {
                        score += 10.0;
                    }
                    if len < 5 {
                        score -= 10.0;
                    }
                }

                // 句中大写词多半是专有名词
                if starts_uppercase(core) && !self.is_sentence_start(words, index) {
                    score -= if target <= 2 { 20.0 } else { 10.0 };
                }

                score += rng.gen_range(0.0..3.0);

                ScoredWord {
                    index,
                    word: core.to_string(),
                    score,
                    estimated_difficulty,
                }
            })
            .collect()
    }

    /// 不考虑难度的简单打分，用于备用段落
    ///
    /// 2 × 词长，虚词 -10，再加 0-2 的随机扰动
    pub fn score_words_simple<R: Rng>(&self, words: &[&str], rng: &mut R) -> Vec<ScoredWord> {
        words
            .iter()
            .enumerate()
            .filter(|(_, word)| !self.is_excluded(word))
            .map(|(index, word)| {
                let core = word_core(word);
                let lower = core.to_lowercase();
                let mut score = 2.0 * core.chars().count() as f64;
                if self.function_words.contains(lower.as_str()) {
                    score -= 10.0;
                }
                score += rng.gen_range(0.0..2.0);

                ScoredWord {
                    index,
                    word: core.to_string(),
                    score,
                    estimated_difficulty: self.estimate_difficulty(&lower),
                }
            })
            .collect()
    }
}

impl Default for WordScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn has_doubled_vowel(word: &str) -> bool {
    ["aa", "ee", "ii", "oo", "uu"]
        .iter()
        .any(|pair| word.contains(pair))
}

fn starts_uppercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn score_of(scored: &[ScoredWord], index: usize) -> f64 {
        scored.iter().find(|w| w.index == index).unwrap().score
    }

    #[test]
    fn test_split_token() {
        assert_eq!(split_token("\"Hello,"), ("\"", "Hello", ","));
        assert_eq!(split_token("river."), ("", "river", "."));
        assert_eq!(split_token("farmer's"), ("", "farmer's", ""));
        assert_eq!(split_token("..."), ("...", "", ""));
        assert_eq!(word_core("(café)"), "café");
    }

    #[test]
    fn test_exclusions() {
        let scorer = WordScorer::new();
        assert!(scorer.is_excluded(""));
        assert!(scorer.is_excluded("to,"));
        assert!(scorer.is_excluded("well—known"));
        assert!(scorer.is_excluded("1900–1910"));
        assert!(scorer.is_excluded("Москва"));
        assert!(!scorer.is_excluded("café"));
        assert!(!scorer.is_excluded("river."));
    }

    #[test]
    fn test_estimate_difficulty() {
        let scorer = WordScorer::new();
        assert_eq!(scorer.estimate_difficulty("the"), 1);
        assert_eq!(scorer.estimate_difficulty("little"), 2);
        assert_eq!(scorer.estimate_difficulty("river"), 1);
        assert_eq!(scorer.estimate_difficulty("mountain"), 2);
        assert_eq!(scorer.estimate_difficulty("bookkeepers"), 3);
        assert_eq!(scorer.estimate_difficulty("information"), 3);
        // 长度、双元音和 -tion 全部命中时封顶为 4
        assert_eq!(scorer.estimate_difficulty("coordination"), 4);
    }

    #[test]
    fn test_function_words_score_low() {
        let scorer = WordScorer::new();
        let mut rng = StdRng::seed_from_u64(7);
        let words = vec!["They", "walked", "with", "their", "basket"];
        let scored = scorer.score_words(&words, Difficulty::clamped(1), &mut rng);

        assert!(score_of(&scored, 1) > score_of(&scored, 2) + 3.0);
        assert!(score_of(&scored, 4) > score_of(&scored, 0) + 3.0);
    }

    #[test]
    fn test_proper_noun_penalty() {
        let scorer = WordScorer::new();
        let mut rng = StdRng::seed_from_u64(1);
        let words = vec!["She", "met", "Thomas", "by", "the", "river.", "Thomas", "smiled."];
        let scored = scorer.score_words(&words, Difficulty::clamped(1), &mut rng);

        assert!(!scorer.is_sentence_start(&words, 2));
        assert!(scorer.is_sentence_start(&words, 6));
        // 句中 -20，句首不扣分，扰动最多 3
        assert!(score_of(&scored, 6) - score_of(&scored, 2) > 17.0);

        // 难度 3 及以上只扣 10
        let scored = scorer.score_words(&words, Difficulty::clamped(3), &mut rng);
        let gap = score_of(&scored, 6) - score_of(&scored, 2);
        assert!(gap > 7.0 && gap < 13.0, "gap {}", gap);
    }

    #[test]
    fn test_sentence_start_after_quote() {
        let scorer = WordScorer::new();
        let words = vec!["\"Stop!\"", "Martha", "cried."];
        assert!(scorer.is_sentence_start(&words, 1));
    }

    #[test]
    fn test_high_difficulty_prefers_long_words() {
        let scorer = WordScorer::new();
        let mut rng = StdRng::seed_from_u64(3);
        let words = vec!["the", "extraordinary", "cat", "pondered", "consolidation"];
        let scored = scorer.score_words(&words, Difficulty::clamped(5), &mut rng);

        assert!(score_of(&scored, 4) > score_of(&scored, 2) + 3.0);
        assert!(score_of(&scored, 1) > score_of(&scored, 0) + 3.0);
    }

    #[test]
    fn test_low_difficulty_penalizes_very_long_words() {
        let scorer = WordScorer::new();
        let mut rng = StdRng::seed_from_u64(6);
        // 两个词的估计难度都是 2，11 个字符的词在低难度下扣 15
        let words = vec!["carpenters", "blacksmiths"];
        assert_eq!(scorer.estimate_difficulty("carpenters"), 2);
        assert_eq!(scorer.estimate_difficulty("blacksmiths"), 2);

        for level in [1, 2] {
            let scored = scorer.score_words(&words, Difficulty::clamped(level), &mut rng);
            assert!(score_of(&scored, 0) - score_of(&scored, 1) > 10.0);
        }

        let scored = scorer.score_words(&words, Difficulty::clamped(3), &mut rng);
        assert!(score_of(&scored, 1) > score_of(&scored, 0) - 1.0);
    }

    #[test]
    fn test_simple_scoring_skips_excluded() {
        let scorer = WordScorer::new();
        let mut rng = StdRng::seed_from_u64(3);
        let words = vec!["A", "quiet", "—", "harbour", "of", "boats"];
        let scored = scorer.score_words_simple(&words, &mut rng);
        let indices: Vec<usize> = scored.iter().map(|w| w.index).collect();
        assert_eq!(indices, vec![1, 3, 5]);
    }
}
