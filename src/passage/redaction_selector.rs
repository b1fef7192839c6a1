use log::debug;
use rand::Rng;
use std::cmp::Ordering;

use super::scoring_engine::WordScorer;
use super::types::{Difficulty, ScoredWord};

/// 候选池大小相对于需求数量的倍数
const POOL_FACTOR: usize = 3;

/// 选词方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// 按目标难度打分
    Calibrated(Difficulty),
    /// 不考虑难度，用于备用段落
    Simple,
}

/// Redaction Selector
/// 从打分结果中随机抽取互不相邻的词作为空格
pub struct RedactionSelector {
    scorer: WordScorer,
}

impl RedactionSelector {
    pub fn new() -> Self {
        Self {
            scorer: WordScorer::new(),
        }
    }

    pub fn scorer(&self) -> &WordScorer {
        &self.scorer
    }

    /// 选出要挖空的词
    ///
    /// # 参数
    /// - `words`: 段落中的词
    /// - `count`: 需要的数量
    /// - `difficulty`: 目标难度
    /// - `rng`: 随机源
    ///
    /// # 返回
    /// 升序排列的词下标
    pub fn select_indices<R: Rng>(
        &self,
        words: &[&str],
        count: usize,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Vec<usize> {
        self.select(words, count, SelectionMode::Calibrated(difficulty), &[], rng)
    }

    /// 在已选下标之外补选
    ///
    /// # 参数
    /// - `words`: 段落中的词
    /// - `count`: 需要补选的数量
    /// - `mode`: 选词方式
    /// - `taken`: 已经选中的下标，新选的词不会与之重复，并尽量不相邻
    /// - `rng`: 随机源
    ///
    /// # 返回
    /// 新选中的下标，升序
    pub fn select<R: Rng>(
        &self,
        words: &[&str],
        count: usize,
        mode: SelectionMode,
        taken: &[usize],
        rng: &mut R,
    ) -> Vec<usize> {
        if words.is_empty() || count == 0 {
            return Vec::new();
        }

        let mut scored = match mode {
            SelectionMode::Calibrated(difficulty) => self.scorer.score_words(words, difficulty, rng),
            SelectionMode::Simple => self.scorer.score_words_simple(words, rng),
        };
        scored.retain(|w| !taken.contains(&w.index));

        let selected = sample_non_adjacent(scored, count, taken, rng);
        debug!("需要 {} 个空格，选中 {:?}", count, selected);
        selected
    }
}

impl Default for RedactionSelector {
    fn default() -> Self {
        Self::new()
    }
}

fn is_adjacent(index: usize, chosen: &[usize]) -> bool {
    chosen.iter().any(|&c| index.abs_diff(c) <= 1)
}

/// 按分数取前 3×count 个作为候选池，随机抽取互不相邻的下标
///
/// 候选池抽完仍未达到数量时，之前因相邻被推迟的词按抽取顺序补上
pub fn sample_non_adjacent<R: Rng>(
    mut scored: Vec<ScoredWord>,
    count: usize,
    taken: &[usize],
    rng: &mut R,
) -> Vec<usize> {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let pool_size = POOL_FACTOR.saturating_mul(count).min(scored.len());
    let mut pool: Vec<usize> = scored.iter().take(pool_size).map(|w| w.index).collect();

    let mut chosen: Vec<usize> = taken.to_vec();
    let mut accepted = Vec::new();
    let mut deferred = Vec::new();

    while accepted.len() < count && !pool.is_empty() {
        let candidate = pool.swap_remove(rng.gen_range(0..pool.len()));
        if is_adjacent(candidate, &chosen) {
            deferred.push(candidate);
        } else {
            chosen.push(candidate);
            accepted.push(candidate);
        }
    }

    for candidate in deferred {
        if accepted.len() >= count {
            break;
        }
        debug!("候选池已用尽，接受相邻的下标 {}", candidate);
        accepted.push(candidate);
    }

    accepted.sort_unstable();
    accepted
}
