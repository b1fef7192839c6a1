use log::debug;
use rand::Rng;

use super::redaction_selector::{RedactionSelector, SelectionMode};

/// 段落至少需要的词数，不足的段落不挖空
pub const MIN_WORDS_FOR_BLANKS: usize = 5;

/// 第一轮分配结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// 每个段落分到的空格数
    pub per_paragraph: Vec<usize>,
    /// 第一轮后剩余的预算，交给第一个合格段落补选
    pub leftover: usize,
}

/// Blank Distributor
/// 把空格预算分配到各个段落
pub struct BlankDistributor {
    min_words: usize,
}

impl BlankDistributor {
    pub fn new() -> Self {
        Self {
            min_words: MIN_WORDS_FOR_BLANKS,
        }
    }

    /// 第一轮分配
    ///
    /// 每个合格段落分到 min(剩余, max(1, 总数 / 合格段落数))
    ///
    /// # 参数
    /// - `word_counts`: 各段落词数
    /// - `blanks`: 空格总数
    pub fn allocate(&self, word_counts: &[usize], blanks: usize) -> Allocation {
        let qualifying = word_counts.iter().filter(|&&n| n >= self.min_words).count();
        let mut per_paragraph = vec![0; word_counts.len()];
        if qualifying == 0 {
            return Allocation {
                per_paragraph,
                leftover: blanks,
            };
        }

        let share = (blanks / qualifying).max(1);
        let mut remaining = blanks;

        for (slot, &count) in per_paragraph.iter_mut().zip(word_counts) {
            if count < self.min_words {
                continue;
            }
            let allotted = remaining.min(share);
            *slot = allotted;
            remaining -= allotted;
        }

        Allocation {
            per_paragraph,
            leftover: remaining,
        }
    }

    /// 分配并选词
    ///
    /// 第一轮按分配结果选词；选出的总数不足时，按段落顺序从第一个合格段落开始补选
    ///
    /// # 参数
    /// - `selector`: 选词器
    /// - `paragraphs`: 已分词的段落
    /// - `blanks`: 空格总数
    /// - `mode`: 选词方式
    /// - `rng`: 随机源
    ///
    /// # 返回
    /// 每个段落中被选中的词下标（升序）
    pub fn distribute<R: Rng>(
        &self,
        selector: &RedactionSelector,
        paragraphs: &[Vec<&str>],
        blanks: usize,
        mode: SelectionMode,
        rng: &mut R,
    ) -> Vec<Vec<usize>> {
        let word_counts: Vec<usize> = paragraphs.iter().map(Vec::len).collect();
        let allocation = self.allocate(&word_counts, blanks);

        let mut selected: Vec<Vec<usize>> = paragraphs
            .iter()
            .zip(&allocation.per_paragraph)
            .map(|(words, &count)| selector.select(words, count, mode, &[], &mut *rng))
            .collect();

        // 分配余量加上各段落没选满的部分
        let unmet: usize = allocation
            .per_paragraph
            .iter()
            .zip(&selected)
            .map(|(&wanted, chosen)| wanted.saturating_sub(chosen.len()))
            .sum();
        let mut shortfall = allocation.leftover + unmet;
        if shortfall > 0 {
            debug!("第一轮后还差 {} 个空格，开始补选", shortfall);
        }

        for (words, chosen) in paragraphs.iter().zip(selected.iter_mut()) {
            if shortfall == 0 {
                break;
            }
            if words.len() < self.min_words {
                continue;
            }

            let extra = selector.select(words, shortfall, mode, chosen, rng);
            shortfall -= extra.len();
            chosen.extend(extra);
            chosen.sort_unstable();
        }

        selected
    }

    /// 把展示段落没能容纳的空格放到后备段落里
    ///
    /// 按顺序逐段补选，补满即停；没有选中任何词的段落不返回
    ///
    /// # 参数
    /// - `selector`: 选词器
    /// - `reserve`: 后备段落（已分词），保持原文顺序
    /// - `shortfall`: 还差的空格数
    /// - `mode`: 选词方式
    /// - `rng`: 随机源
    ///
    /// # 返回
    /// 被使用的后备段落及其选中的下标
    pub fn spill<'a, R: Rng>(
        &self,
        selector: &RedactionSelector,
        reserve: Vec<Vec<&'a str>>,
        mut shortfall: usize,
        mode: SelectionMode,
        rng: &mut R,
    ) -> Vec<(Vec<&'a str>, Vec<usize>)> {
        let mut used = Vec::new();

        for words in reserve {
            if shortfall == 0 {
                break;
            }
            if words.len() < self.min_words {
                continue;
            }

            let chosen = selector.select(&words, shortfall, mode, &[], &mut *rng);
            if chosen.is_empty() {
                continue;
            }
            shortfall -= chosen.len();
            used.push((words, chosen));
        }

        if shortfall > 0 {
            debug!("后备段落用尽，仍差 {} 个空格", shortfall);
        }
        used
    }
}

impl Default for BlankDistributor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passage::types::Difficulty;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_allocate_even_split() {
        let distributor = BlankDistributor::new();
        let allocation = distributor.allocate(&[20, 30], 4);
        assert_eq!(allocation.per_paragraph, vec![2, 2]);
        assert_eq!(allocation.leftover, 0);
    }

    #[test]
    fn test_allocate_leftover_goes_to_top_up() {
        let distributor = BlankDistributor::new();
        let allocation = distributor.allocate(&[20, 30], 3);
        assert_eq!(allocation.per_paragraph, vec![1, 1]);
        assert_eq!(allocation.leftover, 1);
    }

    #[test]
    fn test_allocate_skips_short_paragraphs() {
        let distributor = BlankDistributor::new();
        let allocation = distributor.allocate(&[3, 20, 4, 20], 2);
        assert_eq!(allocation.per_paragraph, vec![0, 1, 0, 1]);

        let allocation = distributor.allocate(&[2, 4], 3);
        assert_eq!(allocation.per_paragraph, vec![0, 0]);
        assert_eq!(allocation.leftover, 3);
    }

    #[test]
    fn test_allocate_fewer_blanks_than_paragraphs() {
        let distributor = BlankDistributor::new();
        let allocation = distributor.allocate(&[20, 20, 20], 1);
        assert_eq!(allocation.per_paragraph, vec![1, 0, 0]);
    }

    #[test]
    fn test_distribute_fills_budget_from_first_paragraph() {
        let distributor = BlankDistributor::new();
        let selector = RedactionSelector::new();
        let mut rng = StdRng::seed_from_u64(11);

        let first: Vec<&str> = "The farmer carried fresh bread across the meadow while his loyal hound chased swallows near the stream"
            .split_whitespace()
            .collect();
        let second: Vec<&str> = "Rain fell softly upon the orchard and the cottage windows glowed".split_whitespace().collect();
        let short: Vec<&str> = vec!["Silence", "followed."];

        let selected = distributor.distribute(
            &selector,
            &[first, short, second],
            3,
            SelectionMode::Calibrated(Difficulty::clamped(1)),
            &mut rng,
        );

        assert_eq!(selected[0].len(), 2);
        assert!(selected[1].is_empty());
        assert_eq!(selected[2].len(), 1);
        assert!(selected[0].windows(2).all(|p| p[1] - p[0] > 1));
    }

    #[test]
    fn test_distribute_never_exceeds_budget() {
        let distributor = BlankDistributor::new();
        let selector = RedactionSelector::new();
        let mut rng = StdRng::seed_from_u64(2);
        let tiny: Vec<&str> = "One small cat sat there".split_whitespace().collect();

        let selected = distributor.distribute(&selector, &[tiny], 10, SelectionMode::Simple, &mut rng);
        let total: usize = selected.iter().map(Vec::len).sum();
        assert!(total <= 10);
        assert!(total <= 5);
    }

    #[test]
    fn test_spill_fills_reserve_in_order() {
        let distributor = BlankDistributor::new();
        let selector = RedactionSelector::new();
        let mut rng = StdRng::seed_from_u64(8);

        let short: Vec<&str> = vec!["Quiet", "now."];
        let first: Vec<&str> = "Seven brown horses grazed beside the mill".split_whitespace().collect();
        let second: Vec<&str> = "Lanterns swung gently above the harbour gates".split_whitespace().collect();
        let third: Vec<&str> = "Nobody noticed the gardener leaving early".split_whitespace().collect();

        let used = distributor.spill(
            &selector,
            vec![short, first.clone(), second.clone(), third],
            8,
            SelectionMode::Simple,
            &mut rng,
        );

        // 第一个合格段落的 7 个词全部选中，第二个补 1 个，第三个用不到
        assert_eq!(used.len(), 2);
        assert_eq!(used[0].0, first);
        assert_eq!(used[1].0, second);
        let total: usize = used.iter().map(|(_, chosen)| chosen.len()).sum();
        assert_eq!(total, 8);
        assert_eq!(used[0].1.len(), 7);
        assert_eq!(used[1].1.len(), 1);
    }

    #[test]
    fn test_spill_with_nothing_owed() {
        let distributor = BlankDistributor::new();
        let selector = RedactionSelector::new();
        let mut rng = StdRng::seed_from_u64(1);
        let words: Vec<&str> = "Seven brown horses grazed beside the mill".split_whitespace().collect();

        let used = distributor.spill(&selector, vec![words], 0, SelectionMode::Simple, &mut rng);
        assert!(used.is_empty());
    }
}
