use log::info;
use rand::Rng;
use regex::Regex;

use super::blank_distributor::BlankDistributor;
use super::passage_assembler::assemble;
use super::redaction_selector::{RedactionSelector, SelectionMode};
use super::types::{PassageMetadata, PassageResult};
use crate::error::ClozeError;

/// 备用段落的分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackCategory {
    Adventure,
    Science,
    General,
}

/// 预置的三段式段落
#[derive(Debug, Clone)]
pub struct CuratedPassage {
    pub category: FallbackCategory,
    pub title: &'static str,
    pub author: &'static str,
    pub paragraphs: [&'static str; 3],
}

const COLLECTION_AUTHOR: &str = "Cloze Reader Collection";

fn curated_passages() -> Vec<CuratedPassage> {
    vec![
        CuratedPassage {
            category: FallbackCategory::Adventure,
            title: "The Mountain Pass",
            author: COLLECTION_AUTHOR,
            paragraphs: [
                "The travellers left the village before dawn, leading their mules along a narrow path that wound between dark pines. \
                 Frost covered the stones, and every breath rose like smoke in the cold air.",
                "By noon they reached the foot of the great cliff. The guide pointed to a thin ledge that crossed the rock face, \
                 and he warned them to keep their eyes on the trail and never look down at the river far below.",
                "When the sun began to sink, they found shelter in a shallow cave. They built a small fire, shared dry bread and \
                 cheese, and listened to the wind howling across the empty ridge until sleep finally came.",
            ],
        },
        CuratedPassage {
            category: FallbackCategory::Science,
            title: "Observations of the Night Sky",
            author: COLLECTION_AUTHOR,
            paragraphs: [
                "On clear evenings the young astronomer carried her telescope to the garden and waited for the last light to fade. \
                 She kept a careful journal, recording the position of each planet and the brightness of every star.",
                "Over many months she noticed that one faint point of light moved slowly against the fixed stars. \
                 Its path did not match any known planet, so she measured its motion night after night with growing excitement.",
                "At last she wrote to the observatory in the city. The director confirmed her calculations and announced that \
                 she had discovered a new comet, which would return to the inner solar system once every seventy years.",
            ],
        },
        CuratedPassage {
            category: FallbackCategory::General,
            title: "The Village Market",
            author: COLLECTION_AUTHOR,
            paragraphs: [
                "Every Saturday morning the square filled with wooden stalls and bright canvas roofs. Farmers arrived with carts \
                 of apples, onions, and fresh eggs, while bakers stacked warm loaves beside jars of golden honey.",
                "Children wandered between the tables, hoping for a sweet plum or a taste of cheese. An old fiddler played near \
                 the fountain, and people dropped copper coins into the battered hat that rested at his feet.",
                "By afternoon the crowd had thinned and the merchants began to pack their goods. The swallows returned to the \
                 rooftops, the shadows grew long, and the quiet square waited patiently for the next market day.",
            ],
        },
    ]
}

/// Fallback Library
/// 语料不可用时使用预置段落生成结果
pub struct FallbackLibrary {
    passages: Vec<CuratedPassage>,
    adventure_regex: Regex,
    science_regex: Regex,
    selector: RedactionSelector,
    distributor: BlankDistributor,
}

impl FallbackLibrary {
    pub fn new() -> Self {
        Self::with_passages(curated_passages())
    }

    pub fn with_passages(passages: Vec<CuratedPassage>) -> Self {
        Self {
            passages,
            adventure_regex: Regex::new(r"(?i)adventure|travel|explor|fiction|480|485|486").unwrap(),
            science_regex: Regex::new(r"(?i)scien|math|nature|astronom|478|459").unwrap(),
            selector: RedactionSelector::new(),
            distributor: BlankDistributor::new(),
        }
    }

    /// 根据分类选择段落
    ///
    /// 没有分类时随机选择；有分类但无法识别时使用通用段落
    fn choose<R: Rng>(&self, category: Option<&str>, rng: &mut R) -> Option<&CuratedPassage> {
        let wanted = match category.map(str::trim).filter(|c| !c.is_empty()) {
            None => {
                if self.passages.is_empty() {
                    return None;
                }
                return self.passages.get(rng.gen_range(0..self.passages.len()));
            }
            Some(c) if self.adventure_regex.is_match(c) => FallbackCategory::Adventure,
            Some(c) if self.science_regex.is_match(c) => FallbackCategory::Science,
            Some(_) => FallbackCategory::General,
        };

        self.passages
            .iter()
            .find(|p| p.category == wanted)
            .or_else(|| self.passages.first())
    }

    /// 生成备用结果
    ///
    /// # 参数
    /// - `category`: 请求的分类
    /// - `blanks`: 空格数
    /// - `rng`: 随机源
    ///
    /// # 返回
    /// ID 为 0 的生成结果；没有可用段落时返回 `Fallback` 错误
    pub fn generate<R: Rng>(
        &self,
        category: Option<&str>,
        blanks: usize,
        rng: &mut R,
    ) -> Result<PassageResult, ClozeError> {
        let passage = self
            .choose(category, rng)
            .ok_or_else(|| ClozeError::Fallback("备用段落库为空".to_string()))?;

        let paragraphs: Vec<Vec<&str>> = passage
            .paragraphs
            .iter()
            .map(|p| p.split_whitespace().collect())
            .collect();
        if paragraphs.iter().all(Vec::is_empty) {
            return Err(ClozeError::Fallback(format!("备用段落《{}》没有内容", passage.title)));
        }

        let selected = self
            .distributor
            .distribute(&self.selector, &paragraphs, blanks, SelectionMode::Simple, rng);

        info!("使用备用段落《{}》", passage.title);
        Ok(assemble(
            &paragraphs,
            &selected,
            PassageMetadata::fallback(passage.title, passage.author),
        ))
    }
}

impl Default for FallbackLibrary {
    fn default() -> Self {
        Self::new()
    }
}
