use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::blank_distributor::BlankDistributor;
use super::difficulty_filter::DifficultyFilter;
use super::fallback_library::FallbackLibrary;
use super::paragraph_extractor::ParagraphExtractor;
use super::passage_assembler::assemble;
use super::redaction_selector::{RedactionSelector, SelectionMode};
use super::types::{PassageMetadata, PassageRequest, PassageResult};
use crate::corpus::filters::parse_bookshelf;
use crate::corpus::{Book, CorpusSource, SearchArgs};
use crate::error::ClozeError;

/// 生成器配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// 一次检索的候选书籍数量
    pub candidate_limit: usize,
    /// 最多尝试的候选书籍数量
    pub max_candidates: usize,
    /// 正文最短字符数
    pub min_text_chars: usize,
    /// 每个结果默认展示的段落数，空格放不下时继续使用后面的段落
    pub paragraphs_per_passage: usize,
    /// 检索语言
    pub language: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            candidate_limit: 50,
            max_candidates: 10,
            min_text_chars: 1000,
            paragraphs_per_passage: 2,
            language: "en".to_string(),
        }
    }
}

/// 完形填空生成器
///
/// 检索 -> 打乱候选 -> 逐本尝试（提取、过滤、分配、组装） -> 全部失败时使用备用段落
pub struct ClozeGenerator<S: CorpusSource> {
    source: S,
    config: GeneratorConfig,
    rng: StdRng,
    extractor: ParagraphExtractor,
    filter: DifficultyFilter,
    selector: RedactionSelector,
    distributor: BlankDistributor,
    fallback: FallbackLibrary,
}

impl<S: CorpusSource> ClozeGenerator<S> {
    /// 创建生成器
    ///
    /// # 参数
    /// - `source`: 语料来源
    /// - `config`: 生成器配置
    /// - `rng`: 随机源，测试中传入固定种子
    pub fn new(source: S, config: GeneratorConfig, rng: StdRng) -> Self {
        Self {
            source,
            config,
            rng,
            extractor: ParagraphExtractor::new(),
            filter: DifficultyFilter::new(),
            selector: RedactionSelector::new(),
            distributor: BlankDistributor::new(),
            fallback: FallbackLibrary::new(),
        }
    }

    /// 使用可选种子创建生成器，没有种子时取系统熵
    pub fn with_seed(source: S, config: GeneratorConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(source, config, rng)
    }

    /// 生成完形填空段落
    ///
    /// 检索和单本书的错误都不会传出，只有备用段落失败时返回错误
    ///
    /// # 参数
    /// - `request`: 生成请求
    ///
    /// # 返回
    /// 生成结果
    pub async fn get_cloze_passage(
        &mut self,
        request: &PassageRequest,
    ) -> Result<PassageResult, ClozeError> {
        let args = SearchArgs {
            bookshelf: parse_bookshelf(request.category.as_deref()),
            author: request.author.clone(),
            century: request.century.clone(),
            language: Some(self.config.language.clone()),
            limit: Some(self.config.candidate_limit),
            ..Default::default()
        };

        match self.source.search(&args).await {
            Ok(books) if !books.is_empty() => {
                if let Some(result) = self.try_candidates(&books, request) {
                    return Ok(result);
                }
                info!("{} 本候选书籍都不适用，改用备用段落", books.len());
            }
            Ok(_) => info!("没有符合条件的书籍，改用备用段落"),
            Err(e) => warn!("语料检索失败，改用备用段落: {}", e),
        }

        self.fallback.generate(
            request.category.as_deref(),
            request.blanks_count,
            &mut self.rng,
        )
    }

    /// 打乱候选书籍并逐本尝试，第一本成功的书即为结果
    fn try_candidates(&mut self, books: &[Book], request: &PassageRequest) -> Option<PassageResult> {
        let mut order: Vec<&Book> = books.iter().collect();
        order.shuffle(&mut self.rng);

        for book in order.into_iter().take(self.config.max_candidates) {
            match self.build_from_book(book, request) {
                Ok(result) => {
                    info!(
                        "使用《{}》生成 {} 个空格",
                        book.title,
                        result.answers.len()
                    );
                    return Some(result);
                }
                Err(e) => debug!("跳过《{}》: {}", book.title, e),
            }
        }

        None
    }

    fn build_from_book(
        &mut self,
        book: &Book,
        request: &PassageRequest,
    ) -> Result<PassageResult, ClozeError> {
        let text_chars = book.text.chars().count();
        if text_chars < self.config.min_text_chars {
            return Err(ClozeError::UnsuitableMaterial(format!(
                "正文只有 {} 个字符",
                text_chars
            )));
        }

        let difficulty = request.difficulty;
        let paragraphs = self.extractor.extract(&book.text, difficulty);
        if paragraphs.is_empty() {
            return Err(ClozeError::UnsuitableMaterial("没有长度合适的段落".to_string()));
        }

        let passing = self.filter.filter(paragraphs, difficulty.guideline());
        if passing.is_empty() {
            return Err(ClozeError::UnsuitableMaterial(format!(
                "没有段落符合难度 {}",
                difficulty.level()
            )));
        }

        let mode = SelectionMode::Calibrated(difficulty);
        let mut tokenized: Vec<Vec<&str>> = passing
            .iter()
            .map(|p| p.split_whitespace().collect())
            .collect();
        let shown = self.config.paragraphs_per_passage.min(tokenized.len());
        let reserve = tokenized.split_off(shown);

        let mut selected = self.distributor.distribute(
            &self.selector,
            &tokenized,
            request.blanks_count,
            mode,
            &mut self.rng,
        );

        let placed: usize = selected.iter().map(Vec::len).sum();
        let shortfall = request.blanks_count.saturating_sub(placed);
        if shortfall > 0 && !reserve.is_empty() {
            debug!("展示段落只容纳 {} 个空格，其余放入后续段落", placed);
            for (words, chosen) in
                self.distributor
                    .spill(&self.selector, reserve, shortfall, mode, &mut self.rng)
            {
                tokenized.push(words);
                selected.push(chosen);
            }
        }

        Ok(assemble(&tokenized, &selected, PassageMetadata::from_book(book)))
    }
}
