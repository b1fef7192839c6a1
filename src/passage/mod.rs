// Passage 模块
// 从书籍正文生成难度分级的完形填空段落

pub mod types;
pub mod paragraph_extractor;
pub mod difficulty_filter;
pub mod scoring_engine;
pub mod redaction_selector;
pub mod blank_distributor;
pub mod passage_assembler;
pub mod fallback_library;
pub mod generator;


// 重新导出主要类型
pub use types::*;
pub use paragraph_extractor::ParagraphExtractor;
pub use difficulty_filter::DifficultyFilter;
pub use scoring_engine::WordScorer;
pub use redaction_selector::{RedactionSelector, SelectionMode};
pub use blank_distributor::BlankDistributor;
pub use passage_assembler::assemble;
pub use fallback_library::FallbackLibrary;
pub use generator::{ClozeGenerator, GeneratorConfig};
