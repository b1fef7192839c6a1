// Cloze Reader
// 从 Project Gutenberg 语料生成难度分级的完形填空段落

pub mod config;
pub mod corpus;
pub mod error;
pub mod passage;
pub mod tools;

// 重新导出主要类型
pub use corpus::{Book, BookId, CorpusRetrieval, CorpusSource, LocalDataset, SearchArgs};
pub use error::ClozeError;
pub use passage::{ClozeGenerator, Difficulty, GeneratorConfig, PassageRequest, PassageResult};
pub use tools::{dispatch, ToolRequest};
