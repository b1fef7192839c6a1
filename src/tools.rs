use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::corpus::CorpusSource;
use crate::error::ClozeError;
use crate::passage::{ClozeGenerator, Difficulty, PassageRequest};

/// 生成段落的工具参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClozePassageArgs {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub century: Option<String>,
    #[serde(alias = "blanksCount")]
    pub blanks_count: usize,
    #[serde(default)]
    pub difficulty: Option<i64>,
}

impl ClozePassageArgs {
    /// 转换为生成请求，难度限制到 1-5
    pub fn into_request(self) -> PassageRequest {
        PassageRequest {
            category: self.category,
            author: self.author,
            century: self.century,
            blanks_count: self.blanks_count,
            difficulty: Difficulty::clamped(self.difficulty.unwrap_or(1)),
        }
    }
}

/// 词语分析的工具参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordAnalysisArgs {
    pub sentence: String,
    pub word: String,
}

/// 工具调用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "arguments")]
pub enum ToolRequest {
    #[serde(rename = "getClozePassage", alias = "get_cloze_passage")]
    GetClozePassage(ClozePassageArgs),
    #[serde(rename = "getWordAnalysis", alias = "get_word_analysis")]
    GetWordAnalysis(WordAnalysisArgs),
}

impl ToolRequest {
    /// 解析一次工具调用
    ///
    /// # 参数
    /// - `name`: 工具名
    /// - `arguments`: JSON 格式的参数，空字符串视为空对象
    ///
    /// # 返回
    /// 工具请求；未知工具或参数不合法时返回 `InvalidToolCall`
    pub fn from_call(name: &str, arguments: &str) -> Result<Self, ClozeError> {
        let arguments: Value = if arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(arguments)
                .map_err(|e| ClozeError::InvalidToolCall(format!("{} 的参数不是合法 JSON: {}", name, e)))?
        };

        serde_json::from_value(json!({ "name": name, "arguments": arguments }))
            .map_err(|e| ClozeError::InvalidToolCall(format!("{}: {}", name, e)))
    }
}

/// 提供给模型的工具定义
pub fn tool_definitions() -> Value {
    json!([
        {
            "type": "function",
            "function": {
                "name": "getClozePassage",
                "description": "Generates a difficulty-calibrated cloze passage from Project Gutenberg.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "category": { "type": "string", "description": "Bookshelf category, e.g. bookshelf/480." },
                        "author": { "type": "string" },
                        "century": { "type": "string", "description": "Century number, e.g. 19." },
                        "blanks_count": { "type": "integer", "minimum": 0 },
                        "difficulty": { "type": "integer", "minimum": 1, "maximum": 5 }
                    },
                    "required": ["blanks_count"]
                }
            }
        },
        {
            "type": "function",
            "function": {
                "name": "getWordAnalysis",
                "description": "Provides a concise analytical description of a missing word and its role in the sentence.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "sentence": { "type": "string", "description": "The sentence containing the word." },
                        "word": { "type": "string", "description": "The missing word to analyze." }
                    },
                    "required": ["sentence", "word"]
                }
            }
        }
    ])
}

/// 词语分析
///
/// 返回固定格式的说明
pub fn analyze_word(args: &WordAnalysisArgs) -> Value {
    json!({
        "analysis": format!(
            "The word \"{}\" plays a key role in the sentence: \"{}\". It contributes to the overall meaning by emphasizing its context.",
            args.word, args.sentence
        )
    })
}

/// 执行工具调用
///
/// # 参数
/// - `generator`: 段落生成器
/// - `request`: 工具请求
///
/// # 返回
/// 工具结果的 JSON
pub async fn dispatch<S: CorpusSource>(
    generator: &mut ClozeGenerator<S>,
    request: ToolRequest,
) -> Result<Value, ClozeError> {
    match request {
        ToolRequest::GetClozePassage(args) => {
            let request = args.into_request();
            info!(
                "工具调用 getClozePassage: blanks={} difficulty={}",
                request.blanks_count,
                request.difficulty.level()
            );
            let result = generator.get_cloze_passage(&request).await?;
            Ok(serde_json::to_value(result)?)
        }
        ToolRequest::GetWordAnalysis(args) => {
            debug!("工具调用 getWordAnalysis: {}", args.word);
            Ok(analyze_word(&args))
        }
    }
}
