use thiserror::Error;

/// 生成完形填空段落过程中的错误
///
/// 只有 `Fallback` 会传递到最终调用方，其余错误都在编排层被吸收
#[derive(Error, Debug)]
pub enum ClozeError {
    /// 网络或 HTTP 失败，可重试
    #[error("语料请求失败: {0}")]
    TransientFetch(String),
    /// 去掉凭证重试后仍然鉴权失败
    #[error("语料鉴权失败: HTTP {status}")]
    Auth { status: u16 },
    /// 响应结构与预期不符
    #[error("语料响应格式不正确: {0}")]
    MalformedResponse(String),
    /// 所有尝试都没有得到有效书籍
    #[error("没有可用的候选书籍: {0}")]
    NoCandidate(String),
    /// 单本书不适合出题（过短或没有合格段落）
    #[error("素材不适用: {0}")]
    UnsuitableMaterial(String),
    /// 备用段落生成失败
    #[error("备用段落生成失败: {0}")]
    Fallback(String),
    /// 无法识别的工具调用
    #[error("工具调用无效: {0}")]
    InvalidToolCall(String),
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClozeError {
    /// 是否属于检索阶段可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClozeError::TransientFetch(_)
                | ClozeError::Auth { .. }
                | ClozeError::MalformedResponse(_)
                | ClozeError::NoCandidate(_)
        )
    }
}
