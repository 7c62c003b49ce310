//! 字段、排序与过滤参数解析共用的错误类型

use std::fmt;

pub type RequestResult<T> = Result<T, RequestError>;

/// 括号分组缺失的一侧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupErrorKind {
    /// `(` 直到输入结束都没有闭合
    Unclosed,
    /// `)` 没有对应的 `(`
    UnexpectedClose,
}

impl fmt::Display for GroupErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupErrorKind::Unclosed => write!(f, "未闭合的 '('"),
            GroupErrorKind::UnexpectedClose => write!(f, "多余的 ')'"),
        }
    }
}

/// 将请求原始值转换为 `RequestInput` 时的错误
///
/// 偏移量均为字段字符串中的字节偏移。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("不支持的字段参数: 期望字符串, 实际为 {found}")]
    UnsupportedInputKind { found: &'static str },

    #[error("括号不匹配: 位置 {offset} 处{kind}")]
    UnbalancedGroup { offset: usize, kind: GroupErrorKind },

    /// `(` 前没有关联名, 例如 `(id)` 或 `a(b)(c)`
    ///
    /// 字段语法原本只定义了输入类型错误和括号不匹配两种失败,
    /// 这里额外拒绝空的关联名, 保证每个 `Relation` 都有名称。
    #[error("缺少关联名: 位置 {offset} 处的 '(' 前没有名称")]
    MissingRelationName { offset: usize },

    #[error("无效的排序参数: 期望字符串或字符串数组, 实际为 {found}")]
    InvalidSortValue { found: &'static str },

    /// 过滤参数整体不是映射; 映射中的各个值原样保留, 不会产生此错误
    #[error("无效的过滤参数: 期望对象, 实际为 {found}")]
    InvalidFilterValue { found: &'static str },
}

impl RequestError {
    pub fn unclosed_group(offset: usize) -> Self {
        Self::UnbalancedGroup {
            offset,
            kind: GroupErrorKind::Unclosed,
        }
    }

    pub fn unexpected_close(offset: usize) -> Self {
        Self::UnbalancedGroup {
            offset,
            kind: GroupErrorKind::UnexpectedClose,
        }
    }

    /// 语法错误在字段字符串中的字节偏移
    pub fn offset(&self) -> Option<usize> {
        match self {
            RequestError::UnbalancedGroup { offset, .. }
            | RequestError::MissingRelationName { offset } => Some(*offset),
            _ => None,
        }
    }
}

/// JSON 值的类型名称, 用于错误信息
pub(crate) fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
