//! 请求输入聚合及其构建流程
//!
//! ```text
//! RequestParser::parse(request)
//!   ├─ raw_input()      按配置的参数名取出三个原始值
//!   └─ RawInput::parse()
//!        ├─ parse_fields()   字段树
//!        ├─ parse_filters()  过滤映射, 原样复制
//!        └─ parse_sorts()    排序列表
//! ```
//!
//! 三个值各自独立解析, 按上述顺序执行, 任何一步失败都直接返回错误。

use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::ast::{FieldNode, FilterValue, Filters, Sort};
use crate::config::QueryParameters;
use crate::error::{value_kind, RequestError, RequestResult};
use crate::parser::parse_fields;
use crate::sort::parse_sorts;

/// 未解析的三个请求参数值
#[derive(Debug, Clone, PartialEq)]
pub struct RawInput {
    fields: Value,
    filters: Value,
    sorts: Value,
}

impl RawInput {
    pub fn new(fields: Value, filters: Value, sorts: Value) -> Self {
        Self {
            fields,
            filters,
            sorts,
        }
    }

    /// 从任意映射中读取 `fields`, `filters`, `sorts` 三个键
    ///
    /// 供测试或后台任务等不经过 HTTP 请求的调用方使用。
    pub fn from_map(input: &Map<String, Value>) -> Self {
        Self::with_keys(input, "fields", "filters", "sorts")
    }

    fn with_keys(input: &Map<String, Value>, fields: &str, filters: &str, sorts: &str) -> Self {
        Self::new(
            input
                .get(fields)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new())),
            input
                .get(filters)
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
            input
                .get(sorts)
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new())),
        )
    }

    pub fn fields(&self) -> &Value {
        &self.fields
    }

    pub fn filters(&self) -> &Value {
        &self.filters
    }

    pub fn sorts(&self) -> &Value {
        &self.sorts
    }

    /// 依次解析字段、过滤与排序
    pub fn parse(&self) -> RequestResult<RequestInput> {
        let fields = parse_fields(&self.fields)?;
        let filters = parse_filters(&self.filters)?;
        let sorts = parse_sorts(&self.sorts)?;

        debug!(
            "parsed request input: {} field node(s), {} filter(s), {} sort(s)",
            fields.len(),
            filters.len(),
            sorts.len()
        );
        Ok(RequestInput {
            fields,
            filters,
            sorts,
        })
    }
}

/// 单个请求解析后的字段、过滤与排序, 构建后不可修改
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RequestInput {
    fields: Vec<FieldNode>,
    filters: Filters,
    sorts: Vec<Sort>,
}

impl RequestInput {
    /// 为空表示没有显式选择字段
    pub fn fields(&self) -> &[FieldNode] {
        &self.fields
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    pub fn into_parts(self) -> (Vec<FieldNode>, Filters, Vec<Sort>) {
        (self.fields, self.filters, self.sorts)
    }
}

/// 根据请求参数构建 `RequestInput`
#[derive(Debug, Clone, Default)]
pub struct RequestParser {
    parameters: QueryParameters,
}

impl RequestParser {
    pub fn new(parameters: QueryParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &QueryParameters {
        &self.parameters
    }

    /// 按配置的参数名从请求参数中取出原始值
    pub fn raw_input(&self, request: &Map<String, Value>) -> RawInput {
        RawInput::with_keys(
            request,
            &self.parameters.fields,
            &self.parameters.filters,
            &self.parameters.sort,
        )
    }

    pub fn parse(&self, request: &Map<String, Value>) -> RequestResult<RequestInput> {
        self.raw_input(request).parse()
    }
}

/// 原样复制过滤映射, 值的含义由下游按过滤名解释
pub fn parse_filters(raw: &Value) -> RequestResult<Filters> {
    match raw {
        Value::Null => Ok(Filters::new()),
        Value::Object(entries) => Ok(entries
            .iter()
            .map(|(key, value)| (key.clone(), FilterValue::from(value.clone())))
            .collect()),
        other => Err(RequestError::InvalidFilterValue {
            found: value_kind(other),
        }),
    }
}
