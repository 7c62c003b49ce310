//! 排序参数解析
//!
//! 支持的输入形式:
//!
//! ```text
//! "name"
//! "name.desc"
//! "first_name.desc,last_name.asc"
//! ["first_name.desc", "last_name.asc"]
//! ```
//!
//! 每一项按*第一个* `.` 拆分, 因此本身含有 `.` 的字段名 (`author.name.desc`)
//! 会被读成字段 `author` 加未知方向 `name.desc`, 最终按升序处理。

use log::debug;
use serde_json::Value;

use crate::ast::{Sort, SortDirection};
use crate::error::{value_kind, RequestError, RequestResult};

/// 解析单个 `field` 或 `field.direction`
///
/// 去掉首尾空白后为空的项返回 `None`
pub fn parse_sort_entry(raw: &str) -> Option<Sort> {
    let entry = raw.trim();
    if entry.is_empty() {
        return None;
    }

    let sort = match entry.split_once('.') {
        None => Sort::asc(entry),
        Some((field, direction)) => {
            // 未知方向不报错, 回退为升序
            let direction = direction.parse().unwrap_or(SortDirection::Ascending);
            Sort::new(field, direction)
        }
    };
    Some(sort)
}

/// 解析逗号分隔的排序字符串
pub fn parse_sort_str(input: &str) -> Vec<Sort> {
    input.split(',').filter_map(parse_sort_entry).collect()
}

/// 解析请求中的排序参数原始值, 保持输入顺序
pub fn parse_sorts(raw: &Value) -> RequestResult<Vec<Sort>> {
    let sorts = match raw {
        Value::Null => Vec::new(),
        Value::String(s) => parse_sort_str(s),
        Value::Array(entries) => {
            let mut sorts = Vec::with_capacity(entries.len());
            for entry in entries {
                let Value::String(entry) = entry else {
                    return Err(RequestError::InvalidSortValue {
                        found: value_kind(entry),
                    });
                };
                sorts.extend(parse_sort_entry(entry));
            }
            sorts
        }
        other => {
            return Err(RequestError::InvalidSortValue {
                found: value_kind(other),
            })
        }
    };

    debug!("parsed {} sort directive(s)", sorts.len());
    Ok(sorts)
}
