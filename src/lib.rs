//! 将请求中的 `fields`, `filters`, `sort` 参数解析为查询构建层使用的结构
//!
//! ```
//! use query_shaper::{parse_field_str, FieldNode};
//!
//! let fields = parse_field_str("id,posts(id,title)").unwrap();
//! assert_eq!(fields[1], FieldNode::relation("posts", vec![
//!     FieldNode::field("id"),
//!     FieldNode::field("title"),
//! ]));
//! ```

pub mod ast;
pub mod config;
pub mod context;
pub mod error;
pub mod parser;
pub mod request;
pub mod scanner;
pub mod sort;

pub use ast::{Field, FieldNode, FilterValue, Filters, Relation, Sort, SortDirection};
pub use config::{ConfigError, QueryParameters};
pub use error::{GroupErrorKind, RequestError, RequestResult};
pub use parser::{parse_field_str, parse_fields, FieldParser};
pub use request::{parse_filters, RawInput, RequestInput, RequestParser};
pub use sort::{parse_sort_entry, parse_sort_str, parse_sorts};
