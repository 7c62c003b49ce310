//! 请求参数解析后的数据结构

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// 叶子节点, 代表单个被请求的字段, 例如 `fields=id` 中的 `id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Field {
    pub name: String,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// 代表一个关联及其内部请求的字段, 例如：`posts(id,title)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Relation {
    /// `(` 之前的文本
    pub name: String,
    /// 括号内的字段与关联, 保持输入顺序
    pub children: Vec<FieldNode>,
}

impl Relation {
    pub fn new(name: impl Into<String>, children: Vec<FieldNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

/// 字段树中的节点: 字段或关联
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldNode {
    Field(Field),
    Relation(Relation),
}

impl FieldNode {
    pub fn field(name: impl Into<String>) -> Self {
        FieldNode::Field(Field::new(name))
    }

    pub fn relation(name: impl Into<String>, children: Vec<FieldNode>) -> Self {
        FieldNode::Relation(Relation::new(name, children))
    }

    pub fn name(&self) -> &str {
        match self {
            FieldNode::Field(field) => &field.name,
            FieldNode::Relation(relation) => &relation.name,
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(self, FieldNode::Relation(_))
    }

    pub fn as_relation(&self) -> Option<&Relation> {
        match self {
            FieldNode::Relation(relation) => Some(relation),
            FieldNode::Field(_) => None,
        }
    }
}

/// 按字段语法写出名称, 含有分隔符的名称用双引号包围
///
/// 名称本身含有 `"` 时无法表示, 原样输出。解析器不会产生这样的名称。
fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if name.contains([',', '(', ')']) {
        write!(f, "\"{}\"", name)
    } else {
        f.write_str(name)
    }
}

impl fmt::Display for FieldNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldNode::Field(field) => write_name(f, &field.name),
            FieldNode::Relation(relation) => {
                write_name(f, &relation.name)?;
                f.write_str("(")?;
                for (i, child) in relation.children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ();

    /// 只接受完全匹配的 `asc` / `desc`, 区分大小写
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Ascending),
            "desc" => Ok(SortDirection::Descending),
            _ => Err(()),
        }
    }
}

/// 单个排序指令, 例如：`name.desc`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.field, self.direction.as_str())
    }
}

/// 过滤参数的原始值, 不在此处解释
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Single(String),
    Many(Vec<String>),
    /// 其他形状 (数字、嵌套对象、null 等), 原样交给下游
    Raw(serde_json::Value),
}

impl From<serde_json::Value> for FilterValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::String(s) => FilterValue::Single(s),
            Value::Array(items) if items.iter().all(Value::is_string) => FilterValue::Many(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            other => FilterValue::Raw(other),
        }
    }
}

/// 过滤参数名到原始值的映射, 保持输入顺序
pub type Filters = IndexMap<String, FilterValue>;
