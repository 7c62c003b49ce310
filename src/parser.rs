//! 字段参数的语法分析器
//!
//! ## 解析流程
//!
//! ```text
//! parse()
//!   ├─ 上下文栈初始只有根上下文
//!   ├─ 对每个字符 (当前上下文 = 栈顶)
//!   │   ├─ 引号模式且不是 '"' → 追加到 accumulator
//!   │   ├─ '"' → 切换引号模式, 引号本身不保留
//!   │   ├─ ',' → accumulator 作为字段压入当前栈
//!   │   ├─ '(' → 压入子上下文, 当前 accumulator 保留为关联名
//!   │   ├─ ')' → 结束子上下文
//!   │   │          ├─ 子 accumulator 作为最后一个字段
//!   │   │          ├─ Relation(父 accumulator, 子栈) 压入父栈
//!   │   │          └─ 清空父 accumulator, 弹出子上下文
//!   │   └─ 其他 → 追加到 accumulator
//!   │
//!   ├─ 栈中仍有子上下文 → 括号未闭合错误
//!   └─ 根 accumulator 作为最后一个字段, 返回根栈
//! ```
//!
//! ## 语法
//!
//! ```text
//! fields    := field (',' field)*
//! field     := quoted-or-plain-text | relation
//! relation  := plain-text '(' fields ')'
//! ```
//!
//! 双引号只是模式切换, 不支持转义, 因此带引号的名称中不能包含双引号。
//!
//! ## 解析示例
//!
//! ```text
//! id,name
//! id,name,posts(id,title,comments(id,body))
//! id,"first,name",comments(id,"wo)(,-w")
//! ```
//!
//! 嵌套使用显式的上下文栈而不是递归, 深度嵌套的输入不会耗尽调用栈。

use log::{debug, trace};
use serde_json::Value;

use crate::ast::FieldNode;
use crate::context::ScanContext;
use crate::error::{value_kind, RequestError, RequestResult};
use crate::scanner::{Scanned, Scanner, Symbol};

pub struct FieldParser<'a> {
    scanner: Scanner<'a>,
    contexts: Vec<ScanContext>,
}

impl<'a> FieldParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            scanner: Scanner::new(input),
            contexts: vec![ScanContext::root()],
        }
    }

    /// 返回当前上下文
    fn current(&mut self) -> &mut ScanContext {
        // 根上下文只在 parse 结束时被取出
        let last = self.contexts.len() - 1;
        &mut self.contexts[last]
    }

    pub fn parse(mut self) -> RequestResult<Vec<FieldNode>> {
        while let Some(Scanned { symbol, offset }) = self.scanner.next() {
            let context = self.current();

            if context.is_quoted && symbol != Symbol::Quote {
                context.accumulator.push(symbol.as_char());
                continue;
            }

            match symbol {
                Symbol::Quote => context.toggle_quote(),
                Symbol::Comma => context.flush_field(),
                Symbol::LParen => self.open_group(offset)?,
                Symbol::RParen => self.close_group(offset)?,
                Symbol::Char(c) => context.accumulator.push(c),
            }
        }

        if let Some(offset) = self.contexts.last().and_then(|context| context.opened_at) {
            return Err(RequestError::unclosed_group(offset));
        }

        let fields = self
            .contexts
            .pop()
            .map(ScanContext::finish)
            .unwrap_or_default();
        debug!("parsed {} top-level field node(s)", fields.len());
        Ok(fields)
    }

    /// 处理 `(`: 当前 accumulator 中是关联名
    fn open_group(&mut self, offset: usize) -> RequestResult<()> {
        if self.current().accumulator.is_empty() {
            return Err(RequestError::MissingRelationName { offset });
        }
        self.contexts.push(ScanContext::child(offset));
        trace!("opened group at offset {}, depth {}", offset, self.contexts.len() - 1);
        Ok(())
    }

    /// 处理 `)`: 将子上下文折叠为父上下文中的一个关联
    fn close_group(&mut self, offset: usize) -> RequestResult<()> {
        if self.contexts.len() < 2 {
            return Err(RequestError::unexpected_close(offset));
        }
        let children = match self.contexts.pop() {
            Some(child) => child.finish(),
            None => return Err(RequestError::unexpected_close(offset)),
        };

        let parent = self.current();
        let name = parent.take_accumulator();
        trace!("closed group '{}' with {} child node(s)", name, children.len());
        parent.stack.push(FieldNode::relation(name, children));
        Ok(())
    }
}

/// 解析字段字符串
pub fn parse_field_str(input: &str) -> RequestResult<Vec<FieldNode>> {
    FieldParser::new(input).parse()
}

/// 解析请求中的字段参数原始值
///
/// 缺省值 (`null`) 与空字符串都表示没有显式选择字段; 数组等其他形式不受支持。
pub fn parse_fields(raw: &Value) -> RequestResult<Vec<FieldNode>> {
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => parse_field_str(s),
        other => Err(RequestError::UnsupportedInputKind {
            found: value_kind(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GroupErrorKind;
    use proptest::prelude::*;
    use serde_json::json;

    fn field(name: &str) -> FieldNode {
        FieldNode::field(name)
    }

    fn relation(name: &str, children: Vec<FieldNode>) -> FieldNode {
        FieldNode::relation(name, children)
    }

    #[test]
    fn test_flat_fields() {
        let result = parse_field_str("id,name").unwrap();
        assert_eq!(result, vec![field("id"), field("name")]);
    }

    #[test]
    fn test_nested_relations() {
        let result = parse_field_str("id,name,posts(id,title,comments(id,body))").unwrap();
        assert_eq!(
            result,
            vec![
                field("id"),
                field("name"),
                relation(
                    "posts",
                    vec![
                        field("id"),
                        field("title"),
                        relation("comments", vec![field("id"), field("body")]),
                    ]
                ),
            ]
        );
    }

    #[test]
    fn test_quoted_names() {
        let result = parse_field_str(r#"id,"first,name",comments(id,"wo)(,-w")"#).unwrap();
        assert_eq!(
            result,
            vec![
                field("id"),
                field("first,name"),
                relation("comments", vec![field("id"), field("wo)(,-w")]),
            ]
        );
    }

    #[test]
    fn test_quoted_relation_name() {
        let result = parse_field_str(r#""a,b"(c)"#).unwrap();
        assert_eq!(result, vec![relation("a,b", vec![field("c")])]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_field_str("").unwrap(), vec![]);
        assert_eq!(parse_fields(&Value::Null).unwrap(), vec![]);
        assert_eq!(parse_fields(&json!("")).unwrap(), vec![]);
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        assert_eq!(parse_field_str("a,,b,").unwrap(), vec![field("a"), field("b")]);
        assert_eq!(parse_field_str(r#""",a"#).unwrap(), vec![field("a")]);
        assert_eq!(parse_field_str("a()").unwrap(), vec![relation("a", vec![])]);
    }

    #[test]
    fn test_field_after_relation() {
        let result = parse_field_str("posts(id),name").unwrap();
        assert_eq!(result, vec![relation("posts", vec![field("id")]), field("name")]);
    }

    #[test]
    fn test_whitespace_is_kept() {
        let result = parse_field_str("id, author(id)").unwrap();
        assert_eq!(result, vec![field("id"), relation(" author", vec![field("id")])]);
    }

    #[test]
    fn test_multibyte_names() {
        let result = parse_field_str("名字,作者(é)").unwrap();
        assert_eq!(result, vec![field("名字"), relation("作者", vec![field("é")])]);
    }

    #[test]
    fn test_unclosed_quote_keeps_text() {
        assert_eq!(parse_field_str(r#"id,"a,b"#).unwrap(), vec![field("id"), field("a,b")]);
    }

    #[test]
    fn test_leaf_count_with_quotes_and_groups() {
        let result = parse_field_str(r#"a,"b,c",x(y,"z,(w",u(v)),d"#).unwrap();
        assert_eq!(count_leaves(&result), 6);
        assert_eq!(
            result[2],
            relation("x", vec![field("y"), field("z,(w"), relation("u", vec![field("v")])])
        );
    }

    #[test]
    fn test_unclosed_group() {
        let err = parse_field_str("a(b").unwrap_err();
        assert_eq!(
            err,
            RequestError::UnbalancedGroup { offset: 1, kind: GroupErrorKind::Unclosed }
        );

        // 报告最内层未闭合的括号
        let err = parse_field_str("a(b(c),d(e").unwrap_err();
        assert_eq!(err, RequestError::unclosed_group(8));
    }

    #[test]
    fn test_quoted_close_does_not_close_group() {
        let err = parse_field_str(r#"a(")"#).unwrap_err();
        assert_eq!(err, RequestError::unclosed_group(1));
    }

    #[test]
    fn test_unexpected_close() {
        let err = parse_field_str("a)").unwrap_err();
        assert_eq!(
            err,
            RequestError::UnbalancedGroup { offset: 1, kind: GroupErrorKind::UnexpectedClose }
        );
        assert_eq!(parse_field_str("a(b)),c").unwrap_err(), RequestError::unexpected_close(4));
    }

    #[test]
    fn test_missing_relation_name() {
        assert_eq!(
            parse_field_str("(id)").unwrap_err(),
            RequestError::MissingRelationName { offset: 0 }
        );
        assert_eq!(
            parse_field_str("a,(b)").unwrap_err(),
            RequestError::MissingRelationName { offset: 2 }
        );
        assert_eq!(
            parse_field_str("a(b)(c)").unwrap_err(),
            RequestError::MissingRelationName { offset: 4 }
        );
    }

    #[test]
    fn test_array_input_is_unsupported() {
        assert_eq!(
            parse_fields(&json!([])).unwrap_err(),
            RequestError::UnsupportedInputKind { found: "array" }
        );
        assert_eq!(
            parse_fields(&json!(["id", "posts(id)"])).unwrap_err(),
            RequestError::UnsupportedInputKind { found: "array" }
        );
        assert_eq!(
            parse_fields(&json!({ "posts": ["id"] })).unwrap_err(),
            RequestError::UnsupportedInputKind { found: "object" }
        );
        assert_eq!(
            parse_fields(&json!(3)).unwrap_err(),
            RequestError::UnsupportedInputKind { found: "number" }
        );
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let depth = 1_000;
        let input = format!("{}x{}", "a(".repeat(depth), ")".repeat(depth));
        let result = parse_field_str(&input).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].is_relation());

        let unclosed = "a(".repeat(100_000);
        assert_eq!(
            parse_field_str(&unclosed).unwrap_err(),
            RequestError::unclosed_group(unclosed.len() - 1)
        );
    }

    fn count_leaves(nodes: &[FieldNode]) -> usize {
        let mut count = 0;
        let mut pending: Vec<&FieldNode> = nodes.iter().collect();
        while let Some(node) = pending.pop() {
            match node {
                FieldNode::Field(_) => count += 1,
                FieldNode::Relation(relation) => pending.extend(relation.children.iter()),
            }
        }
        count
    }

    /// 生成一段字段文本及其中引号外的逗号分段数:
    /// 普通名称、带分隔符的引号名称, 或包含非空分段的关联 `x(...)`
    fn arb_segment() -> impl Strategy<Value = (String, usize)> {
        let leaf = prop_oneof![
            "[a-c]{1,3}".prop_map(|name| (name, 1)),
            "[a-c,()]{1,4}".prop_map(|name| (format!("\"{}\"", name), 1)),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            ("[a-c]{1,3}", prop::collection::vec(inner, 1..4)).prop_map(|(name, children)| {
                let text = children.iter().map(|(text, _)| text.as_str()).collect::<Vec<_>>().join(",");
                let leaves = children.iter().map(|(_, leaves)| leaves).sum();
                (format!("{}({})", name, text), leaves)
            })
        })
    }

    fn arb_node() -> impl Strategy<Value = FieldNode> {
        let leaf = "[a-z_ ,()]{1,6}".prop_map(FieldNode::field);
        leaf.prop_recursive(4, 32, 4, |inner| {
            ("[a-z_ ,()]{1,6}", prop::collection::vec(inner, 0..4))
                .prop_map(|(name, children)| FieldNode::relation(name, children))
        })
    }

    proptest! {
        #[test]
        fn prop_parsing_is_pure(input in r#"[a-c,()" ]{0,24}"#) {
            prop_assert_eq!(parse_field_str(&input), parse_field_str(&input));
        }

        #[test]
        fn prop_flat_input_is_comma_split(segments in prop::collection::vec("[a-z0-9_ ]{1,8}", 1..8)) {
            let input = segments.join(",");
            let expected: Vec<_> = segments.iter().map(|s| FieldNode::field(s.as_str())).collect();
            prop_assert_eq!(parse_field_str(&input).unwrap(), expected);
        }

        #[test]
        fn prop_leaf_count_matches_segments(segments in prop::collection::vec(arb_segment(), 0..6)) {
            let input = segments.iter().map(|(text, _)| text.as_str()).collect::<Vec<_>>().join(",");
            let expected: usize = segments.iter().map(|(_, leaves)| leaves).sum();
            let result = parse_field_str(&input).unwrap();
            prop_assert_eq!(count_leaves(&result), expected);
        }

        #[test]
        fn prop_quoted_name_is_literal(name in r#"[^"]{1,12}"#) {
            let input = format!("\"{}\"", name);
            prop_assert_eq!(parse_field_str(&input).unwrap(), vec![FieldNode::field(name)]);
        }

        #[test]
        fn prop_rendered_tree_parses_back(nodes in prop::collection::vec(arb_node(), 1..5)) {
            let rendered = nodes.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(",");
            prop_assert_eq!(parse_field_str(&rendered).unwrap(), nodes);
        }

        #[test]
        fn prop_unclosed_group_always_fails(rest in "[a-z,]{0,12}") {
            let input = format!("x({}", rest);
            prop_assert_eq!(parse_field_str(&input).unwrap_err(), RequestError::unclosed_group(1));
        }
    }
}
