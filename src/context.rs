//! 扫描上下文: 字段解析中一层括号对应的状态

use crate::ast::FieldNode;

/// 一层嵌套的解析状态
///
/// 父上下文就是解析器上下文栈中位于其下方的元素, 这里不保存任何指向父级的引用。
#[derive(Debug, Default)]
pub struct ScanContext {
    /// 正在扫描的名称
    pub accumulator: String,
    /// 已完成的字段与关联
    pub stack: Vec<FieldNode>,
    pub is_quoted: bool,
    /// 打开该层的 `(` 的字节偏移, 根上下文为 `None`
    pub opened_at: Option<usize>,
}

impl ScanContext {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(opened_at: usize) -> Self {
        Self {
            opened_at: Some(opened_at),
            ..Self::default()
        }
    }

    pub fn toggle_quote(&mut self) {
        self.is_quoted = !self.is_quoted;
    }

    /// 将累积的名称作为字段压栈, 空名称被丢弃
    pub fn flush_field(&mut self) {
        let name = self.take_accumulator();
        if !name.is_empty() {
            self.stack.push(FieldNode::field(name));
        }
    }

    /// 取出累积的名称并清空
    pub fn take_accumulator(&mut self) -> String {
        std::mem::take(&mut self.accumulator)
    }

    /// 结束该层, 返回其中已完成的节点
    pub fn finish(mut self) -> Vec<FieldNode> {
        self.flush_field();
        self.stack
    }
}
