//! 字段参数的字符扫描器
//!
//! 按 Unicode 标量值逐个读取输入, 同时记录字节偏移, 供错误信息定位使用。
//! 扫描器只负责分类字符, 引号模式由解析器根据上下文处理。

use std::str::CharIndices;

/// 字段语法中有特殊含义的字符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Quote,  // "
    Comma,  // ,
    LParen, // (
    RParen, // )
    /// 其他任意字符
    Char(char),
}

impl Symbol {
    /// 引号模式下需要原样保留的字符
    pub fn as_char(&self) -> char {
        match self {
            Symbol::Quote => '"',
            Symbol::Comma => ',',
            Symbol::LParen => '(',
            Symbol::RParen => ')',
            Symbol::Char(c) => *c,
        }
    }
}

/// 带位置的字符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scanned {
    pub symbol: Symbol,
    /// 字符起始的字节偏移
    pub offset: usize,
}

pub struct Scanner<'a> {
    /// 剩余输入及其字节偏移
    chars: CharIndices<'a>,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Scanner {
            chars: input.char_indices(),
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Scanned;

    fn next(&mut self) -> Option<Self::Item> {
        let (offset, c) = self.chars.next()?;

        let symbol = match c {
            '"' => Symbol::Quote,
            ',' => Symbol::Comma,
            '(' => Symbol::LParen,
            ')' => Symbol::RParen,
            c => Symbol::Char(c),
        };
        Some(Scanned { symbol, offset })
    }
}
