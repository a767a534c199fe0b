//! 棋谱注释解析
//!
//! 棋谱中的 `{...}` 注释只要包含字母就视为可翻译内容，其余文本原样保留。

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use regex::Regex;

use crate::translation::error::TranslationResult;

const COMMENT_PATTERN: &str = r"\{[^}]*[a-zA-Z][^}]*\}";

/// 一条注释及其译文槽位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationComment {
    pub raw: String,
    pub translation: Option<String>,
}

impl AnnotationComment {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            translation: None,
        }
    }

    /// 写回文档时使用的文本
    pub fn render(&self) -> String {
        match &self.translation {
            None => self.raw.clone(),
            Some(translation) => format!("{{{}}}", translation),
        }
    }
}

pub type CommentHandle = Rc<RefCell<AnnotationComment>>;

/// 棋谱文档
#[derive(Debug, Clone, Default)]
pub struct AnnotationDocument {
    source: String,
    spans: Vec<Range<usize>>,
    comments: Vec<CommentHandle>,
}

impl AnnotationDocument {
    pub fn parse(content: &str) -> TranslationResult<Self> {
        let pattern = Regex::new(COMMENT_PATTERN)?;
        let mut spans = Vec::new();
        let mut comments = Vec::new();

        for found in pattern.find_iter(content) {
            spans.push(found.range());
            comments.push(Rc::new(RefCell::new(AnnotationComment::new(found.as_str()))));
        }

        tracing::debug!("解析棋谱注释 {} 条", comments.len());
        Ok(Self {
            source: content.to_string(),
            spans,
            comments,
        })
    }

    pub fn comments(&self) -> &[CommentHandle] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// 用每条注释的当前内容替换原注释
    pub fn render(&self) -> String {
        let mut output = String::with_capacity(self.source.len());
        let mut last = 0;

        for (span, comment) in self.spans.iter().zip(&self.comments) {
            output.push_str(&self.source[last..span.start]);
            output.push_str(&comment.borrow().render());
            last = span.end;
        }
        output.push_str(&self.source[last..]);

        output
    }
}
