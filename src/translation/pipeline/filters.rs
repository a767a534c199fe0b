//! 内容过滤器模块
//!
//! 判断提取出的单元是否需要翻译：空文本直接丢弃，命中过滤规则的单元标记为忽略

use regex::{Regex, RegexBuilder};

use crate::translation::config::constants;
use crate::translation::config::{FilterScope, RuleMode};
use crate::translation::element::Element;
use crate::translation::error::TranslationResult;

/// 按规则模式编译一条用户过滤规则
pub fn compile_rule(rule: &str, mode: RuleMode) -> TranslationResult<Regex> {
    let regex = match mode {
        RuleMode::Normal => RegexBuilder::new(&regex::escape(rule))
            .case_insensitive(true)
            .build()?,
        RuleMode::Case => Regex::new(&regex::escape(rule))?,
        RuleMode::Regex => Regex::new(rule)?,
    };
    Ok(regex)
}

/// 内容过滤器
#[derive(Debug, Clone)]
pub struct ContentFilter {
    scope: FilterScope,
    patterns: Vec<Regex>,
}

impl ContentFilter {
    /// 固定的噪声规则在前，用户规则在后
    pub fn new(mode: RuleMode, scope: FilterScope, rules: &[String]) -> TranslationResult<Self> {
        let mut patterns = vec![Regex::new(constants::NOISE_PATTERN)?];
        for rule in rules {
            patterns.push(compile_rule(rule, mode)?);
        }

        Ok(Self { scope, patterns })
    }

    fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(text))
    }

    /// 过滤单元，返回是否保留
    ///
    /// 文本为空的单元不保留；命中规则的单元保留但标记为忽略。
    pub fn apply(&self, element: &mut dyn Element) -> bool {
        let text = element.get_text();
        if text.is_empty() {
            return false;
        }

        let content = text.replace("&lt;", "").replace("&gt;", "");
        if self.is_match(&content) {
            element.set_ignored(true);
        }

        if self.scope == FilterScope::Html && self.is_match(&element.get_raw()) {
            element.set_ignored(true);
        }

        true
    }
}
