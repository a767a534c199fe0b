//! 占位符编解码
//!
//! 图片、换行、代码等行内节点在送去翻译前被替换为带编号的占位符，
//! 译文返回后再按编号换回原节点的标记。

use regex::{NoExpand, Regex};

use crate::translation::config::constants;
use crate::translation::error::TranslationResult;
use crate::utils::escape_markup;

const SLOT: &str = "{}";

/// 占位符模板与解码模式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    template: String,
    pattern: String,
}

impl Default for Placeholder {
    fn default() -> Self {
        Self::new(constants::PLACEHOLDER_TEMPLATE, constants::PLACEHOLDER_PATTERN)
    }
}

impl Placeholder {
    /// `template` 和 `pattern` 中的 `{}` 为编号位置
    pub fn new(template: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            pattern: pattern.into(),
        }
    }

    /// 生成第 `index` 个占位符
    pub fn encode(&self, index: usize) -> String {
        self.template.replacen(SLOT, &format_index(index), 1)
    }

    /// 第 `index` 个占位符的解码模式，数字之间允许空白
    pub fn decode_pattern(&self, index: usize) -> String {
        let digits: Vec<String> = format_index(index).chars().map(String::from).collect();
        self.pattern.replacen(SLOT, &digits.join(r"\s*"), 1)
    }

    /// 匹配任意编号占位符（含两侧空白）的模式
    pub fn separator_pattern(&self) -> TranslationResult<Regex> {
        let pattern = format!(r"\s*{}\s*", self.pattern.replacen(SLOT, r"(0|[^0]\d*)", 1));
        Ok(Regex::new(&pattern)?)
    }

    /// 按编号把占位符替换为对应的标记
    ///
    /// `text` 已经过标记转义，解码模式也做同样的转义。替换内容按字面插入。
    pub fn restore(&self, text: &str, replacements: &[String]) -> TranslationResult<String> {
        let mut restored = text.to_string();
        for (index, replacement) in replacements.iter().enumerate() {
            let decoder = Regex::new(&escape_markup(&self.decode_pattern(index)))?;
            restored = decoder
                .replace_all(&restored, NoExpand(replacement))
                .into_owned();
        }
        Ok(restored)
    }
}

fn format_index(index: usize) -> String {
    format!("{:0width$}", index, width = constants::PLACEHOLDER_DIGITS)
}
