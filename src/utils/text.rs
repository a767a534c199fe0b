//! 文本处理工具
//!
//! 提供文本整理、自然排序键和标记转义等基础函数

use std::cmp::Ordering;

/// 去除首尾空白（包括不换行空格和全角空格）
pub fn trim(text: &str) -> String {
    text.trim().to_string()
}

/// 转义文本中的标记字符，使其可以安全地嵌入到标记中
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

/// 将连续重复的单词字符压缩到最多 `limit` 个
///
/// 机器翻译偶尔会输出 "helllllllo" 这样的异常文本，这里只处理字母、数字和下划线。
pub fn condense_repeats(text: &str, limit: usize) -> String {
    let mut condensed = String::with_capacity(text.len());
    let mut previous: Option<char> = None;
    let mut run = 0;

    for c in text.chars() {
        if Some(c) == previous {
            run += 1;
        } else {
            previous = Some(c);
            run = 1;
        }

        if run > limit && is_word_char(c) {
            continue;
        }
        condensed.push(c);
    }

    condensed
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// 自然排序键的组成部分
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKeyPart {
    Number(u64),
    Text(String),
}

impl Ord for SortKeyPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKeyPart::Number(a), SortKeyPart::Number(b)) => a.cmp(b),
            (SortKeyPart::Text(a), SortKeyPart::Text(b)) => a.cmp(b),
            (SortKeyPart::Number(_), SortKeyPart::Text(_)) => Ordering::Less,
            (SortKeyPart::Text(_), SortKeyPart::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for SortKeyPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 生成混合数字/字母的自然排序键
///
/// `chapter2.xhtml` 会排在 `chapter10.xhtml` 之前。
pub fn natural_sort_key(value: &str) -> Vec<SortKeyPart> {
    let mut parts = Vec::new();
    let mut digits = String::new();
    let mut letters = String::new();

    for c in value.chars() {
        if c.is_ascii_digit() {
            if !letters.is_empty() {
                parts.push(SortKeyPart::Text(std::mem::take(&mut letters)));
            }
            digits.push(c);
        } else {
            if !digits.is_empty() {
                parts.push(parse_number(&std::mem::take(&mut digits)));
            }
            letters.push(c);
        }
    }

    if !digits.is_empty() {
        parts.push(parse_number(&digits));
    }
    if !letters.is_empty() {
        parts.push(SortKeyPart::Text(letters));
    }

    parts
}

fn parse_number(digits: &str) -> SortKeyPart {
    // 超长数字串退化为文本比较
    digits
        .parse::<u64>()
        .map(SortKeyPart::Number)
        .unwrap_or_else(|_| SortKeyPart::Text(digits.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condense_repeats_caps_runs() {
        assert_eq!(condense_repeats("helllllo", 4), "hellllo");
        assert_eq!(condense_repeats("hello", 4), "hello");
        assert_eq!(condense_repeats("aaaa", 4), "aaaa");
        assert_eq!(condense_repeats("啊啊啊啊啊啊", 4), "啊啊啊啊");
    }

    #[test]
    fn test_condense_repeats_ignores_punctuation() {
        assert_eq!(condense_repeats("wait......", 4), "wait......");
        assert_eq!(condense_repeats("----", 4), "----");
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape_markup("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_markup("plain"), "plain");
    }

    #[test]
    fn test_trim_unicode_whitespace() {
        assert_eq!(trim("\u{3000} text \u{a0}\n"), "text");
    }

    #[test]
    fn test_natural_sort_key_orders_numbers() {
        let mut hrefs = vec!["text/ch10.xhtml", "text/ch2.xhtml", "text/ch1.xhtml", "cover.xhtml"];
        hrefs.sort_by_key(|href| natural_sort_key(href));
        assert_eq!(
            hrefs,
            vec!["cover.xhtml", "text/ch1.xhtml", "text/ch2.xhtml", "text/ch10.xhtml"]
        );
    }

    #[test]
    fn test_natural_sort_key_parts() {
        assert_eq!(
            natural_sort_key("a12b"),
            vec![
                SortKeyPart::Text("a".to_string()),
                SortKeyPart::Number(12),
                SortKeyPart::Text("b".to_string()),
            ]
        );
    }
}
