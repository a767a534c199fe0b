//! 合并处理器
//!
//! 把相邻的多个元素合并成一条原文记录送去翻译，减少请求次数，也让翻译引擎
//! 获得更完整的上下文。
//!
//! # 核心功能
//!
//! - **按长度合并**: 累加内容（含分隔符）直到字符数即将达到合并长度
//! - **拼接不变量**: 所有批次的原始标记按分隔符拼接，等于所有参与翻译的元素标记按分隔符拼接
//! - **段落对齐**: 译文按分隔符拆分后重新对应到各个元素，段数不一致时按位置规则合并
//!
//! # 段数不一致
//!
//! 设原文 `m` 段、译文 `n` 段：
//!
//! - `m == n` 逐段对应
//! - `m > n` 左右排版时缺少的段落没有译文；其他位置把全部译文合并，
//!   `above` 放在第一段，其余放在最后一段
//! - `m < n` 前 `m - 1` 段逐段对应，多出的译文全部并入最后一段
//!
//! # 使用示例
//!
//! ```rust,ignore
//! let mut handler = MergeElementHandler::new(Placeholder::default(), "\n\n", Position::Below, 1800);
//! let records = handler.prepare_original(elements).to_vec();
//! // 翻译 records 后
//! handler.add_translations(&paragraphs)?;
//! ```

use regex::{NoExpand, Regex};

use super::{ElementHandler, HandlerState, OriginalRecord, Paragraph, TranslationMap};
use crate::translation::config::constants::MERGED_JOINER;
use crate::translation::element::{Element, Position};
use crate::translation::error::TranslationResult;
use crate::translation::pipeline::placeholder::Placeholder;
use crate::utils::uid;

/// 正在累积的批次
#[derive(Debug, Default)]
struct Batch {
    codes: Vec<String>,
    content: String,
    length: usize,
}

impl Batch {
    fn push(&mut self, code: String, content: &str) {
        self.codes.push(code);
        self.content.push_str(content);
        self.length += content.chars().count();
    }

    fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

pub struct MergeElementHandler {
    state: HandlerState,
    merge_length: usize,
}

impl MergeElementHandler {
    pub fn new(
        placeholder: Placeholder,
        separator: &str,
        position: Position,
        merge_length: usize,
    ) -> Self {
        Self {
            state: HandlerState::new(placeholder, separator, position),
            merge_length,
        }
    }

    fn flush(&mut self, batch: Batch) {
        let id = self.state.originals.len();
        let record = OriginalRecord {
            id,
            fingerprint: uid([id.to_string().as_str(), batch.content.as_str()]),
            raw: batch.codes.join(&self.state.separator),
            original: batch.content,
            ignored: false,
            attributes: None,
            page: None,
        };
        self.state.originals.push(record);
    }

    /// 把一个批次的原文与译文重新拆分成逐段对应的列表
    ///
    /// 返回的列表长度始终等于原文段数。
    pub fn align_paragraph(
        &self,
        paragraph: &Paragraph,
    ) -> TranslationResult<Vec<(String, Option<String>)>> {
        let separator = self.state.separator.as_str();
        let mut original = paragraph.original.clone();
        let mut translation = paragraph.translation.clone();

        // 旧格式的批次以占位符分段
        if !original.ends_with(separator) {
            let pattern = self.state.placeholder.separator_pattern()?;
            original = pattern.replace_all(&original, NoExpand(separator)).into_owned();
            translation = translation
                .map(|text| pattern.replace_all(&text, NoExpand(separator)).into_owned());
        }

        let originals: Vec<String> = original
            .trim()
            .split(separator)
            .map(str::to_string)
            .collect();

        let Some(translation) = translation else {
            return Ok(originals.into_iter().map(|text| (text, None)).collect());
        };

        let collapse = Regex::new(&format!("{}+", regex::escape(separator)))?;
        let translation = collapse.replace_all(&translation, NoExpand(separator));
        let mut translations: Vec<Option<String>> = translation
            .trim()
            .split(separator)
            .map(|text| Some(text.to_string()))
            .collect();

        let (m, n) = (originals.len(), translations.len());
        if m > n {
            if self.state.position.is_side_by_side() {
                translations.resize(m, None);
            } else {
                let merged = translations
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(MERGED_JOINER);
                translations = vec![None; m - 1];
                if self.state.position == Position::Above {
                    translations.insert(0, Some(merged));
                } else {
                    translations.push(Some(merged));
                }
            }
        } else if m < n {
            let rest = translations
                .split_off(m - 1)
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(MERGED_JOINER);
            translations.push(Some(rest));
        }

        Ok(originals.into_iter().zip(translations).collect())
    }
}

impl ElementHandler for MergeElementHandler {
    fn state(&self) -> &HandlerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HandlerState {
        &mut self.state
    }

    fn merge_length(&self) -> usize {
        self.merge_length
    }

    fn prepare_original(&mut self, elements: Vec<Box<dyn Element>>) -> &[OriginalRecord] {
        let start = self.state.originals.len();
        let mut batch = Batch::default();

        for mut element in elements {
            if element.ignored() {
                self.state.register(element);
                continue;
            }

            self.state.prepare_element(element.as_mut());
            let code = element.get_raw();
            let content = element.get_content() + &self.state.separator;

            if batch.length + content.chars().count() < self.merge_length {
                batch.push(code, &content);
            } else {
                let previous = std::mem::take(&mut batch);
                if !previous.is_empty() {
                    self.flush(previous);
                }
                batch.push(code, &content);
            }
            self.state.register(element);
        }

        if !batch.is_empty() {
            self.flush(batch);
        }

        tracing::debug!(
            "合并生成原文记录 {} 条，合并长度 {}",
            self.state.originals.len() - start,
            self.merge_length
        );
        &self.state.originals[start..]
    }

    fn prepare_translation(&self, paragraphs: &[Paragraph]) -> TranslationResult<TranslationMap> {
        let mut translations = TranslationMap::new();
        for paragraph in paragraphs {
            translations.extend(self.align_paragraph(paragraph)?);
        }
        Ok(translations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{append_child, create_html_element, create_text_node};
    use crate::parsers::html::serializer::serialize_node;
    use crate::translation::config::constants::DEFAULT_SEPARATOR;
    use crate::translation::element::PageElement;
    use markup5ever_rcdom::Handle;

    fn container(paragraphs: &[&str]) -> (Handle, Vec<Box<dyn Element>>) {
        let root = create_html_element("div", &[]);
        let mut elements: Vec<Box<dyn Element>> = Vec::new();
        for text in paragraphs {
            let p = create_html_element("p", &[]);
            append_child(&p, create_text_node(text));
            append_child(&root, p.clone());
            elements.push(Box::new(PageElement::new(p, None)));
        }
        (root, elements)
    }

    fn handler(position: Position, merge_length: usize) -> MergeElementHandler {
        MergeElementHandler::new(Placeholder::default(), DEFAULT_SEPARATOR, position, merge_length)
    }

    fn batch(original: &str, translation: Option<&str>) -> Paragraph {
        Paragraph::new(original, translation.map(str::to_string))
    }

    #[test]
    fn test_short_units_share_one_batch() {
        let (_root, elements) = container(&["Hello world.", "This is a test."]);
        let mut handler = handler(Position::Below, 50);
        let records = handler.prepare_original(elements).to_vec();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].original, "Hello world.\n\nThis is a test.\n\n");
        assert_eq!(records[0].raw, "<p>Hello world.</p>\n\n<p>This is a test.</p>");
        assert_eq!(handler.pending(), 2);
    }

    #[test]
    fn test_batches_split_at_merge_length() {
        let (_root, elements) = container(&["aaaaaaaa", "bbbbbbbb", "cccccccc", "dddddddddddddddddddddd"]);
        let mut handler = handler(Position::Below, 21);
        let records = handler.prepare_original(elements).to_vec();

        let originals: Vec<&str> = records.iter().map(|r| r.original.as_str()).collect();
        assert_eq!(
            originals,
            vec![
                "aaaaaaaa\n\nbbbbbbbb\n\n",
                "cccccccc\n\n",
                "dddddddddddddddddddddd\n\n"
            ]
        );
        let ids: Vec<usize> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_raw_concatenation_matches_elements() {
        let (_root, mut elements) = container(&["One", "Skip", "Two", "Three", "Four"]);
        elements[1].set_ignored(true);
        let expected: Vec<String> = elements
            .iter()
            .filter(|e| !e.ignored())
            .map(|e| e.get_raw())
            .collect();

        let mut handler = handler(Position::Below, 12);
        let records = handler.prepare_original(elements).to_vec();
        let raws: Vec<String> = records.iter().map(|r| r.raw.clone()).collect();

        assert!(records.len() > 1);
        assert_eq!(raws.join(DEFAULT_SEPARATOR), expected.join(DEFAULT_SEPARATOR));
        assert_eq!(handler.pending(), 5);
    }

    #[test]
    fn test_align_equal_counts() {
        let handler = handler(Position::Below, 100);
        let pairs = handler
            .align_paragraph(&batch("A\n\nB\n\n", Some("甲\n\n\n\n乙")))
            .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("A".to_string(), Some("甲".to_string())),
                ("B".to_string(), Some("乙".to_string()))
            ]
        );
    }

    #[test]
    fn test_align_fewer_translations() {
        let original = "A\n\nB\n\nC\n\n";

        let below = handler(Position::Below, 100)
            .align_paragraph(&batch(original, Some("甲\n\n乙")))
            .unwrap();
        assert_eq!(below.len(), 3);
        assert_eq!(below[0].1, None);
        assert_eq!(below[2].1.as_deref(), Some("甲\n\n乙"));

        let above = handler(Position::Above, 100)
            .align_paragraph(&batch(original, Some("甲\n\n乙")))
            .unwrap();
        assert_eq!(above[0].1.as_deref(), Some("甲\n\n乙"));
        assert_eq!(above[2].1, None);

        let right = handler(Position::Right, 100)
            .align_paragraph(&batch(original, Some("甲\n\n乙")))
            .unwrap();
        let translations: Vec<Option<&str>> = right.iter().map(|(_, t)| t.as_deref()).collect();
        assert_eq!(translations, vec![Some("甲"), Some("乙"), None]);
    }

    #[test]
    fn test_align_more_translations() {
        let pairs = handler(Position::Below, 100)
            .align_paragraph(&batch("A\n\nB\n\n", Some("甲\n\n乙\n\n丙")))
            .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("A".to_string(), Some("甲".to_string())),
                ("B".to_string(), Some("乙\n\n丙".to_string()))
            ]
        );
    }

    #[test]
    fn test_align_without_translation() {
        let pairs = handler(Position::Below, 100)
            .align_paragraph(&batch("A\n\nB\n\n", None))
            .unwrap();
        assert_eq!(pairs, vec![("A".to_string(), None), ("B".to_string(), None)]);
    }

    #[test]
    fn test_align_placeholder_separated_batch() {
        let pairs = handler(Position::Below, 100)
            .align_paragraph(&batch("A {{id_0}} B", Some("甲 {{id_1}} 乙")))
            .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("A".to_string(), Some("甲".to_string())),
                ("B".to_string(), Some("乙".to_string()))
            ]
        );
    }

    #[test]
    fn test_merged_round_trip() {
        let (root, elements) = container(&["Hello world.", "This is a test."]);
        let mut handler = handler(Position::Only, 50);
        let records = handler.prepare_original(elements).to_vec();

        let paragraphs = vec![Paragraph::from(&records[0]).with_translation("你好世界。\n\n这是测试。")];
        assert_eq!(handler.add_translations(&paragraphs).unwrap(), 2);
        assert_eq!(handler.pending(), 0);
        assert_eq!(
            serialize_node(&root),
            "<div><p>你好世界。</p><p>这是测试。</p></div>"
        );
    }
}
