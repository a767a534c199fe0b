//! 元素处理器
//!
//! 处理器负责一份文档的完整翻译周期：
//!
//! 1. `prepare_original` 为每个元素设置占位符与栏间距，生成原文记录，登记待写回的元素
//! 2. 调用方拿原文记录去缓存或翻译引擎换回 `Paragraph`
//! 3. `add_translations` 按原文查找译文并写回，已写回的元素离开待处理集合
//!
//! 逐条模式下一个元素对应一条记录；合并模式下多个元素按长度上限合并成一条记录，
//! 译文返回后再重新对齐到各个元素。

pub mod merge;
pub mod single;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::translation::config::TranslationConfig;
use crate::translation::element::{ColumnGap, Element, Position, ReinsertStyle};
use crate::translation::error::TranslationResult;
use crate::translation::pipeline::placeholder::Placeholder;

pub use merge::MergeElementHandler;
pub use single::SingleElementHandler;

/// 原文记录，生成后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalRecord {
    pub id: usize,
    /// 编号与内容的指纹
    pub fingerprint: String,
    pub raw: String,
    pub original: String,
    pub ignored: bool,
    pub attributes: Option<BTreeMap<String, String>>,
    pub page: Option<String>,
}

/// 翻译段落
///
/// 调用方在原文记录的基础上填入译文、引擎和目标语言后交回处理器。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paragraph {
    pub id: usize,
    pub fingerprint: String,
    pub raw: String,
    pub original: String,
    pub ignored: bool,
    pub attributes: Option<BTreeMap<String, String>>,
    pub page: Option<String>,
    pub translation: Option<String>,
    pub engine_name: Option<String>,
    pub target_lang: Option<String>,
}

impl Paragraph {
    pub fn new(original: impl Into<String>, translation: Option<String>) -> Self {
        Self {
            original: original.into(),
            translation,
            ..Default::default()
        }
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = Some(translation.into());
        self
    }
}

impl From<&OriginalRecord> for Paragraph {
    fn from(record: &OriginalRecord) -> Self {
        Self {
            id: record.id,
            fingerprint: record.fingerprint.clone(),
            raw: record.raw.clone(),
            original: record.original.clone(),
            ignored: record.ignored,
            attributes: record.attributes.clone(),
            page: record.page.clone(),
            translation: None,
            engine_name: None,
            target_lang: None,
        }
    }
}

/// 原文到译文的查找表
pub type TranslationMap = HashMap<String, Option<String>>;

/// 处理器共有的状态
pub struct HandlerState {
    pub placeholder: Placeholder,
    pub separator: String,
    pub position: Position,
    pub style: ReinsertStyle,
    pub column_gap: Option<ColumnGap>,
    /// 等待写回的元素
    pub elements: BTreeMap<usize, Box<dyn Element>>,
    pub originals: Vec<OriginalRecord>,
    next_key: usize,
}

impl HandlerState {
    pub fn new(placeholder: Placeholder, separator: impl Into<String>, position: Position) -> Self {
        Self {
            placeholder,
            separator: separator.into(),
            position,
            style: ReinsertStyle::default(),
            column_gap: None,
            elements: BTreeMap::new(),
            originals: Vec::new(),
            next_key: 0,
        }
    }

    /// 设置占位符和栏间距
    pub fn prepare_element(&self, element: &mut dyn Element) {
        element.set_placeholder(self.placeholder.clone());
        if let Some(column_gap) = self.column_gap {
            element.set_column_gap(column_gap);
        }
    }

    /// 登记待写回的元素
    pub fn register(&mut self, element: Box<dyn Element>) -> usize {
        let key = self.next_key;
        self.elements.insert(key, element);
        self.next_key += 1;
        key
    }
}

/// 元素处理器特征
pub trait ElementHandler {
    fn state(&self) -> &HandlerState;

    fn state_mut(&mut self) -> &mut HandlerState;

    /// 合并长度，逐条模式为 0
    fn merge_length(&self) -> usize {
        0
    }

    fn set_translation_lang(&mut self, lang: Option<String>) {
        self.state_mut().style.translation_lang = lang;
    }

    fn set_original_color(&mut self, color: Option<String>) {
        self.state_mut().style.original_color = color;
    }

    fn set_translation_color(&mut self, color: Option<String>) {
        self.state_mut().style.translation_color = color;
    }

    fn set_column_gap(&mut self, column_gap: Option<ColumnGap>) {
        self.state_mut().column_gap = column_gap;
    }

    fn position(&self) -> Position {
        self.state().position
    }

    /// 生成原文记录并登记元素
    fn prepare_original(&mut self, elements: Vec<Box<dyn Element>>) -> &[OriginalRecord];

    /// 生成原文到译文的查找表
    fn prepare_translation(&self, paragraphs: &[Paragraph]) -> TranslationResult<TranslationMap>;

    fn originals(&self) -> &[OriginalRecord] {
        &self.state().originals
    }

    /// 尚未写回的元素数量
    fn pending(&self) -> usize {
        self.state().elements.len()
    }

    /// 写回译文，返回本次写入译文的元素数量
    ///
    /// 被忽略的元素只应用原文样式后移出待处理集合；没有译文的元素保留，
    /// 以便之后带着补齐的译文再次调用。左右排版时原文已经被表格替换，
    /// 因此同样移出待处理集合。
    fn add_translations(&mut self, paragraphs: &[Paragraph]) -> TranslationResult<usize> {
        let translations = self.prepare_translation(paragraphs)?;
        let state = self.state_mut();
        let position = state.position;
        let mut applied = 0;

        let keys: Vec<usize> = state.elements.keys().copied().collect();
        for key in keys {
            let Some(element) = state.elements.get_mut(&key) else {
                continue;
            };

            if element.ignored() {
                element.add_translation(None, position, &state.style)?;
                state.elements.remove(&key);
                continue;
            }

            let original = element.get_content();
            match translations.get(&original).and_then(|t| t.as_deref()) {
                Some(translation) => {
                    element.add_translation(Some(translation), position, &state.style)?;
                    state.elements.remove(&key);
                    applied += 1;
                }
                None => {
                    element.add_translation(None, position, &state.style)?;
                    if position.is_side_by_side() {
                        state.elements.remove(&key);
                    }
                }
            }
        }

        tracing::debug!(
            "写回译文 {} 条，剩余待处理 {} 条",
            applied,
            state.elements.len()
        );
        Ok(applied)
    }
}

/// 按配置创建处理器
pub fn get_element_handler(
    config: &TranslationConfig,
    placeholder: Placeholder,
    separator: &str,
) -> Box<dyn ElementHandler> {
    let position = config.translation_position;
    let mut handler: Box<dyn ElementHandler> = if config.merge_enabled {
        Box::new(MergeElementHandler::new(
            placeholder,
            separator,
            position,
            config.merge_length,
        ))
    } else {
        Box::new(SingleElementHandler::new(placeholder, separator, position))
    };

    handler.set_column_gap(config.column_gap.resolve());
    handler.set_original_color(config.original_color.clone());
    handler.set_translation_color(config.translation_color.clone());
    handler.set_translation_lang(config.translation_lang.clone());
    handler
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::config::constants::DEFAULT_SEPARATOR;

    #[test]
    fn test_paragraph_from_record() {
        let record = OriginalRecord {
            id: 3,
            fingerprint: "abc".into(),
            raw: "<p>Hi</p>".into(),
            original: "Hi".into(),
            ignored: false,
            attributes: None,
            page: Some("ch1".into()),
        };
        let paragraph = Paragraph::from(&record).with_translation("你好");
        assert_eq!(paragraph.id, 3);
        assert_eq!(paragraph.original, "Hi");
        assert_eq!(paragraph.translation.as_deref(), Some("你好"));
    }

    #[test]
    fn test_paragraph_minimal_json() {
        let paragraphs: Vec<Paragraph> =
            serde_json::from_str(r#"[{"original": "Hi", "translation": "你好"}]"#).unwrap();
        assert_eq!(paragraphs[0].original, "Hi");
        assert_eq!(paragraphs[0].translation.as_deref(), Some("你好"));
        assert!(!paragraphs[0].ignored);
    }

    #[test]
    fn test_get_element_handler_by_config() {
        let config = TranslationConfig::default();
        let handler = get_element_handler(&config, Placeholder::default(), DEFAULT_SEPARATOR);
        assert_eq!(handler.merge_length(), 0);
        assert_eq!(handler.state().column_gap, Some(ColumnGap::Percentage(10)));

        let config = TranslationConfig {
            merge_enabled: true,
            merge_length: 300,
            translation_position: Position::Right,
            ..Default::default()
        };
        let handler = get_element_handler(&config, Placeholder::default(), DEFAULT_SEPARATOR);
        assert_eq!(handler.merge_length(), 300);
        assert_eq!(handler.position(), Position::Right);
    }
}
