//! 元数据与目录元素
//!
//! 元数据字段和目录标题都是单行文本，写回时与原文以空格拼接。

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::{Element, ElementBase, Position, ReinsertStyle};
use crate::translation::config::constants::{METADATA_PAGE_ID, TOC_PAGE_ID};
use crate::translation::error::TranslationResult;

/// 元数据字段中的一项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataItem {
    pub content: String,
}

pub type MetadataItemHandle = Rc<RefCell<MetadataItem>>;

/// 按名称分组、保持顺序的元数据
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    fields: Vec<(String, Vec<MetadataItemHandle>)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一项，同名字段合并到一起
    pub fn add(&mut self, name: &str, content: impl Into<String>) -> MetadataItemHandle {
        let item = Rc::new(RefCell::new(MetadataItem {
            content: content.into(),
        }));

        match self.fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, items)) => items.push(item.clone()),
            None => self.fields.push((name.to_string(), vec![item.clone()])),
        }
        item
    }

    pub fn get(&self, name: &str) -> Option<&[MetadataItemHandle]> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, items)| items.as_slice())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[MetadataItemHandle])> {
        self.fields
            .iter()
            .map(|(name, items)| (name.as_str(), items.as_slice()))
    }
}

/// 目录节点
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TocNode {
    pub title: String,
    pub href: Option<String>,
    pub nodes: Vec<TocHandle>,
}

pub type TocHandle = Rc<RefCell<TocNode>>;

impl TocNode {
    pub fn new(title: impl Into<String>, href: Option<String>) -> TocHandle {
        Rc::new(RefCell::new(Self {
            title: title.into(),
            href,
            nodes: Vec::new(),
        }))
    }
}

/// 前置、后置或替换
fn join_single_line(original: &str, translation: &str, position: Position) -> String {
    match position {
        Position::Only => translation.to_string(),
        Position::Above | Position::Left => format!("{} {}", translation, original),
        Position::Below | Position::Right => format!("{} {}", original, translation),
    }
}

/// 元数据项元素
#[derive(Debug, Clone)]
pub struct MetadataElement {
    base: ElementBase,
    item: MetadataItemHandle,
}

impl MetadataElement {
    pub fn new(item: MetadataItemHandle) -> Self {
        Self {
            base: ElementBase::new(Some(METADATA_PAGE_ID.to_string())),
            item,
        }
    }
}

impl Element for MetadataElement {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn get_raw(&self) -> String {
        self.item.borrow().content.clone()
    }

    fn get_text(&self) -> String {
        self.get_raw()
    }

    fn get_content(&mut self) -> String {
        self.get_raw()
    }

    fn add_translation(
        &mut self,
        translation: Option<&str>,
        position: Position,
        _style: &ReinsertStyle,
    ) -> TranslationResult<()> {
        if let Some(translation) = translation {
            let mut item = self.item.borrow_mut();
            item.content = join_single_line(&item.content, translation, position);
        }
        Ok(())
    }
}

/// 目录标题元素
#[derive(Debug, Clone)]
pub struct TocElement {
    base: ElementBase,
    node: TocHandle,
}

impl TocElement {
    pub fn new(node: TocHandle) -> Self {
        Self {
            base: ElementBase::new(Some(TOC_PAGE_ID.to_string())),
            node,
        }
    }
}

impl Element for TocElement {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn get_raw(&self) -> String {
        self.node.borrow().title.clone()
    }

    fn get_text(&self) -> String {
        self.get_raw()
    }

    fn get_content(&mut self) -> String {
        self.get_raw()
    }

    fn add_translation(
        &mut self,
        translation: Option<&str>,
        position: Position,
        _style: &ReinsertStyle,
    ) -> TranslationResult<()> {
        if let Some(translation) = translation {
            let mut node = self.node.borrow_mut();
            node.title = join_single_line(&node.title, translation, position);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_groups_fields() {
        let mut metadata = Metadata::new();
        metadata.add("title", "A Book");
        metadata.add("creator", "Someone");
        metadata.add("title", "Subtitle");

        let names: Vec<&str> = metadata.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["title", "creator"]);
        assert_eq!(metadata.get("title").unwrap().len(), 2);
        assert!(metadata.get("rights").is_none());
    }

    #[test]
    fn test_metadata_element_positions() {
        let style = ReinsertStyle::default();
        let mut metadata = Metadata::new();
        let item = metadata.add("title", "A Book");

        let mut element = MetadataElement::new(item.clone());
        assert_eq!(element.page_id(), Some("content.opf"));
        element.add_translation(Some("一本书"), Position::Left, &style).unwrap();
        assert_eq!(item.borrow().content, "一本书 A Book");

        element.add_translation(None, Position::Only, &style).unwrap();
        assert_eq!(item.borrow().content, "一本书 A Book");
    }

    #[test]
    fn test_toc_element_positions() {
        let style = ReinsertStyle::default();
        let node = TocNode::new("Chapter One", Some("ch1.xhtml".into()));
        let mut element = TocElement::new(node.clone());
        assert_eq!(element.page_id(), Some("toc.ncx"));
        assert_eq!(element.get_content(), "Chapter One");

        element.add_translation(Some("第一章"), Position::Right, &style).unwrap();
        assert_eq!(node.borrow().title, "Chapter One 第一章");

        let only = TocNode::new("Chapter Two", None);
        TocElement::new(only.clone())
            .add_translation(Some("第二章"), Position::Only, &style)
            .unwrap();
        assert_eq!(only.borrow().title, "第二章");
    }
}
