//! 各类源文档的元素收集
//!
//! 书页、目录、元数据、字幕和棋谱注释各自生成一组 `Element`，交给处理器统一处理。
//! 电子书的顺序固定为书页、目录、元数据。

use crate::parsers::annotation::AnnotationDocument;
use crate::parsers::html::Page;
use crate::parsers::subtitle::SubtitleDocument;
use crate::translation::config::constants::METADATA_NAMES;
use crate::translation::config::TranslationConfig;
use crate::translation::element::record::TocHandle;
use crate::translation::element::{
    AnnotationElement, Element, Metadata, MetadataElement, SubtitleElement, TocElement,
};
use crate::translation::error::TranslationResult;
use crate::translation::pipeline::Extraction;

/// 一本电子书的全部可翻译内容
#[derive(Debug, Clone, Default)]
pub struct EbookSource {
    pub pages: Vec<Page>,
    pub toc: Vec<TocHandle>,
    pub metadata: Metadata,
}

/// 书页元素，已经过忽略规则与内容过滤
pub fn get_page_elements(
    pages: &[Page],
    config: &TranslationConfig,
) -> TranslationResult<Vec<Box<dyn Element>>> {
    let mut extraction = Extraction::new(config)?;
    Ok(extraction
        .get_elements(pages)
        .into_iter()
        .map(|element| Box::new(element) as Box<dyn Element>)
        .collect())
}

/// 元数据元素：只取常用字段中含有英文字母的项
pub fn get_metadata_elements(metadata: &Metadata) -> Vec<Box<dyn Element>> {
    let mut elements: Vec<Box<dyn Element>> = Vec::new();
    for (name, items) in metadata.fields() {
        if !METADATA_NAMES.contains(&name) {
            continue;
        }
        for item in items {
            if !item.borrow().content.chars().any(|c| c.is_ascii_alphabetic()) {
                continue;
            }
            elements.push(Box::new(MetadataElement::new(item.clone())));
        }
    }
    elements
}

/// 目录元素，深度优先先序
pub fn get_toc_elements(nodes: &[TocHandle]) -> Vec<Box<dyn Element>> {
    let mut elements = Vec::new();
    collect_toc_elements(nodes, &mut elements);
    elements
}

fn collect_toc_elements(nodes: &[TocHandle], elements: &mut Vec<Box<dyn Element>>) {
    for node in nodes {
        elements.push(Box::new(TocElement::new(node.clone())));
        let children = node.borrow().nodes.clone();
        collect_toc_elements(&children, elements);
    }
}

pub fn get_subtitle_elements(document: &SubtitleDocument) -> Vec<Box<dyn Element>> {
    document
        .cues()
        .iter()
        .map(|cue| Box::new(SubtitleElement::new(cue.clone())) as Box<dyn Element>)
        .collect()
}

pub fn get_annotation_elements(document: &AnnotationDocument) -> Vec<Box<dyn Element>> {
    document
        .comments()
        .iter()
        .map(|comment| Box::new(AnnotationElement::new(comment.clone())) as Box<dyn Element>)
        .collect()
}

/// 电子书元素：书页、目录、元数据
pub fn get_ebook_elements(
    source: &EbookSource,
    config: &TranslationConfig,
) -> TranslationResult<Vec<Box<dyn Element>>> {
    let mut elements = get_page_elements(&source.pages, config)?;
    elements.extend(get_toc_elements(&source.toc));
    elements.extend(get_metadata_elements(&source.metadata));
    tracing::debug!("电子书元素共 {} 个", elements.len());
    Ok(elements)
}

impl SubtitleDocument {
    pub fn elements(&self) -> Vec<Box<dyn Element>> {
        get_subtitle_elements(self)
    }
}

impl AnnotationDocument {
    pub fn elements(&self) -> Vec<Box<dyn Element>> {
        get_annotation_elements(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::element::TocNode;

    #[test]
    fn test_metadata_elements_filtered() {
        let mut metadata = Metadata::new();
        metadata.add("title", "A Book");
        metadata.add("identifier", "urn:isbn:123");
        metadata.add("creator", "张三");
        metadata.add("creator", "Someone");
        metadata.add("date", "2020");

        let texts: Vec<String> = get_metadata_elements(&metadata)
            .iter()
            .map(|e| e.get_raw())
            .collect();
        assert_eq!(texts, vec!["A Book", "Someone"]);
    }

    #[test]
    fn test_toc_preorder() {
        let part = TocNode::new("Part I", None);
        let chapter = TocNode::new("Chapter 1", Some("ch1.xhtml".into()));
        chapter
            .borrow_mut()
            .nodes
            .push(TocNode::new("Section 1.1", Some("ch1.xhtml#s1".into())));
        part.borrow_mut().nodes.push(chapter);
        let appendix = TocNode::new("Appendix", None);

        let titles: Vec<String> = get_toc_elements(&[part, appendix])
            .iter()
            .map(|e| e.get_raw())
            .collect();
        assert_eq!(titles, vec!["Part I", "Chapter 1", "Section 1.1", "Appendix"]);
    }

    #[test]
    fn test_ebook_order() {
        let mut metadata = Metadata::new();
        metadata.add("title", "Book");
        let source = EbookSource {
            pages: vec![Page::from_markup("c1", "ch1.html", b"<p>Text</p>", None).unwrap()],
            toc: vec![TocNode::new("Chapter", None)],
            metadata,
        };

        let elements = get_ebook_elements(&source, &TranslationConfig::default()).unwrap();
        let pages: Vec<Option<&str>> = elements.iter().map(|e| e.page_id()).collect();
        assert_eq!(pages, vec![Some("c1"), Some("toc.ncx"), Some("content.opf")]);
    }

    #[test]
    fn test_text_document_elements() {
        let subtitles = SubtitleDocument::parse("1\n00:00:01,000 --> 00:00:02,000\nHi\n").unwrap();
        assert_eq!(subtitles.elements().len(), 1);

        let annotations = AnnotationDocument::parse("1. e4 {Best by test} e5 {1-0}").unwrap();
        let texts: Vec<String> = annotations.elements().iter().map(|e| e.get_text()).collect();
        assert_eq!(texts, vec!["Best by test"]);
    }
}
