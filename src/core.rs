//! 文档级处理入口
//!
//! 按扩展名识别源格式，解析文档，提取原文记录；译文返回后重新提取同一文档、
//! 写回译文并序列化为原格式。提取是确定性的，因此两次运行得到的元素一一对应。

use std::fmt;
use std::path::Path;

use crate::parsers::{AnnotationDocument, Page, SubtitleDocument};
use crate::translation::config::constants::DEFAULT_SEPARATOR;
use crate::translation::element::Element;
use crate::translation::error::{helpers, TranslationError, TranslationResult};
use crate::translation::handler::{get_element_handler, OriginalRecord, Paragraph};
use crate::translation::pipeline::Placeholder;
use crate::translation::sources::{
    get_annotation_elements, get_page_elements, get_subtitle_elements,
};
use crate::translation::TranslationConfig;

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// 支持的源文档格式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    /// 网页或电子书书页
    Html,
    /// SRT 字幕
    Subtitle,
    /// PGN 棋谱
    Annotation,
}

impl DocumentFormat {
    /// 按扩展名识别格式
    pub fn from_path(path: &Path) -> TranslationResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "html" | "htm" | "xhtml" | "xht" | "xml" => Ok(DocumentFormat::Html),
            "srt" => Ok(DocumentFormat::Subtitle),
            "pgn" => Ok(DocumentFormat::Annotation),
            _ => Err(TranslationError::InvalidInput(format!(
                "无法识别的文件格式: {}",
                path.display()
            ))),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Html => f.write_str("html"),
            DocumentFormat::Subtitle => f.write_str("srt"),
            DocumentFormat::Annotation => f.write_str("pgn"),
        }
    }
}

/// 处理选项
#[derive(Clone, Debug)]
pub struct InterleafOptions {
    pub config: TranslationConfig,
    pub placeholder: Placeholder,
    pub separator: String,
    /// 网页的输入编码，缺省时按文档声明
    pub encoding: Option<String>,
}

impl Default for InterleafOptions {
    fn default() -> Self {
        Self {
            config: TranslationConfig::default(),
            placeholder: Placeholder::default(),
            separator: DEFAULT_SEPARATOR.to_string(),
            encoding: None,
        }
    }
}

/// 解析后的源文档
#[derive(Debug)]
pub enum Document {
    Html(Page),
    Subtitle(SubtitleDocument),
    Annotation(AnnotationDocument),
}

impl Document {
    /// 解析文档，`name` 作为网页的 id 和 href
    pub fn parse(
        format: DocumentFormat,
        name: &str,
        input_data: &[u8],
        input_encoding: Option<&str>,
    ) -> TranslationResult<Self> {
        match format {
            DocumentFormat::Html => Ok(Document::Html(Page::from_markup(
                name,
                name,
                input_data,
                input_encoding,
            )?)),
            DocumentFormat::Subtitle => {
                Ok(Document::Subtitle(SubtitleDocument::parse(&decode_text(input_data)?)?))
            }
            DocumentFormat::Annotation => Ok(Document::Annotation(AnnotationDocument::parse(
                &decode_text(input_data)?,
            )?)),
        }
    }

    pub fn elements(&self, config: &TranslationConfig) -> TranslationResult<Vec<Box<dyn Element>>> {
        match self {
            Document::Html(page) => get_page_elements(std::slice::from_ref(page), config),
            Document::Subtitle(document) => Ok(get_subtitle_elements(document)),
            Document::Annotation(document) => Ok(get_annotation_elements(document)),
        }
    }

    /// 以原格式输出
    pub fn render(&self) -> TranslationResult<Vec<u8>> {
        match self {
            Document::Html(page) => page
                .serialize()
                .ok_or_else(|| helpers::tree_error(format!("页面 {} 没有文档树", page.href))),
            Document::Subtitle(document) => Ok(document.render().into_bytes()),
            Document::Annotation(document) => Ok(document.render().into_bytes()),
        }
    }
}

fn decode_text(input_data: &[u8]) -> TranslationResult<String> {
    let text = std::str::from_utf8(input_data)
        .map_err(|e| helpers::parse_error(format!("文本不是有效的 UTF-8: {}", e)))?;
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// 提取原文记录
pub fn extract_records(
    format: DocumentFormat,
    name: &str,
    input_data: &[u8],
    options: &InterleafOptions,
) -> TranslationResult<Vec<OriginalRecord>> {
    let document = Document::parse(format, name, input_data, options.encoding.as_deref())?;
    let mut handler = get_element_handler(
        &options.config,
        options.placeholder.clone(),
        &options.separator,
    );
    let records = handler
        .prepare_original(document.elements(&options.config)?)
        .to_vec();

    tracing::info!("{} 提取原文记录 {} 条", name, records.len());
    Ok(records)
}

/// 写回译文，返回序列化后的文档和写入译文的元素数量
pub fn apply_translations(
    format: DocumentFormat,
    name: &str,
    input_data: &[u8],
    paragraphs: &[Paragraph],
    options: &InterleafOptions,
) -> TranslationResult<(Vec<u8>, usize)> {
    let document = Document::parse(format, name, input_data, options.encoding.as_deref())?;
    let mut handler = get_element_handler(
        &options.config,
        options.placeholder.clone(),
        &options.separator,
    );
    handler.prepare_original(document.elements(&options.config)?);
    let applied = handler.add_translations(paragraphs)?;

    if handler.pending() > 0 {
        tracing::warn!("{} 有 {} 个元素没有译文", name, handler.pending());
    }
    tracing::info!("{} 写回译文 {} 条", name, applied);

    Ok((document.render()?, applied))
}

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
}
