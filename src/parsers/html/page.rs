//! 书页
//!
//! 一个书页对应容器中的一个文件。只有解析出文档树的标记文件才参与提取。
//! `.xhtml`、`.xht` 和 `.xml` 按 XML 解析与写回，其余标记文件按 HTML5 处理。

use encoding_rs::Encoding;
use markup5ever_rcdom::{Handle, RcDom};

use super::dom::html_to_dom;
use super::serializer::{encode_markup, get_charset, serialize_document};
use super::xml::{get_xml_encoding, serialize_xml, xml_to_dom};
use crate::translation::error::TranslationResult;

/// 书页的标记语法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    #[default]
    Html,
    Xhtml,
}

impl Syntax {
    /// 按文件扩展名判断语法
    pub fn from_href(href: &str) -> Self {
        let extension = href
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "xhtml" | "xht" | "xml" => Syntax::Xhtml,
            _ => Syntax::Html,
        }
    }

    fn parse(self, data: &[u8], encoding: &str) -> TranslationResult<RcDom> {
        match self {
            Syntax::Html => html_to_dom(data, encoding),
            Syntax::Xhtml => xml_to_dom(data, encoding),
        }
    }

    fn declared_charset(self, document: &Handle) -> Option<String> {
        match self {
            Syntax::Html => get_charset(document),
            Syntax::Xhtml => get_xml_encoding(document).or_else(|| get_charset(document)),
        }
    }
}

/// 容器中的一个文件
#[derive(Debug, Clone)]
pub struct Page {
    pub id: String,
    pub href: String,
    /// 文档节点；非标记文件为 `None`
    pub tree: Option<Handle>,
    pub encoding: String,
    pub syntax: Syntax,
}

impl Page {
    /// 没有文档树的页面（图片、样式表等）
    pub fn resource(id: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            tree: None,
            encoding: String::new(),
            syntax: Syntax::Html,
        }
    }

    /// 解析标记文件
    ///
    /// 先按 `input_encoding`（缺省 UTF-8）解析，若文档声明了可识别的字符集则按声明重新解析。
    /// XHTML 页面不是良构的 XML 时返回 `ParseError`。
    pub fn from_markup(
        id: impl Into<String>,
        href: impl Into<String>,
        input_data: &[u8],
        input_encoding: Option<&str>,
    ) -> TranslationResult<Self> {
        let href = href.into();
        let syntax = Syntax::from_href(&href);
        let mut document_encoding = input_encoding.unwrap_or("utf-8").to_string();
        let mut dom = syntax.parse(input_data, &document_encoding)?;

        if let Some(declared) = syntax.declared_charset(&dom.document) {
            if let Some(charset) = Encoding::for_label_no_replacement(declared.as_bytes()) {
                if input_encoding.is_none() && charset.name() != "UTF-8" {
                    document_encoding = charset.name().to_string();
                    dom = syntax.parse(input_data, &document_encoding)?;
                }
            }
        }

        Ok(Self {
            id: id.into(),
            href,
            tree: Some(dom.document.clone()),
            encoding: document_encoding,
            syntax,
        })
    }

    /// 以原编码和原语法序列化文档树
    pub fn serialize(&self) -> Option<Vec<u8>> {
        self.tree.as_ref().map(|tree| match self.syntax {
            Syntax::Html => serialize_document(tree, &self.encoding),
            Syntax::Xhtml => encode_markup(&serialize_xml(tree), &self.encoding),
        })
    }
}
