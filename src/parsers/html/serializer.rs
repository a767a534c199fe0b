use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, SerializableHandle};
use regex::Regex;
use std::sync::OnceLock;

use super::dom::{find_nodes, get_node_attr};

fn namespace_regex() -> Option<&'static Regex> {
    static NAMESPACE: OnceLock<Option<Regex>> = OnceLock::new();
    NAMESPACE
        .get_or_init(|| Regex::new(r#"\sxmlns([^"]+"){2}"#).ok())
        .as_ref()
}

/// 序列化单个节点（包括节点本身）
pub fn serialize_node(node: &Handle) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let serializable = SerializableHandle::from(node.clone());
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    if let Err(e) = serialize(&mut buf, &serializable, opts) {
        tracing::warn!("节点序列化失败: {}", e);
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// 序列化节点并去掉命名空间声明
pub fn serialize_node_without_namespace(node: &Handle) -> String {
    let markup = serialize_node(node);
    match namespace_regex() {
        Some(regex) => regex.replace_all(&markup, "").trim().to_string(),
        None => markup.trim().to_string(),
    }
}

/// 序列化文档
///
/// `document_encoding` 为空或无法识别时输出 UTF-8。
pub fn serialize_document(document: &Handle, document_encoding: &str) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable = SerializableHandle::from(document.clone());
    if let Err(e) = serialize(&mut buf, &serializable, SerializeOpts::default()) {
        tracing::warn!("文档序列化失败: {}", e);
    }

    encode_markup(&String::from_utf8_lossy(&buf), document_encoding)
}

/// 按页面编码输出标记；编码为空或无法识别时输出 UTF-8
pub fn encode_markup(markup: &str, document_encoding: &str) -> Vec<u8> {
    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            let (data, _, _) = encoding.encode(markup);
            return data.into_owned();
        }
    }

    markup.as_bytes().to_vec()
}

/// 从 `<meta>` 中读取声明的字符集
pub fn get_charset(document: &Handle) -> Option<String> {
    for meta_node in find_nodes(document, vec!["html", "head", "meta"]).iter() {
        if let Some(charset) = get_node_attr(meta_node, "charset") {
            return Some(charset);
        }

        if get_node_attr(meta_node, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            if let Some(content_type) = get_node_attr(meta_node, "content") {
                let charset = content_type
                    .split(';')
                    .map(str::trim)
                    .find_map(|part| {
                        let (key, value) = part.split_once('=')?;
                        key.trim()
                            .eq_ignore_ascii_case("charset")
                            .then(|| value.trim().trim_matches('"').to_string())
                    });
                if charset.is_some() {
                    return charset;
                }
            }
        }
    }

    None
}
