//! XHTML 页面的解析与序列化
//!
//! XHTML 必须是良构的 XML，不能交给 HTML5 解析器：`<div/>` 会吞掉后面的兄弟节点，
//! `<br/>` 写回时也会变成 `<br>`。这里用 xml5ever 建树（仍然是 rcdom），
//! 再按 XML 语法写回。

use std::borrow::Cow;
use std::cell::Cell;

use encoding_rs::Encoding;
use html5ever::interface::{
    Attribute, ElementFlags, ExpandedName, NodeOrText, QualName, QuirksMode, TreeSink,
};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{namespace_url, ns, Namespace, Prefix};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use xml5ever::driver::{parse_document, XmlParseOpts};

use crate::translation::error::{helpers, TranslationResult};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// 记录未闭合元素数量的 rcdom
///
/// xml5ever 在文件结束时会默默弹出所有仍然打开的元素，只能在输入耗尽前自己数。
struct XhtmlSink {
    dom: RcDom,
    open_elements: Cell<usize>,
}

impl TreeSink for XhtmlSink {
    type Handle = Handle;
    type Output = RcDom;
    type ElemName<'a> = ExpandedName<'a> where Self: 'a;

    fn finish(self) -> RcDom {
        self.dom
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.dom.parse_error(msg);
    }

    fn get_document(&self) -> Handle {
        self.dom.get_document()
    }

    fn elem_name<'a>(&'a self, target: &'a Handle) -> ExpandedName<'a> {
        self.dom.elem_name(target)
    }

    fn create_element(&self, name: QualName, attrs: Vec<Attribute>, flags: ElementFlags) -> Handle {
        self.open_elements.set(self.open_elements.get() + 1);
        self.dom.create_element(name, attrs, flags)
    }

    fn create_comment(&self, text: StrTendril) -> Handle {
        self.dom.create_comment(text)
    }

    fn create_pi(&self, target: StrTendril, data: StrTendril) -> Handle {
        self.dom.create_pi(target, data)
    }

    fn append(&self, parent: &Handle, child: NodeOrText<Handle>) {
        self.dom.append(parent, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Handle,
        prev_element: &Handle,
        child: NodeOrText<Handle>,
    ) {
        self.dom
            .append_based_on_parent_node(element, prev_element, child);
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        self.dom
            .append_doctype_to_document(name, public_id, system_id);
    }

    fn pop(&self, node: &Handle) {
        self.open_elements
            .set(self.open_elements.get().saturating_sub(1));
        self.dom.pop(node);
    }

    fn get_template_contents(&self, target: &Handle) -> Handle {
        self.dom.get_template_contents(target)
    }

    fn same_node(&self, x: &Handle, y: &Handle) -> bool {
        self.dom.same_node(x, y)
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        self.dom.set_quirks_mode(mode);
    }

    fn append_before_sibling(&self, sibling: &Handle, new_node: NodeOrText<Handle>) {
        self.dom.append_before_sibling(sibling, new_node);
    }

    fn add_attrs_if_missing(&self, target: &Handle, attrs: Vec<Attribute>) {
        self.dom.add_attrs_if_missing(target, attrs);
    }

    fn remove_from_parent(&self, target: &Handle) {
        self.dom.remove_from_parent(target);
    }

    fn reparent_children(&self, node: &Handle, new_parent: &Handle) {
        self.dom.reparent_children(node, new_parent);
    }
}

/// 将 XHTML 字节解析为 DOM
///
/// 文档不是良构的 XML 时返回 `ParseError`：标签不匹配、元素未闭合、
/// 未声明的命名空间前缀、根元素之外的内容或者缺少根元素。
pub fn xml_to_dom(data: &[u8], document_encoding: &str) -> TranslationResult<RcDom> {
    let s: String = match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => encoding.decode(data).0.into_owned(),
        None => String::from_utf8_lossy(data).into_owned(),
    };

    let sink = XhtmlSink {
        dom: RcDom::default(),
        open_elements: Cell::new(0),
    };
    let mut parser = parse_document(sink, XmlParseOpts::default());
    parser.process(StrTendril::from(s));
    let unclosed = parser.tokenizer.sink.sink.open_elements.get();
    let dom = parser.finish();

    if let Some(error) = dom.errors.borrow().first() {
        return Err(helpers::parse_error(format!("XHTML 不是良构的 XML: {}", error)));
    }
    if unclosed > 0 {
        return Err(helpers::parse_error(format!(
            "XHTML 不是良构的 XML: {} 个元素未闭合",
            unclosed
        )));
    }
    let has_root = dom
        .document
        .children
        .borrow()
        .iter()
        .any(|child| matches!(child.data, NodeData::Element { .. }));
    if !has_root {
        return Err(helpers::parse_error("XHTML 缺少根元素"));
    }

    Ok(dom)
}

/// 读取 XML 声明中的 `encoding`
pub fn get_xml_encoding(document: &Handle) -> Option<String> {
    document.children.borrow().iter().find_map(|child| match &child.data {
        NodeData::ProcessingInstruction { target, contents } if &**target == "xml" => {
            pseudo_attribute(contents, "encoding")
        }
        _ => None,
    })
}

fn pseudo_attribute(contents: &str, key: &str) -> Option<String> {
    let mut rest = contents;
    while let Some(index) = rest.find(key) {
        let after = rest[index + key.len()..].trim_start();
        rest = &rest[index + key.len()..];
        let Some(after) = after.strip_prefix('=') else {
            continue;
        };
        let after = after.trim_start();
        let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let value = &after[1..];
        return value.find(quote).map(|end| value[..end].to_string());
    }
    None
}

/// 把文档树写成 XML
pub fn serialize_xml(document: &Handle) -> String {
    let mut serializer = XmlSerializer::new();
    let mut parts = Vec::new();

    for child in document.children.borrow().iter() {
        let mut out = String::new();
        serializer.write_node(child, &mut out);
        if !out.is_empty() {
            parts.push(out);
        }
    }

    let mut output = parts.join("\n");
    output.push('\n');
    output
}

struct XmlSerializer {
    /// 当前作用域内的前缀绑定，`None` 为默认命名空间
    bindings: Vec<(Option<Prefix>, Namespace)>,
}

impl XmlSerializer {
    fn new() -> Self {
        Self {
            bindings: vec![(None, ns!()), (Some(Prefix::from("xml")), ns!(xml))],
        }
    }

    fn lookup(&self, prefix: &Option<Prefix>) -> Option<&Namespace> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == prefix)
            .map(|(_, ns)| ns)
    }

    fn prefix_for(&self, ns: &Namespace) -> Option<Prefix> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, url)| bound.is_some() && url == ns)
            .and_then(|(bound, _)| bound.clone())
            .filter(|prefix| self.lookup(&Some(prefix.clone())) == Some(ns))
    }

    fn write_node(&mut self, node: &Handle, out: &mut String) {
        match &node.data {
            NodeData::Document => {
                for child in node.children.borrow().iter() {
                    self.write_node(child, out);
                }
            }
            NodeData::Doctype {
                name,
                public_id,
                system_id,
            } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                if !public_id.is_empty() {
                    out.push_str(&format!(" PUBLIC \"{}\" \"{}\"", public_id, system_id));
                } else if !system_id.is_empty() {
                    out.push_str(&format!(" SYSTEM \"{}\"", system_id));
                }
                out.push('>');
            }
            NodeData::Text { contents } => out.push_str(&escape_text(&contents.borrow())),
            NodeData::Comment { contents } => {
                out.push_str("<!--");
                out.push_str(contents);
                out.push_str("-->");
            }
            NodeData::ProcessingInstruction { target, contents } => {
                out.push_str("<?");
                out.push_str(target);
                if !contents.trim().is_empty() {
                    out.push(' ');
                    out.push_str(contents.trim());
                }
                out.push_str("?>");
            }
            NodeData::Element { name, attrs, .. } => {
                let mark = self.bindings.len();
                let mut declarations = Vec::new();

                let tag = self.qualify(name, true, &mut declarations);
                let mut written_attrs = Vec::new();
                for attr in attrs.borrow().iter() {
                    if attr.name.ns == ns!(xmlns)
                        || (attr.name.ns == ns!() && &*attr.name.local == "xmlns")
                    {
                        continue;
                    }
                    let key = self.qualify(&attr.name, false, &mut declarations);
                    written_attrs.push((key, escape_attr(&attr.value)));
                }

                out.push('<');
                out.push_str(&tag);
                for (key, value) in declarations.iter().chain(written_attrs.iter()) {
                    out.push_str(&format!(" {}=\"{}\"", key, value));
                }

                let children = node.children.borrow();
                if children.is_empty() && self_closing(name) {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for child in children.iter() {
                        self.write_node(child, out);
                    }
                    out.push_str(&format!("</{}>", tag));
                }

                self.bindings.truncate(mark);
            }
        }
    }

    /// 写出限定名，作用域里缺少的绑定追加到 `declarations`
    fn qualify(
        &mut self,
        name: &QualName,
        is_element: bool,
        declarations: &mut Vec<(String, String)>,
    ) -> String {
        if !is_element && name.ns == ns!() {
            return name.local.to_string();
        }

        let prefix = match &name.prefix {
            Some(prefix) => Some(prefix.clone()),
            None if is_element => None,
            None => Some(
                self.prefix_for(&name.ns)
                    .unwrap_or_else(|| Prefix::from(format!("ns{}", declarations.len()).as_str())),
            ),
        };

        if self.lookup(&prefix) != Some(&name.ns) {
            let key = match &prefix {
                Some(prefix) => format!("xmlns:{}", prefix),
                None => "xmlns".to_string(),
            };
            declarations.push((key, escape_attr(&name.ns)));
            self.bindings.push((prefix.clone(), name.ns.clone()));
        }

        match prefix {
            Some(prefix) => format!("{}:{}", prefix, name.local),
            None => name.local.to_string(),
        }
    }
}

fn self_closing(name: &QualName) -> bool {
    name.ns != ns!(html) || VOID_ELEMENTS.contains(&&*name.local)
}

fn escape_text(text: &str) -> String {
    crate::utils::escape_markup(text)
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
