use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{namespace_url, ns, parse_document, parse_fragment, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

use crate::translation::error::{helpers, TranslationError, TranslationResult};

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> TranslationResult<RcDom> {
    let s: String = if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        string.to_string()
    } else {
        String::from_utf8_lossy(data).to_string()
    };

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())
        .map_err(|e| TranslationError::ParseError(format!("无法解析页面: {}", e)))
}

/// 在指定元素的上下文中解析标记片段，返回片段的顶层节点
pub fn parse_fragment_nodes(context: &QualName, markup: &str) -> Vec<Handle> {
    let dom = parse_fragment(RcDom::default(), Default::default(), context.clone(), vec![])
        .one(markup);

    // 片段解析器会把结果放在一个 html 根元素下
    let root = dom
        .document
        .children
        .borrow()
        .iter()
        .find(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned();

    match root {
        Some(root) => {
            let children: Vec<Handle> = root.children.borrow().iter().cloned().collect();
            for child in &children {
                child.parent.set(None);
            }
            root.children.borrow_mut().clear();
            children
        }
        None => Vec::new(),
    }
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: Vec<&str>) -> Vec<Handle> {
    if node_names.is_empty() {
        return Vec::new();
    }

    let mut found_nodes = Vec::new();
    let node_name = node_names[0];

    if node_names.len() == 1 {
        if let NodeData::Element { ref name, .. } = node.data {
            if &*name.local == node_name {
                found_nodes.push(node.clone());
            }
        }

        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    } else if let NodeData::Element { ref name, .. } = node.data {
        if &*name.local == node_name {
            let mut new_node_names = node_names;
            new_node_names.remove(0);
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes(child_node, new_node_names.clone()));
            }
        } else {
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
            }
        }
    } else {
        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    }

    found_nodes
}

/// 按文档顺序查找名称属于 `tags` 的所有后代元素（不包括自身）
pub fn find_descendants(node: &Handle, tags: &[&str]) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_descendants(node, tags, &mut found);
    found
}

fn collect_descendants(node: &Handle, tags: &[&str], found: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if let Some(name) = get_node_name(child) {
            if tags.contains(&name) {
                found.push(child.clone());
            }
        }
        collect_descendants(child, tags, found);
    }
}

/// 获取元素子节点
pub fn element_children(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 按原始顺序获取节点的全部属性
pub fn get_node_attrs(node: &Handle) -> Vec<(String, String)> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

/// 按原始顺序获取节点的全部属性，保留限定名
pub fn get_node_attributes(node: &Handle) -> Vec<Attribute> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs.borrow().clone(),
        _ => Vec::new(),
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取元素的限定名
pub fn get_node_qualname(node: &Handle) -> Option<QualName> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.clone()),
        _ => None,
    }
}

/// 获取父节点
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// 设置节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.clone() {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value.as_str());
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value {
                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: StrTendril::from(attr_value),
                });
            }
        }
    };
}

/// 创建 HTML 命名空间下的新元素
pub fn create_html_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    let name = QualName::new(None, ns!(html), LocalName::from(tag));
    create_element_with_name(name, attrs)
}

/// 使用给定限定名创建新元素
pub fn create_element_with_name(name: QualName, attrs: &[(&str, &str)]) -> Handle {
    let attrs = attrs
        .iter()
        .map(|(key, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*key)),
            value: StrTendril::from(*value),
        })
        .collect();

    create_element_with_attrs(name, attrs)
}

/// 使用给定限定名和属性创建新元素
pub fn create_element_with_attrs(name: QualName, attrs: Vec<Attribute>) -> Handle {
    Node::new(NodeData::Element {
        name,
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// 创建文本节点
pub fn create_text_node(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from(text)),
    })
}

/// 深拷贝节点及其全部后代
pub fn deep_clone(node: &Handle) -> Handle {
    let data = match &node.data {
        NodeData::Document => NodeData::Document,
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => NodeData::Doctype {
            name: name.clone(),
            public_id: public_id.clone(),
            system_id: system_id.clone(),
        },
        NodeData::Text { contents } => NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        },
        NodeData::Comment { contents } => NodeData::Comment {
            contents: contents.clone(),
        },
        NodeData::Element {
            name,
            attrs,
            template_contents,
            mathml_annotation_xml_integration_point,
        } => NodeData::Element {
            name: name.clone(),
            attrs: RefCell::new(attrs.borrow().clone()),
            template_contents: RefCell::new(template_contents.borrow().as_ref().map(deep_clone)),
            mathml_annotation_xml_integration_point: *mathml_annotation_xml_integration_point,
        },
        NodeData::ProcessingInstruction { target, contents } => {
            NodeData::ProcessingInstruction {
                target: target.clone(),
                contents: contents.clone(),
            }
        }
    };

    let copy = Node::new(data);
    for child in node.children.borrow().iter() {
        append_child(&copy, deep_clone(child));
    }
    copy
}

/// 把节点从父节点中移除
pub fn detach(node: &Handle) {
    if let Some(parent) = get_parent_node(node) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.parent.set(None);
}

/// 追加子节点
pub fn append_child(parent: &Handle, child: Handle) {
    detach(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

fn position_in_parent(node: &Handle) -> TranslationResult<(Handle, usize)> {
    let parent = get_parent_node(node).ok_or_else(|| helpers::tree_error("节点没有父节点"))?;
    let index = parent
        .children
        .borrow()
        .iter()
        .position(|child| Rc::ptr_eq(child, node))
        .ok_or_else(|| helpers::tree_error("父节点中找不到该节点"))?;
    Ok((parent, index))
}

/// 在 `sibling` 之前插入节点
pub fn insert_before(sibling: &Handle, new_node: Handle) -> TranslationResult<()> {
    detach(&new_node);
    let (parent, index) = position_in_parent(sibling)?;
    new_node.parent.set(Some(Rc::downgrade(&parent)));
    parent.children.borrow_mut().insert(index, new_node);
    Ok(())
}

/// 在 `sibling` 之后插入节点
pub fn insert_after(sibling: &Handle, new_node: Handle) -> TranslationResult<()> {
    detach(&new_node);
    let (parent, index) = position_in_parent(sibling)?;
    new_node.parent.set(Some(Rc::downgrade(&parent)));
    parent.children.borrow_mut().insert(index + 1, new_node);
    Ok(())
}

/// 用新节点替换旧节点
pub fn replace_node(old: &Handle, new_node: Handle) -> TranslationResult<()> {
    insert_before(old, new_node)?;
    detach(old);
    Ok(())
}

/// 拼接节点下所有文本（等同于 itertext）
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, text: &mut String) {
    if let NodeData::Text { ref contents } = node.data {
        text.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, text);
    }
}

/// 元素在第一个子元素之前的直接文本
pub fn leading_text(node: &Handle) -> String {
    let mut text = String::new();
    for child in node.children.borrow().iter() {
        match child.data {
            NodeData::Text { ref contents } => text.push_str(&contents.borrow()),
            NodeData::Element { .. } => break,
            _ => {}
        }
    }
    text
}

/// 元素结束标签之后、下一个兄弟元素之前的文本
pub fn tail_text(node: &Handle) -> String {
    let mut text = String::new();
    for sibling in following_siblings(node) {
        match sibling.data {
            NodeData::Text { ref contents } => text.push_str(&contents.borrow()),
            NodeData::Element { .. } => break,
            _ => {}
        }
    }
    text
}

/// 删除元素之后紧邻的文本节点
pub fn clear_tail(node: &Handle) {
    for sibling in following_siblings(node) {
        match sibling.data {
            NodeData::Text { .. } => detach(&sibling),
            NodeData::Element { .. } => break,
            _ => {}
        }
    }
}

fn following_siblings(node: &Handle) -> Vec<Handle> {
    let Some(parent) = get_parent_node(node) else {
        return Vec::new();
    };
    let children = parent.children.borrow();
    children
        .iter()
        .position(|child| Rc::ptr_eq(child, node))
        .map(|index| children[index + 1..].to_vec())
        .unwrap_or_default()
}
