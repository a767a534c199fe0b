//! 书页节点元素

use std::collections::BTreeMap;

use markup5ever_rcdom::Handle;

use super::layout::create_table;
use super::{Element, ElementBase, Position, ReinsertStyle};
use crate::parsers::html::dom::{
    append_child, clear_tail, create_element_with_attrs, create_text_node, deep_clone, detach,
    find_descendants, get_node_attributes, get_node_attrs, get_node_name, get_node_qualname,
    insert_after,
    insert_before, parse_fragment_nodes, replace_node, set_node_attr, text_content,
};
use crate::parsers::html::serializer::{serialize_node, serialize_node_without_namespace};
use crate::translation::config::constants::{DECORATION_TAGS, REPEAT_LIMIT, RESERVED_TAGS};
use crate::translation::error::{helpers, TranslationResult};
use crate::utils::{condense_repeats, escape_markup, trim};

/// 书页中的一个内容节点
#[derive(Debug, Clone)]
pub struct PageElement {
    base: ElementBase,
    node: Handle,
    /// 最近一次 `get_content` 中被占位符替换的行内节点，按编号排列
    reserved: Vec<Handle>,
    translation: Option<Handle>,
}

impl PageElement {
    pub fn new(node: Handle, page_id: Option<String>) -> Self {
        Self {
            base: ElementBase::new(page_id),
            node,
            reserved: Vec::new(),
            translation: None,
        }
    }

    pub fn node(&self) -> &Handle {
        &self.node
    }

    fn polish_translation(translation: &str) -> String {
        condense_repeats(&translation.replace('\n', "<br />"), REPEAT_LIMIT)
    }

    /// 用同名元素承载译文，继承原节点属性
    fn build_translation_node(
        &self,
        markup: &str,
        position: Position,
        style: &ReinsertStyle,
    ) -> TranslationResult<Handle> {
        let name = get_node_qualname(&self.node)
            .ok_or_else(|| helpers::tree_error("书页单元不是元素节点"))?;

        // 限定名原样保留，XHTML 中的 `epub:type` 等属性写回后仍然良构
        let mut attrs = get_node_attributes(&self.node);
        if position != Position::Only {
            attrs.retain(|attr| &*attr.name.local != "id");
        }
        for attr in attrs.iter_mut().filter(|attr| &*attr.name.local == "dir") {
            attr.value = "auto".into();
        }

        let new_node = create_element_with_attrs(name.clone(), attrs);
        for child in parse_fragment_nodes(&name, &trim(markup)) {
            append_child(&new_node, child);
        }
        if let Some(lang) = &style.translation_lang {
            set_node_attr(&new_node, "lang", Some(lang.clone()));
        }
        if let Some(color) = &style.translation_color {
            set_node_attr(&new_node, "style", Some(format!("color:{}", color)));
        }

        Ok(new_node)
    }
}

impl Element for PageElement {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn get_name(&self) -> Option<String> {
        get_node_name(&self.node).map(str::to_string)
    }

    fn get_attributes(&self) -> Option<BTreeMap<String, String>> {
        let attributes: BTreeMap<String, String> = get_node_attrs(&self.node).into_iter().collect();
        (!attributes.is_empty()).then_some(attributes)
    }

    fn get_raw(&self) -> String {
        serialize_node_without_namespace(&self.node)
    }

    fn get_text(&self) -> String {
        trim(&text_content(&self.node))
    }

    fn get_content(&mut self) -> String {
        let copy = deep_clone(&self.node);
        for decoration in find_descendants(&copy, DECORATION_TAGS) {
            detach(&decoration);
        }

        let placeholder = self.base.placeholder.clone().unwrap_or_default();
        self.reserved = find_descendants(&copy, RESERVED_TAGS);
        for (index, reserve) in self.reserved.iter().enumerate() {
            if let Err(e) = replace_node(reserve, create_text_node(&placeholder.encode(index))) {
                tracing::debug!("行内节点替换失败: {}", e);
            }
        }

        trim(&text_content(&copy))
    }

    fn add_translation(
        &mut self,
        translation: Option<&str>,
        position: Position,
        style: &ReinsertStyle,
    ) -> TranslationResult<()> {
        if let Some(color) = &style.original_color {
            set_node_attr(&self.node, "style", Some(format!("color:{}", color)));
        }

        let Some(translation) = translation else {
            if position.is_side_by_side() {
                let table = create_table(position, deep_clone(&self.node), None, self.base.column_gap);
                insert_after(&self.node, table)?;
                detach(&self.node);
            }
            return Ok(());
        };

        let placeholder = self.base.placeholder.clone().unwrap_or_default();
        let replacements: Vec<String> = self.reserved.iter().map(serialize_node).collect();
        let restored = placeholder.restore(&escape_markup(translation), &replacements)?;
        let markup = Self::polish_translation(&restored);

        let new_node = self.build_translation_node(&markup, position, style)?;
        self.translation = Some(new_node.clone());

        clear_tail(&self.node);

        match position {
            Position::Left | Position::Right => {
                let table = create_table(
                    position,
                    deep_clone(&self.node),
                    Some(new_node),
                    self.base.column_gap,
                );
                insert_after(&self.node, table)?;
            }
            Position::Above => insert_before(&self.node, new_node)?,
            Position::Below | Position::Only => insert_after(&self.node, new_node)?,
        }

        if matches!(position, Position::Left | Position::Right | Position::Only) {
            detach(&self.node);
        }

        Ok(())
    }

    fn get_translation(&self) -> Option<String> {
        self.translation.as_ref().map(serialize_node_without_namespace)
    }
}
