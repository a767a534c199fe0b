//! CSS 选择器
//!
//! 忽略规则由 `selectors` 解析和匹配，这里只为 rcdom 节点实现 [`selectors::Element`]。
//! 书页只是静态文档，动态伪类（`:hover` 等）和伪元素一律视为无效规则。

use std::fmt;

use cssparser::{ParserInput, ToCss};
use html5ever::{namespace_url, ns, LocalName, Namespace};
use markup5ever_rcdom::{Handle, NodeData};
use precomputed_hash::PrecomputedHash;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::matching::{
    self, ElementSelectorFlags, IgnoreNthChildForInvalidation, MatchingContext, MatchingMode,
    NeedsSelectorFlags, QuirksMode,
};
use selectors::parser::{self, ParseRelative, SelectorList, SelectorParseErrorKind};
use selectors::{NthIndexCache, OpaqueElement};

use super::dom::{get_node_attr, get_parent_node};
use crate::translation::error::{TranslationError, TranslationResult};

/// 解析后的选择器列表
#[derive(Clone)]
pub struct Selector {
    source: String,
    selectors: Vec<parser::Selector<RuleImpl>>,
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.source).finish()
    }
}

impl Selector {
    /// 解析选择器，语法无效时返回 `PatternError`
    pub fn parse(source: &str) -> TranslationResult<Self> {
        let mut input = ParserInput::new(source);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = SelectorList::parse(&RuleParser, &mut parser, ParseRelative::No).map_err(|e| {
            TranslationError::PatternError(format!("选择器 '{}' 无效: {:?}", source, e.kind))
        })?;

        Ok(Self {
            source: source.to_string(),
            selectors: list.0.into_vec(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// 判断元素是否为选择器的主体
    pub fn matches(&self, node: &Handle) -> bool {
        if !matches!(node.data, NodeData::Element { .. }) {
            return false;
        }

        let element = NodeRef(node.clone());
        let mut nth_index_cache = NthIndexCache::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut nth_index_cache,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            IgnoreNthChildForInvalidation::No,
        );

        self.selectors
            .iter()
            .any(|selector| matching::matches_selector(selector, 0, None, &element, &mut context))
    }
}

// =============================================================================
// 选择器实现
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleImpl;

impl parser::SelectorImpl for RuleImpl {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssString;
    type Identifier = CssLocalName;
    type LocalName = CssLocalName;
    type NamespacePrefix = CssLocalName;
    type NamespaceUrl = Namespace;
    type BorrowedNamespaceUrl = Namespace;
    type BorrowedLocalName = CssLocalName;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

struct RuleParser;

impl<'i> parser::Parser<'i> for RuleParser {
    type Impl = RuleImpl;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_is_and_where(&self) -> bool {
        true
    }
}

/// 属性选择器中的值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssString(String);

impl<'a> From<&'a str> for CssString {
    fn from(value: &'a str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for CssString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssString {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        cssparser::serialize_string(&self.0, dest)
    }
}

/// 标签名、类名和 id
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CssLocalName(LocalName);

impl<'a> From<&'a str> for CssLocalName {
    fn from(value: &'a str) -> Self {
        Self(LocalName::from(value))
    }
}

impl ToCss for CssLocalName {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

impl PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NonTSPseudoClass {}

impl parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = RuleImpl;

    fn is_active_or_hover(&self) -> bool {
        false
    }

    fn is_user_action_state(&self) -> bool {
        false
    }
}

impl ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoElement {}

impl parser::PseudoElement for PseudoElement {
    type Impl = RuleImpl;
}

impl ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

// =============================================================================
// 元素适配
// =============================================================================

#[derive(Clone)]
struct NodeRef(Handle);

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.data {
            NodeData::Element { name, .. } => write!(f, "<{}>", &*name.local),
            _ => f.write_str("#node"),
        }
    }
}

impl NodeRef {
    fn element_name(&self) -> Option<&html5ever::QualName> {
        match &self.0.data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    fn siblings(&self) -> Option<(Vec<Handle>, usize)> {
        let parent = get_parent_node(&self.0)?;
        let children: Vec<Handle> = parent.children.borrow().iter().cloned().collect();
        let index = children
            .iter()
            .position(|child| std::rc::Rc::ptr_eq(child, &self.0))?;
        Some((children, index))
    }
}

fn is_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { .. })
}

impl selectors::Element for NodeRef {
    type Impl = RuleImpl;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(&*self.0)
    }

    fn parent_element(&self) -> Option<Self> {
        get_parent_node(&self.0).filter(is_element).map(NodeRef)
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let (children, index) = self.siblings()?;
        children[..index].iter().rev().find(|n| is_element(n)).cloned().map(NodeRef)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let (children, index) = self.siblings()?;
        children[index + 1..].iter().find(|n| is_element(n)).cloned().map(NodeRef)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.0
            .children
            .borrow()
            .iter()
            .find(|n| is_element(n))
            .cloned()
            .map(NodeRef)
    }

    fn is_html_element_in_html_document(&self) -> bool {
        self.element_name().is_some_and(|name| name.ns == ns!(html))
    }

    fn has_local_name(&self, local_name: &CssLocalName) -> bool {
        self.element_name().is_some_and(|name| name.local == local_name.0)
    }

    fn has_namespace(&self, ns: &Namespace) -> bool {
        self.element_name().is_some_and(|name| name.ns == *ns)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        match (self.element_name(), other.element_name()) {
            (Some(a), Some(b)) => a.local == b.local && a.ns == b.ns,
            _ => false,
        }
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&Namespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        let NodeData::Element { attrs, .. } = &self.0.data else {
            return false;
        };
        attrs.borrow().iter().any(|attr| {
            !matches!(*ns, NamespaceConstraint::Specific(url) if *url != attr.name.ns)
                && attr.name.local == local_name.0
                && operation.eval_str(&attr.value)
        })
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, RuleImpl>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, RuleImpl>,
    ) -> bool {
        match *pe {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        false
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        get_node_attr(&self.0, "id")
            .is_some_and(|value| case_sensitivity.eq(id.0.as_bytes(), value.as_bytes()))
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        get_node_attr(&self.0, "class").is_some_and(|value| {
            value
                .split_ascii_whitespace()
                .any(|class| case_sensitivity.eq(name.0.as_bytes(), class.as_bytes()))
        })
    }

    fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        !self.0.children.borrow().iter().any(|child| match &child.data {
            NodeData::Element { .. } => true,
            NodeData::Text { contents } => !contents.borrow().is_empty(),
            _ => false,
        })
    }

    fn is_root(&self) -> bool {
        get_parent_node(&self.0).is_some_and(|parent| matches!(parent.data, NodeData::Document))
    }
}
