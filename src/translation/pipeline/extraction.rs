//! 书页单元提取
//!
//! 从每个书页的 `body` 开始深度优先遍历，找出"自身带有内容"的节点作为翻译单元，
//! 再用忽略选择器和内容过滤器决定单元是否参与翻译。

use markup5ever_rcdom::Handle;
use regex::Regex;

use super::filters::ContentFilter;
use crate::parsers::html::dom::{
    element_children, find_nodes, get_node_name, leading_text, tail_text,
};
use crate::parsers::html::{Page, Selector};
use crate::translation::config::constants;
use crate::translation::config::TranslationConfig;
use crate::translation::element::{Element, PageElement};
use crate::translation::error::TranslationResult;
use crate::utils::natural_sort_key;

/// 提取统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub pages_processed: usize,
    pub pages_skipped: usize,
    pub units_found: usize,
    pub units_dropped: usize,
    pub units_ignored: usize,
}

/// 书页单元提取器
#[derive(Debug, Clone)]
pub struct Extraction {
    filter: ContentFilter,
    element_rules: Vec<Selector>,
    markup_file: Regex,
    stats: ExtractionStats,
}

impl Extraction {
    pub fn new(config: &TranslationConfig) -> TranslationResult<Self> {
        let filter =
            ContentFilter::new(config.rule_mode, config.filter_scope, &config.filter_rules)?;

        let mut element_rules = Vec::new();
        let rules = constants::DEFAULT_ELEMENT_RULES
            .iter()
            .map(|rule| rule.to_string())
            .chain(config.element_rules.iter().cloned());
        for rule in rules {
            match Selector::parse(&rule) {
                Ok(selector) => element_rules.push(selector),
                Err(e) => tracing::warn!("跳过无效的元素规则: {}", e),
            }
        }

        Ok(Self {
            filter,
            element_rules,
            markup_file: Regex::new(constants::MARKUP_FILE_PATTERN)?,
            stats: ExtractionStats::default(),
        })
    }

    /// 有文档树的标记文件，按 href 自然排序
    pub fn get_sorted_pages<'a>(&self, pages: &'a [Page]) -> Vec<&'a Page> {
        let mut sorted: Vec<&Page> = pages
            .iter()
            .filter(|page| page.tree.is_some() && self.markup_file.is_match(&page.href))
            .collect();
        sorted.sort_by_cached_key(|page| natural_sort_key(&page.href));
        sorted
    }

    /// 提取并过滤所有书页的单元
    pub fn get_elements(&mut self, pages: &[Page]) -> Vec<PageElement> {
        self.stats = ExtractionStats::default();
        let mut elements = Vec::new();

        for page in self.get_sorted_pages(pages) {
            let Some(body) = page
                .tree
                .as_ref()
                .and_then(|tree| find_nodes(tree, vec!["html", "body"]).into_iter().next())
            else {
                tracing::warn!("页面 {} 没有 body，已跳过", page.href);
                self.stats.pages_skipped += 1;
                continue;
            };

            let page_elements = self.extract_page(&page.id, &body);
            tracing::debug!("页面 {} 提取到 {} 个单元", page.href, page_elements.len());
            self.stats.pages_processed += 1;
            elements.extend(page_elements);
        }

        self.stats.units_found = elements.len();
        let elements: Vec<PageElement> = elements
            .into_iter()
            .filter_map(|mut element| self.filter.apply(&mut element).then_some(element))
            .collect();
        self.stats.units_dropped = self.stats.units_found - elements.len();
        self.stats.units_ignored = elements.iter().filter(|e| e.ignored()).count();

        tracing::debug!("提取统计: {:?}", self.stats);
        elements
    }

    pub fn get_stats(&self) -> &ExtractionStats {
        &self.stats
    }

    fn need_ignore(&self, node: &Handle) -> bool {
        self.element_rules.iter().any(|rule| rule.matches(node))
    }

    fn new_element(&self, node: Handle, page_id: &str) -> PageElement {
        let ignored = self.need_ignore(&node);
        let mut element = PageElement::new(node, Some(page_id.to_string()));
        element.set_ignored(ignored);
        element
    }

    /// 单个页面的单元；整页找不到单元时 `body` 本身作为唯一单元
    fn extract_page(&self, page_id: &str, body: &Handle) -> Vec<PageElement> {
        let mut elements = Vec::new();
        self.extract_elements(page_id, body, &mut elements);
        if elements.is_empty() {
            elements.push(self.new_element(body.clone(), page_id));
        }
        elements
    }

    fn extract_elements(&self, page_id: &str, root: &Handle, elements: &mut Vec<PageElement>) {
        for node in element_children(root) {
            if has_own_content(&node) {
                elements.push(self.new_element(node, page_id));
            } else {
                self.extract_elements(page_id, &node, elements);
            }
        }
    }
}

/// 节点是否自身带有内容
fn has_own_content(node: &Handle) -> bool {
    if !leading_text(node).trim().is_empty() {
        return true;
    }

    let children = element_children(node);
    if children.is_empty() {
        return false;
    }

    let priority = get_node_name(node)
        .map(|name| constants::PRIORITY_TAGS.contains(&name))
        .unwrap_or(false);

    priority || children.iter().any(|child| !tail_text(child).trim().is_empty())
}
