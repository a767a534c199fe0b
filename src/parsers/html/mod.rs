//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作
//! - `page`: 书页及其编码
//! - `selector`: 忽略规则使用的 CSS 选择器
//! - `serializer`: 序列化功能
//! - `xml`: XHTML 页面的 XML 解析与写回

pub mod dom;
pub mod page;
pub mod selector;
pub mod serializer;
pub mod xml;

pub use dom::{
    find_descendants, find_nodes, get_node_attr, get_node_name, get_parent_node, html_to_dom,
    set_node_attr,
};
pub use page::{Page, Syntax};
pub use selector::Selector;
pub use serializer::{serialize_document, serialize_node};
pub use xml::{serialize_xml, xml_to_dom};
