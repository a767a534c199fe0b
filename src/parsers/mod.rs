//! # 解析器模块
//!
//! 这个模块包含所有源文档格式的解析功能：
//!
//! - HTML/XHTML 书页解析和DOM操作
//! - 字幕文本
//! - 棋谱注释
//!
//! # 模块组织
//!
//! - `html` - 书页解析、DOM操作、选择器与序列化
//! - `subtitle` - 字幕块解析与渲染
//! - `annotation` - 棋谱注释提取与渲染

pub mod annotation;
pub mod html;
pub mod subtitle;

// Re-export commonly used items for convenience
pub use annotation::{AnnotationComment, AnnotationDocument};
pub use html::{html_to_dom, serialize_document, xml_to_dom, Page, Selector, Syntax};
pub use subtitle::{SubtitleCue, SubtitleDocument};
