//! 翻译管道模块
//!
//! 提供书页单元的提取、过滤和占位符编解码

pub mod extraction;
pub mod filters;
pub mod placeholder;

// 重新导出主要类型
pub use extraction::{Extraction, ExtractionStats};
pub use filters::{compile_rule, ContentFilter};
pub use placeholder::Placeholder;
