//! # 工具模块
//!
//! 这个模块包含各种工具函数和实用程序：
//!
//! - 文本整理、自然排序和标记转义
//! - 内容指纹与缓存标识
//!
//! # 模块组织
//!
//! - `text` - 文本处理工具函数
//! - `fingerprint` - 基于 blake3 的指纹计算

pub mod fingerprint;
pub mod text;

// Re-export commonly used items for convenience
pub use fingerprint::{cache_id, uid};
pub use text::{condense_repeats, escape_markup, natural_sort_key, trim, SortKeyPart};
