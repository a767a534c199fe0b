//! # Interleaf Library
//!
//! 从书页、字幕和棋谱注释中提取可翻译单元，再把译文按指定位置织回原文档，
//! 生成双语或纯译文版本。
//!
//! ## 模块组织
//!
//! - `core` - 文档级入口：格式识别、提取与写回
//! - `parsers` - 源文档解析器（HTML、字幕、棋谱注释）
//! - `translation` - 元素、处理器、配置与错误处理
//! - `utils` - 工具函数和实用程序

pub mod core;
pub mod parsers;
pub mod translation;
pub mod utils;

// Re-export commonly used items for convenience
pub use crate::core::*;
pub use parsers::*;
pub use utils::*;
