//! 翻译模块
//!
//! 负责从源文档提取可翻译单元、生成原文记录，以及把译文写回文档：
//! - **config**: 配置管理
//! - **element**: 各源格式的可翻译元素
//! - **pipeline**: 提取、过滤与占位符
//! - **handler**: 逐条与合并两种处理器
//! - **sources**: 各类源文档的元素收集
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use interleaf::parsers::Page;
//! use interleaf::translation::{
//!     get_element_handler, get_page_elements, Paragraph, Placeholder, TranslationConfig,
//! };
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TranslationConfig::default();
//! let pages = vec![Page::from_markup("c1", "ch1.html", b"<p>Hello</p>", None)?];
//!
//! let mut handler = get_element_handler(&config, Placeholder::default(), "\n\n");
//! let records = handler.prepare_original(get_page_elements(&pages, &config)?).to_vec();
//!
//! let paragraphs: Vec<Paragraph> = records
//!     .iter()
//!     .map(|record| Paragraph::from(record).with_translation("你好"))
//!     .collect();
//! handler.add_translations(&paragraphs)?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 配置管理模块
pub mod config;

/// 可翻译元素
///
/// 书页节点、字幕、棋谱注释、元数据与目录各自的提取和写回方式
pub mod element;

/// 错误处理模块 - 统一的错误类型和处理机制
pub mod error;

/// 元素处理器 - 生成原文记录并写回译文
pub mod handler;

/// 处理管道 - 单元提取、内容过滤和占位符编解码
pub mod pipeline;

/// 源文档元素收集
pub mod sources;

// ============================================================================
// 公共接口导出
// ============================================================================

pub use config::{
    config_file_exists, constants, ColumnGapConfig, ConfigManager, FilterScope, GapType, RuleMode, TranslationConfig,
};

pub use element::{ColumnGap, Element, PageElement, Position, ReinsertStyle};

pub use error::{ErrorCategory, ErrorSeverity, TranslationError, TranslationResult};

pub use handler::{
    get_element_handler, ElementHandler, MergeElementHandler, OriginalRecord, Paragraph,
    SingleElementHandler,
};

pub use pipeline::{Extraction, ExtractionStats, Placeholder};

pub use sources::{
    get_annotation_elements, get_ebook_elements, get_metadata_elements, get_page_elements,
    get_subtitle_elements, get_toc_elements, EbookSource,
};
