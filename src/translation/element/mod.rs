//! 可翻译元素
//!
//! 每种源格式（书页节点、字幕、棋谱注释、元数据、目录）都实现同一个 `Element` 接口：
//! 取出原文、生成待翻译内容，并把译文按指定位置写回所属文档。
//!
//! # 架构设计
//!
//! - `Element` trait 定义统一接口，具体格式各自实现
//! - `ElementBase` 保存所有元素共有的状态（忽略标记、占位符、栏间距、所属页面）
//! - 元素持有文档中节点或记录的共享句柄，写回译文即直接修改文档
//!
//! # 使用示例
//!
//! ```rust,ignore
//! let mut element = PageElement::new(node, Some("ch1".into()));
//! element.set_placeholder(Placeholder::default());
//! let content = element.get_content();
//! element.add_translation(Some("译文"), Position::Below, &ReinsertStyle::default())?;
//! ```

pub mod layout;
pub mod page;
pub mod record;
pub mod text;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::placeholder::Placeholder;

pub use page::PageElement;
pub use record::{Metadata, MetadataElement, MetadataItem, TocElement, TocNode};
pub use text::{AnnotationElement, SubtitleElement};

/// 译文相对原文的位置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[serde(alias = "before")]
    Above,
    #[default]
    #[serde(alias = "after")]
    Below,
    Left,
    Right,
    /// 译文替换原文
    Only,
}

impl Position {
    /// 左右对照排版
    pub fn is_side_by_side(self) -> bool {
        matches!(self, Position::Left | Position::Right)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Position::Above => "above",
            Position::Below => "below",
            Position::Left => "left",
            Position::Right => "right",
            Position::Only => "only",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = TranslationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "above" | "before" => Ok(Position::Above),
            "below" | "after" => Ok(Position::Below),
            "left" => Ok(Position::Left),
            "right" => Ok(Position::Right),
            "only" => Ok(Position::Only),
            other => Err(TranslationError::InvalidInput(format!(
                "未知的译文位置: {}",
                other
            ))),
        }
    }
}

/// 左右排版时的栏间距
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnGap {
    /// 中间栏占整行的百分比
    Percentage(u32),
    /// 中间栏放置的不换行空格数
    Fixed(u32),
}

/// 写回译文时的样式选项
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReinsertStyle {
    pub translation_lang: Option<String>,
    pub original_color: Option<String>,
    pub translation_color: Option<String>,
}

/// 所有元素共有的状态
#[derive(Debug, Clone, Default)]
pub struct ElementBase {
    pub ignored: bool,
    pub placeholder: Option<Placeholder>,
    pub column_gap: Option<ColumnGap>,
    pub page_id: Option<String>,
}

impl ElementBase {
    pub fn new(page_id: Option<String>) -> Self {
        Self {
            page_id,
            ..Default::default()
        }
    }
}

/// 可翻译元素特征
///
/// 实现者只需提供 `base`/`base_mut` 以及取文本、写回译文的方法，
/// 状态相关的方法都有默认实现。
pub trait Element {
    fn base(&self) -> &ElementBase;

    fn base_mut(&mut self) -> &mut ElementBase;

    fn ignored(&self) -> bool {
        self.base().ignored
    }

    fn set_ignored(&mut self, ignored: bool) {
        self.base_mut().ignored = ignored;
    }

    fn set_placeholder(&mut self, placeholder: Placeholder) {
        self.base_mut().placeholder = Some(placeholder);
    }

    fn set_column_gap(&mut self, column_gap: ColumnGap) {
        self.base_mut().column_gap = Some(column_gap);
    }

    fn page_id(&self) -> Option<&str> {
        self.base().page_id.as_deref()
    }

    /// 元素名称（仅书页节点有）
    fn get_name(&self) -> Option<String> {
        None
    }

    /// 元素属性（仅书页节点有）
    fn get_attributes(&self) -> Option<BTreeMap<String, String>> {
        None
    }

    /// 原始标记
    fn get_raw(&self) -> String;

    /// 纯文本
    fn get_text(&self) -> String;

    /// 待翻译内容
    ///
    /// 书页节点会在这里记录被占位符替换的行内节点，写回译文前必须先调用。
    fn get_content(&mut self) -> String;

    /// 把译文写回所属文档
    ///
    /// # 参数
    ///
    /// * `translation` - 译文；`None` 表示没有译文，只应用原文样式（左右排版时仍生成表格）
    /// * `position` - 译文位置
    /// * `style` - 语言与颜色
    fn add_translation(
        &mut self,
        translation: Option<&str>,
        position: Position,
        style: &ReinsertStyle,
    ) -> TranslationResult<()>;

    /// 写回后用于展示的文本
    fn get_translation(&self) -> Option<String> {
        None
    }
}
