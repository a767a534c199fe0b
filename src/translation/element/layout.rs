//! 左右对照排版
//!
//! 左右排版时用一行三列的表格承载原文和译文，中间列为栏间距。

use markup5ever_rcdom::Handle;

use super::{ColumnGap, Position};
use crate::parsers::html::dom::{append_child, create_html_element, create_text_node};

/// 三列宽度以及中间列的填充文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub left: String,
    pub middle: Option<String>,
    pub right: String,
    pub filler: Option<String>,
}

/// 根据栏间距计算列宽
///
/// 百分比间距两侧取 `(100 - g) / 2`，遇到 .5 时取偶数。
pub fn column_widths(column_gap: Option<ColumnGap>) -> ColumnLayout {
    match column_gap {
        None => ColumnLayout {
            left: "45%".to_string(),
            middle: Some("10%".to_string()),
            right: "45%".to_string(),
            filler: None,
        },
        Some(ColumnGap::Percentage(gap)) => {
            let side = format!("{}%", half_round_even(100u32.saturating_sub(gap)));
            ColumnLayout {
                left: side.clone(),
                middle: Some(format!("{}%", gap)),
                right: side,
                filler: None,
            }
        }
        Some(ColumnGap::Fixed(count)) => ColumnLayout {
            left: "50%".to_string(),
            middle: None,
            right: "50%".to_string(),
            filler: Some("\u{a0}".repeat(count as usize)),
        },
    }
}

fn half_round_even(value: u32) -> u32 {
    let half = value / 2;
    if value % 2 == 1 && half % 2 == 1 {
        half + 1
    } else {
        half
    }
}

/// 生成对照表格
///
/// `left` 位置译文在左列，`right` 位置原文在左列。
pub fn create_table(
    position: Position,
    original: Handle,
    translation: Option<Handle>,
    column_gap: Option<ColumnGap>,
) -> Handle {
    let layout = column_widths(column_gap);

    let table = create_html_element("table", &[("width", "100%")]);
    let tr = create_html_element("tr", &[]);
    let td_left = create_html_element(
        "td",
        &[("valign", "top"), ("width", layout.left.as_str())],
    );
    let td_middle = match &layout.middle {
        Some(width) => create_html_element("td", &[("width", width.as_str())]),
        None => create_html_element("td", &[]),
    };
    let td_right = create_html_element(
        "td",
        &[("valign", "top"), ("width", layout.right.as_str())],
    );

    if let Some(filler) = &layout.filler {
        append_child(&td_middle, create_text_node(filler));
    }

    match position {
        Position::Left => {
            if let Some(translation) = translation {
                append_child(&td_left, translation);
            }
            append_child(&td_right, original);
        }
        _ => {
            append_child(&td_left, original);
            if let Some(translation) = translation {
                append_child(&td_right, translation);
            }
        }
    }

    append_child(&tr, td_left);
    append_child(&tr, td_middle);
    append_child(&tr, td_right);
    append_child(&table, tr);
    table
}
