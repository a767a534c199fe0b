//! 纯文本元素：字幕与棋谱注释

use super::{Element, ElementBase, Position, ReinsertStyle};
use crate::parsers::annotation::CommentHandle;
use crate::parsers::subtitle::CueHandle;
use crate::translation::error::TranslationResult;

/// 一条字幕
#[derive(Debug, Clone)]
pub struct SubtitleElement {
    base: ElementBase,
    cue: CueHandle,
}

impl SubtitleElement {
    pub fn new(cue: CueHandle) -> Self {
        Self {
            base: ElementBase::default(),
            cue,
        }
    }
}

impl Element for SubtitleElement {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn get_raw(&self) -> String {
        self.cue.borrow().text.clone()
    }

    fn get_text(&self) -> String {
        self.get_raw()
    }

    fn get_content(&mut self) -> String {
        self.get_text()
    }

    fn add_translation(
        &mut self,
        translation: Option<&str>,
        position: Position,
        _style: &ReinsertStyle,
    ) -> TranslationResult<()> {
        let Some(translation) = translation else {
            return Ok(());
        };

        let mut cue = self.cue.borrow_mut();
        cue.text = match position {
            Position::Only => translation.to_string(),
            Position::Below | Position::Right => format!("{}\n{}", cue.text, translation),
            Position::Above | Position::Left => format!("{}\n{}", translation, cue.text),
        };
        Ok(())
    }

    fn get_translation(&self) -> Option<String> {
        Some(self.cue.borrow().render())
    }
}

/// 一条棋谱注释
#[derive(Debug, Clone)]
pub struct AnnotationElement {
    base: ElementBase,
    comment: CommentHandle,
}

impl AnnotationElement {
    pub fn new(comment: CommentHandle) -> Self {
        Self {
            base: ElementBase::default(),
            comment,
        }
    }
}

impl Element for AnnotationElement {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn get_raw(&self) -> String {
        self.comment.borrow().raw.clone()
    }

    /// 去掉两侧花括号
    fn get_text(&self) -> String {
        self.get_raw()
            .trim_matches(|c| c == '{' || c == '}')
            .to_string()
    }

    fn get_content(&mut self) -> String {
        self.get_text()
    }

    fn add_translation(
        &mut self,
        translation: Option<&str>,
        position: Position,
        _style: &ReinsertStyle,
    ) -> TranslationResult<()> {
        let Some(translation) = translation else {
            return Ok(());
        };

        let content = self.get_text();
        let mut comment = self.comment.borrow_mut();
        comment.translation = Some(match position {
            Position::Only => translation.to_string(),
            Position::Below | Position::Right => format!("{} | {}", content, translation),
            Position::Above | Position::Left => format!("{} | {}", translation, content),
        });
        Ok(())
    }

    fn get_translation(&self) -> Option<String> {
        Some(self.comment.borrow().render())
    }
}
