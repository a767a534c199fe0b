//! 逐条处理器：一个元素对应一条原文记录

use super::{ElementHandler, HandlerState, OriginalRecord, Paragraph, TranslationMap};
use crate::translation::element::{Element, Position};
use crate::translation::error::TranslationResult;
use crate::translation::pipeline::placeholder::Placeholder;
use crate::utils::uid;

pub struct SingleElementHandler {
    state: HandlerState,
}

impl SingleElementHandler {
    pub fn new(placeholder: Placeholder, separator: &str, position: Position) -> Self {
        Self {
            state: HandlerState::new(placeholder, separator, position),
        }
    }
}

impl ElementHandler for SingleElementHandler {
    fn state(&self) -> &HandlerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HandlerState {
        &mut self.state
    }

    fn prepare_original(&mut self, elements: Vec<Box<dyn Element>>) -> &[OriginalRecord] {
        let start = self.state.originals.len();

        for (offset, mut element) in elements.into_iter().enumerate() {
            let index = start + offset;
            self.state.prepare_element(element.as_mut());

            let content = element.get_content();
            let record = OriginalRecord {
                id: index,
                fingerprint: uid([index.to_string().as_str(), content.as_str()]),
                raw: element.get_raw(),
                original: content,
                ignored: element.ignored(),
                attributes: element.get_attributes(),
                page: element.page_id().map(str::to_string),
            };
            self.state.originals.push(record);

            if !element.ignored() {
                self.state.register(element);
            }
        }

        tracing::debug!("生成原文记录 {} 条", self.state.originals.len() - start);
        &self.state.originals[start..]
    }

    fn prepare_translation(&self, paragraphs: &[Paragraph]) -> TranslationResult<TranslationMap> {
        Ok(paragraphs
            .iter()
            .map(|paragraph| (paragraph.original.clone(), paragraph.translation.clone()))
            .collect())
    }
}
