//! 字幕文档解析
//!
//! 字幕由空行分隔的块组成，每块依次是序号、时间轴和若干行文本。
//! 解析后的字幕条目以共享句柄保存，译文写回后可直接重新渲染。

use std::cell::RefCell;
use std::rc::Rc;

use crate::translation::error::{helpers, TranslationResult};

/// 单条字幕
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCue {
    pub index: String,
    pub timing: String,
    pub text: String,
}

impl SubtitleCue {
    /// 以原格式输出整条字幕
    pub fn render(&self) -> String {
        format!("{}\n{}\n{}", self.index, self.timing, self.text)
    }
}

pub type CueHandle = Rc<RefCell<SubtitleCue>>;

/// 字幕文档
#[derive(Debug, Clone, Default)]
pub struct SubtitleDocument {
    cues: Vec<CueHandle>,
}

impl SubtitleDocument {
    /// 解析字幕文本
    ///
    /// 少于两行（缺少时间轴）的块视为格式错误。
    pub fn parse(content: &str) -> TranslationResult<Self> {
        let normalized = content.replace("\r\n", "\n");
        let mut cues = Vec::new();

        for (number, block) in split_blocks(&normalized).into_iter().enumerate() {
            let mut lines = block.into_iter();
            let (Some(index), Some(timing)) = (lines.next(), lines.next()) else {
                return Err(helpers::parse_error(format!(
                    "第 {} 个字幕块缺少序号或时间轴",
                    number + 1
                )));
            };
            let text = lines.collect::<Vec<_>>().join("\n");

            cues.push(Rc::new(RefCell::new(SubtitleCue {
                index: index.trim().to_string(),
                timing: timing.trim().to_string(),
                text,
            })));
        }

        tracing::debug!("解析字幕 {} 条", cues.len());
        Ok(Self { cues })
    }

    pub fn cues(&self) -> &[CueHandle] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// 重新组合为字幕文本
    pub fn render(&self) -> String {
        if self.cues.is_empty() {
            return String::new();
        }
        let blocks: Vec<String> = self.cues.iter().map(|cue| cue.borrow().render()).collect();
        blocks.join("\n\n") + "\n"
    }
}

fn split_blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\r\n00:00:01,000 --> 00:00:02,000\r\nHello there.\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,500\r\nTwo\r\nlines\r\n\r\n";

    #[test]
    fn test_parse_blocks() {
        let document = SubtitleDocument::parse(SAMPLE).unwrap();
        assert_eq!(document.len(), 2);

        let second = document.cues()[1].borrow();
        assert_eq!(second.index, "2");
        assert_eq!(second.timing, "00:00:03,000 --> 00:00:04,500");
        assert_eq!(second.text, "Two\nlines");
    }

    #[test]
    fn test_render_round_trip() {
        let document = SubtitleDocument::parse(SAMPLE).unwrap();
        assert_eq!(
            document.render(),
            "1\n00:00:01,000 --> 00:00:02,000\nHello there.\n\n2\n00:00:03,000 --> 00:00:04,500\nTwo\nlines\n"
        );
    }

    #[test]
    fn test_block_without_timing_is_error() {
        let result = SubtitleDocument::parse("1\n00:00:01,000 --> 00:00:02,000\nok\n\n2\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_input() {
        let document = SubtitleDocument::parse("\n\n").unwrap();
        assert!(document.is_empty());
        assert_eq!(document.render(), "");
    }
}
