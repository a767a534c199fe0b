// 集成测试公共模块
//
// 提供测试文档、译文生成和断言辅助

use interleaf::parsers::html::dom::{find_nodes, text_content};
use interleaf::parsers::Page;
use interleaf::translation::{
    get_element_handler, get_page_elements, ElementHandler, OriginalRecord, Paragraph,
    Placeholder, TranslationConfig,
};

/// 测试文档生成
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    /// 解析为书页
    pub fn create_page(id: &str, href: &str, html: &str) -> Page {
        Page::from_markup(id, href, html.as_bytes(), None).expect("failed to parse page")
    }

    pub fn create_simple_chapter() -> String {
        r#"<!DOCTYPE html>
<html>
<head><title>Chapter One</title></head>
<body>
    <h1>Chapter One</h1>
    <p>It was a bright cold day in April.</p>
    <p>The clocks were striking <em>thirteen</em>.</p>
</body>
</html>"#
            .to_string()
    }

    pub fn create_complex_chapter() -> String {
        r#"<!DOCTYPE html>
<html>
<head><title>Chapter Two</title></head>
<body>
    <section>
        <h2 id="c2">Chapter Two</h2>
        <div class="figure"><img src="map.png" alt="map"> The map of the island.</div>
        <p>Run <code>cargo build</code> first,<br>then wait.</p>
        <pre>fn main() {}</pre>
        <p class="note">A note for editors.</p>
        <p>* * *</p>
        <blockquote><p>Quoted words.</p></blockquote>
        <div><span>Loose</span> tail text.</div>
    </section>
</body>
</html>"#
            .to_string()
    }

    /// 带 XML 声明、命名空间前缀和空元素的 XHTML 书页
    pub fn create_xhtml_chapter() -> String {
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" xml:lang="en">
<head><title>Chapter Three</title><link rel="stylesheet" href="../styles/main.css"/></head>
<body>
<section epub:type="chapter" id="c3">
<div id="page-12"/>
<h2>Chapter Three</h2>
<p epub:type="bridgehead">The tide came in.<br/>Slowly.</p>
<p>Nobody &amp; nothing moved.</p>
</section>
</body>
</html>"#
            .to_string()
    }

    /// 两个书页，文件名顺序与自然顺序不同
    pub fn create_book() -> Vec<Page> {
        vec![
            Self::create_page("c10", "text/ch10.html", "<p>Chapter ten text.</p>"),
            Self::create_page("c2", "text/ch2.html", &Self::create_simple_chapter()),
            Page::resource("css", "styles/main.css"),
        ]
    }

    /// `body` 的文本内容
    pub fn body_text(page: &Page) -> String {
        let tree = page.tree.as_ref().expect("page has no tree");
        let body = find_nodes(tree, vec!["html", "body"]).remove(0);
        text_content(&body)
    }

    /// 序列化后的整页标记
    pub fn page_markup(page: &Page) -> String {
        String::from_utf8(page.serialize().expect("page has no tree")).expect("invalid utf-8")
    }
}

/// 字幕与棋谱测试数据
pub struct TestDataGenerator;

impl TestDataGenerator {
    pub fn create_subtitles() -> String {
        "1\n00:00:01,000 --> 00:00:03,000\nGood morning.\n\n\
         2\n00:00:04,000 --> 00:00:06,000\nHow are you\ntoday?\n\n\
         3\n00:00:07,000 --> 00:00:08,000\nFine.\n"
            .to_string()
    }

    pub fn create_game() -> String {
        "[Event \"Casual\"]\n\n1. e4 {King's pawn} e5 2. Nf3 {Develops the knight} Nc6 {1:23} 1-0\n"
            .to_string()
    }
}

/// 译文生成
pub struct TranslationHelper;

impl TranslationHelper {
    /// 提取书页并生成原文记录
    pub fn prepare(
        pages: &[Page],
        config: &TranslationConfig,
    ) -> (Box<dyn ElementHandler>, Vec<OriginalRecord>) {
        let mut handler = get_element_handler(config, Placeholder::default(), "\n\n");
        let elements = get_page_elements(pages, config).expect("extraction failed");
        let records = handler.prepare_original(elements).to_vec();
        (handler, records)
    }

    /// 用给定函数为每条未忽略的记录生成译文
    pub fn translate_with<F>(records: &[OriginalRecord], translate: F) -> Vec<Paragraph>
    where
        F: Fn(&str) -> String,
    {
        records
            .iter()
            .filter(|record| !record.ignored)
            .map(|record| Paragraph::from(record).with_translation(translate(&record.original)))
            .collect()
    }

    /// 每段加上方括号，合并批次按分隔符逐段处理
    pub fn bracket(text: &str) -> String {
        text.trim()
            .split("\n\n")
            .map(|segment| format!("[{}]", segment))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// 断言辅助工具
pub struct AssertionHelper;

impl AssertionHelper {
    /// 断言文本按顺序出现
    pub fn assert_in_order(haystack: &str, needles: &[&str]) {
        let mut position = 0;
        for needle in needles {
            match haystack[position..].find(needle) {
                Some(found) => position += found + needle.len(),
                None => panic!("{:?} not found in order within {:?}", needle, haystack),
            }
        }
    }

    /// 断言文本出现的次数
    pub fn assert_count(haystack: &str, needle: &str, expected: usize) {
        let actual = haystack.matches(needle).count();
        assert_eq!(
            actual, expected,
            "expected {:?} {} times in {:?}",
            needle, expected, haystack
        );
    }
}
