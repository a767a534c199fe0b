//! XHTML 书页集成测试
//!
//! XHTML 按 XML 解析和写回：空元素不吞兄弟节点，写回的文档仍然良构

use interleaf::core::{apply_translations, extract_records, DocumentFormat, InterleafOptions};
use interleaf::parsers::html::dom::{element_children, find_nodes, get_node_name};
use interleaf::parsers::{xml_to_dom, Syntax};
use interleaf::translation::{ErrorCategory, Paragraph, TranslationError};

mod common {
    include!("common/mod.rs");
}

use common::{AssertionHelper, HtmlTestHelper, TranslationHelper};

fn section_children(markup: &str) -> Vec<String> {
    let dom = xml_to_dom(markup.as_bytes(), "utf-8").expect("output is not well-formed");
    let section = find_nodes(&dom.document, vec!["html", "body", "section"]).remove(0);
    element_children(&section)
        .iter()
        .filter_map(|child| get_node_name(child).map(str::to_string))
        .collect()
}

#[test]
fn test_extract_keeps_empty_element_siblings() {
    let chapter = HtmlTestHelper::create_xhtml_chapter();
    let records = extract_records(
        DocumentFormat::Html,
        "ch3.xhtml",
        chapter.as_bytes(),
        &InterleafOptions::default(),
    )
    .unwrap();

    let originals: Vec<&str> = records.iter().map(|r| r.original.as_str()).collect();
    assert_eq!(originals.len(), 3);
    assert_eq!(originals[0], "Chapter Three");
    assert_eq!(originals[2], "Nobody & nothing moved.");
}

#[test]
fn test_extract_then_apply_stays_well_formed() {
    let chapter = HtmlTestHelper::create_xhtml_chapter();
    let options = InterleafOptions::default();
    let records =
        extract_records(DocumentFormat::Html, "ch3.xhtml", chapter.as_bytes(), &options).unwrap();
    let paragraphs: Vec<Paragraph> =
        TranslationHelper::translate_with(&records, TranslationHelper::bracket);

    let (output, applied) = apply_translations(
        DocumentFormat::Html,
        "ch3.xhtml",
        chapter.as_bytes(),
        &paragraphs,
        &options,
    )
    .unwrap();
    assert_eq!(applied, 3);
    let output = String::from_utf8(output).unwrap();

    assert!(output.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE html>\n"));
    assert!(output.contains("<html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"en\">"));
    assert!(output.contains("<link rel=\"stylesheet\" href=\"../styles/main.css\"/>"));
    assert!(output.contains("<div id=\"page-12\"></div>"));
    assert!(output.contains("Nobody &amp; nothing moved."));
    AssertionHelper::assert_count(&output, "<br/>", 2);
    AssertionHelper::assert_count(&output, "<br>", 0);
    AssertionHelper::assert_in_order(
        &output,
        &[
            "<h2>Chapter Three</h2>",
            "<h2>[Chapter Three]</h2>",
            "<p epub:type=\"bridgehead\">The tide",
            "<p epub:type=\"bridgehead\">[The tide",
            "<p>[Nobody &amp; nothing moved.]</p>",
        ],
    );

    assert_eq!(
        section_children(&output),
        vec!["div", "h2", "h2", "p", "p", "p", "p"]
    );
}

#[test]
fn test_page_keeps_xml_syntax() {
    let page = HtmlTestHelper::create_page(
        "c3",
        "text/ch3.xhtml",
        &HtmlTestHelper::create_xhtml_chapter(),
    );
    assert_eq!(page.syntax, Syntax::Xhtml);

    let markup = HtmlTestHelper::page_markup(&page);
    assert_eq!(section_children(&markup), vec!["div", "h2", "p", "p"]);
    assert!(markup.contains("The tide came in.<br/>Slowly."));
    assert!(!markup.contains("<!--?xml"));
}

#[test]
fn test_malformed_xhtml_is_a_parse_error() {
    let markup = "<?xml version=\"1.0\"?>\n\
        <html xmlns=\"http://www.w3.org/1999/xhtml\"><body><p>Unclosed</body></html>";

    let result = extract_records(
        DocumentFormat::Html,
        "ch3.xhtml",
        markup.as_bytes(),
        &InterleafOptions::default(),
    );
    match result {
        Err(error @ TranslationError::ParseError(_)) => {
            assert_eq!(error.category(), ErrorCategory::Parsing)
        }
        other => panic!("expected a parse error, got {:?}", other),
    }

    // HTML 页面容忍同样的标记
    let records = extract_records(
        DocumentFormat::Html,
        "ch3.html",
        markup.as_bytes(),
        &InterleafOptions::default(),
    )
    .unwrap();
    assert_eq!(records.len(), 1);
}
