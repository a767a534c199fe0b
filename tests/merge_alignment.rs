//! 合并模式集成测试
//!
//! 覆盖批次划分、拼接不变量以及译文段数不一致时的对齐

use interleaf::translation::{
    MergeElementHandler, Paragraph, Placeholder, Position, TranslationConfig,
};

mod common {
    include!("common/mod.rs");
}

use common::{AssertionHelper, HtmlTestHelper, TranslationHelper};

fn merge_config(merge_length: usize, position: Position) -> TranslationConfig {
    TranslationConfig {
        merge_enabled: true,
        merge_length,
        translation_position: position,
        ..Default::default()
    }
}

#[test]
fn test_short_paragraphs_share_one_batch() {
    let pages = vec![HtmlTestHelper::create_page(
        "p1",
        "p1.html",
        "<p>Hello world.</p><p>This is a test.</p>",
    )];
    let (handler, records) = TranslationHelper::prepare(&pages, &merge_config(50, Position::Below));

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].original, "Hello world.\n\nThis is a test.\n\n");
    assert_eq!(handler.merge_length(), 50);
    assert_eq!(handler.pending(), 2);
}

#[test]
fn test_raw_concatenation_invariant() {
    let chapter = HtmlTestHelper::create_complex_chapter();

    let single_pages = vec![HtmlTestHelper::create_page("c2", "ch2.html", &chapter)];
    let (_single, units) = TranslationHelper::prepare(&single_pages, &TranslationConfig::default());
    let active: Vec<&str> = units
        .iter()
        .filter(|unit| !unit.ignored)
        .map(|unit| unit.raw.as_str())
        .collect();

    for merge_length in [1, 40, 80, 5000] {
        let pages = vec![HtmlTestHelper::create_page("c2", "ch2.html", &chapter)];
        let (_merge, batches) =
            TranslationHelper::prepare(&pages, &merge_config(merge_length, Position::Below));
        let raws: Vec<&str> = batches.iter().map(|batch| batch.raw.as_str()).collect();

        assert_eq!(raws.join("\n\n"), active.join("\n\n"), "merge length {}", merge_length);
        assert!(batches.iter().all(|batch| !batch.ignored));
    }
}

#[test]
fn test_every_unit_gets_own_batch_when_length_is_small() {
    let pages = vec![HtmlTestHelper::create_page(
        "c2",
        "ch2.html",
        &HtmlTestHelper::create_simple_chapter(),
    )];
    let (_handler, records) = TranslationHelper::prepare(&pages, &merge_config(1, Position::Below));
    assert_eq!(records.len(), 3);
    let ids: Vec<usize> = records.iter().map(|record| record.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn test_merged_translation_realigned() {
    let pages = vec![HtmlTestHelper::create_page(
        "c2",
        "ch2.html",
        &HtmlTestHelper::create_simple_chapter(),
    )];
    let (mut handler, records) =
        TranslationHelper::prepare(&pages, &merge_config(2000, Position::Below));
    assert_eq!(records.len(), 1);

    let paragraphs = TranslationHelper::translate_with(&records, TranslationHelper::bracket);
    assert_eq!(handler.add_translations(&paragraphs).unwrap(), 3);
    assert_eq!(handler.pending(), 0);

    AssertionHelper::assert_in_order(
        &HtmlTestHelper::page_markup(&pages[0]),
        &[
            "<h1>Chapter One</h1>",
            "<h1>[Chapter One]</h1>",
            "<p>[It was a bright cold day in April.]</p>",
            "<p>[The clocks were striking thirteen.]</p>",
        ],
    );
}

#[test]
fn test_fewer_segments_fold_into_last_unit() {
    let pages = vec![HtmlTestHelper::create_page(
        "c2",
        "ch2.html",
        &HtmlTestHelper::create_simple_chapter(),
    )];
    let (mut handler, records) =
        TranslationHelper::prepare(&pages, &merge_config(2000, Position::Below));

    let paragraphs = vec![Paragraph::from(&records[0]).with_translation("第一章\n\n全部译文")];
    assert_eq!(handler.add_translations(&paragraphs).unwrap(), 1);
    assert_eq!(handler.pending(), 2);

    let markup = HtmlTestHelper::page_markup(&pages[0]);
    AssertionHelper::assert_in_order(
        &markup,
        &[
            "<p>The clocks were striking <em>thirteen</em>.</p>",
            "<p>第一章<br><br>全部译文</p>",
        ],
    );
    AssertionHelper::assert_count(&markup, "<h1>", 1);
}

#[test]
fn test_alignment_always_covers_every_segment() {
    let original = "A\n\nB\n\nC\n\nD\n\n";
    let translations = [
        None,
        Some("一"),
        Some("一\n\n二"),
        Some("一\n\n二\n\n三\n\n四"),
        Some("一\n\n二\n\n三\n\n四\n\n五\n\n六"),
    ];

    for position in [Position::Above, Position::Below, Position::Left, Position::Right, Position::Only] {
        let handler = MergeElementHandler::new(Placeholder::default(), "\n\n", position, 100);
        for translation in translations {
            let paragraph = Paragraph::new(original, translation.map(str::to_string));
            let pairs = handler.align_paragraph(&paragraph).unwrap();

            let segments: Vec<&str> = pairs.iter().map(|(segment, _)| segment.as_str()).collect();
            assert_eq!(segments, vec!["A", "B", "C", "D"], "{:?} {:?}", position, translation);
        }
    }
}

#[test]
fn test_surplus_segments_fold_into_last() {
    let handler = MergeElementHandler::new(Placeholder::default(), "\n\n", Position::Below, 100);
    let paragraph = Paragraph::new("A\n\nB\n\n", Some("一\n\n二\n\n三\n\n四".to_string()));
    let pairs = handler.align_paragraph(&paragraph).unwrap();

    assert_eq!(pairs[0].1.as_deref(), Some("一"));
    assert_eq!(pairs[1].1.as_deref(), Some("二\n\n三\n\n四"));
}
