//! Whole-document invariants checked over small hand-picked corpora.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use pagemark::parser::list_builder;
use pagemark::{
    convert, Block, ConvertOptions, Diagnostics, RasterObject, RenderOptions, Sanitizer,
    SourceDocument, SourcePage,
};
use std::collections::HashSet;
use std::io::Write;

const REPORT_PAGE: &str = "QUARTERLY OPERATIONS REPORT
Revenue grew 12 percent over 2023 levels

Region    Units    Share
North     120      40
South     180      60
West      75

1. Expand the warehouse in 2025
2. Hire 14 additional drivers
   starting in March
- Audit 3 depots
Closing note with 3 figures";

const MESSY_TEXTS: &[&str] = &[
    "Contact jane@corp.io or visit https://www.acmecorp.com/pricing today",
    "Acme Inc. and Globex Corporation signed with Initech.com in 2021",
    "See https://docs.microsoft.com/en-us for the SDK, or mail ops@example.org",
    "Plain sentence without anything to redact 42",
];

fn plain_options() -> ConvertOptions {
    ConvertOptions::new().with_render_options(RenderOptions::new().with_provenance(false))
}

#[test]
fn test_sanitize_is_idempotent() {
    let sanitizer = Sanitizer::default();
    for text in MESSY_TEXTS {
        let mut diags = Diagnostics::new();
        let once = sanitizer.sanitize(1, text, &mut diags);
        let redactions = diags.len();

        let twice = sanitizer.sanitize(1, &once, &mut diags);
        assert_eq!(once, twice, "second pass changed {:?}", text);
        assert_eq!(diags.len(), redactions);
    }
}

#[test]
fn test_tokens_survive_except_dropped_rows() {
    let conversion = convert(&SourceDocument::from_texts([REPORT_PAGE]), &plain_options());
    assert_eq!(conversion.report.dropped_table_rows(), 1);

    let dropped: HashSet<&str> = ["West", "75"].into_iter().collect();
    for token in REPORT_PAGE.split_whitespace() {
        if dropped.contains(token) || token == "-" {
            continue;
        }
        assert!(
            conversion.markdown.contains(token),
            "token {:?} missing from:\n{}",
            token,
            conversion.markdown
        );
    }
    assert!(!conversion.markdown.contains("West"));
}

#[test]
fn test_tables_are_rectangular() {
    let texts = [
        REPORT_PAGE,
        "Item    Qty    Cost\npen    2\nink    4    5\ncap    7    8    9",
        "Key\tValue\nalpha\t1\nbeta\t2\textra",
    ];
    let conversion = convert(&SourceDocument::from_texts(texts), &plain_options());

    let mut tables = 0;
    for page in &conversion.document.pages {
        for block in &page.elements {
            if let Block::Table(table) = block {
                tables += 1;
                let width = table.column_count();
                assert!(table.rows.iter().all(|row| row.cells.len() == width));
            }
        }
    }
    assert_eq!(tables, 3);
}

#[test]
fn test_list_lines_start_with_dash() {
    let conversion = convert(&SourceDocument::from_texts([REPORT_PAGE]), &plain_options());

    let mut lists = 0;
    for block in &conversion.document.pages[0].elements {
        if let Block::List { items } = block {
            lists += 1;
            let rendered = list_builder::to_markdown(items);
            assert!(rendered.lines().all(|line| line.starts_with("- ")));
            assert!(conversion.markdown.contains(&rendered));
        }
    }
    assert_eq!(lists, 1);
    assert!(conversion
        .markdown
        .contains("- 2. Hire 14 additional drivers starting in March"));
}

#[test]
fn test_image_file_names_unique() {
    fn gray(value: u8) -> RasterObject {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[value; 4]).unwrap();
        RasterObject::new("FlateDecode", 2, 2, encoder.finish().unwrap()).with_color_space("DeviceGray")
    }

    let source = SourceDocument {
        name: None,
        pages: vec![
            SourcePage::new(1, "").with_image(gray(1)).with_image(gray(2)),
            SourcePage::new(2, "")
                .with_image(RasterObject::new("LZWDecode", 1, 1, vec![0]))
                .with_image(gray(3)),
            SourcePage::new(1, "").with_image(gray(4)),
        ],
    };
    let conversion = convert(&source, &ConvertOptions::default());

    let names: Vec<&str> = conversion
        .document
        .all_assets()
        .map(|a| a.file_name.as_str())
        .collect();
    let unique: HashSet<&str> = names.iter().copied().collect();
    assert_eq!(names.len(), 4);
    assert_eq!(unique.len(), names.len());
    assert!(unique.contains("image_1_3.png"));
    assert!(unique.contains("image_2_1.png"));
}
