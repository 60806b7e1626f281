use std::io::{Cursor, Read};

use beat_styles::{Error, PaperSize, ScriptLine, StyleCatalog};

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const SHEET: &str = "
page { margin-top: 72; margin-bottom: 72; margin-left: 108; margin-right: 72 }
scene-heading { bold: true; uppercase: true; margin-top: 24 }
character { uppercase: true; margin-left: 158 }
dialogue { margin-left: 72; margin-right: 10; line-height: 12 }
transition { text-align: right; italic: true; underline: true }
";

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).expect("export should be a zip");
    let mut content = String::new();
    zip.by_name(name)
        .unwrap_or_else(|e| panic!("missing {name}: {e}"))
        .read_to_string(&mut content)
        .unwrap();
    content
}

fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(WML_NS))
}

fn wml_val<'a>(node: roxmltree::Node<'a, 'a>, name: &str, attr: &str) -> Option<&'a str> {
    wml(node, name).and_then(|n| n.attribute((WML_NS, attr)))
}

fn paragraphs<'a>(doc: &'a roxmltree::Document<'a>) -> Vec<roxmltree::Node<'a, 'a>> {
    let body = wml(doc.root_element(), "body").expect("document has a body");
    body.children()
        .filter(|n| n.tag_name().name() == "p" && n.tag_name().namespace() == Some(WML_NS))
        .collect()
}

fn paragraph_text(p: roxmltree::Node) -> String {
    p.descendants()
        .filter(|n| n.tag_name().name() == "t")
        .filter_map(|n| n.text())
        .collect()
}

fn script() -> Vec<ScriptLine> {
    vec![
        ScriptLine::new("scene-heading", "INT. DINER - NIGHT"),
        ScriptLine::new("action", "Rain on the windows. Pie & coffee."),
        ScriptLine::new("character", "MAYA"),
        ScriptLine::new("dialogue", "  We <never> left."),
        ScriptLine::new("transition", "CUT TO:"),
    ]
}

#[test]
fn export_writes_docx_package() {
    let catalog = StyleCatalog::parse(SHEET).unwrap();
    let bytes = beat_styles::export_docx(&catalog, &script(), PaperSize::A4).unwrap();

    let types = read_part(&bytes, "[Content_Types].xml");
    assert!(types.contains("/word/document.xml"));
    let rels = read_part(&bytes, "_rels/.rels");
    assert!(rels.contains("word/document.xml"));
}

#[test]
fn export_paragraphs_follow_resolved_styles() {
    let catalog = StyleCatalog::parse(SHEET).unwrap();
    let bytes = beat_styles::export_docx(&catalog, &script(), PaperSize::A4).unwrap();
    let xml = read_part(&bytes, "word/document.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let paras = paragraphs(&doc);
    assert_eq!(paras.len(), 5);

    let texts: Vec<String> = paras.iter().map(|p| paragraph_text(*p)).collect();
    assert_eq!(texts[1], "Rain on the windows. Pie & coffee.");
    assert_eq!(texts[3], "  We <never> left.");

    let heading = paras[0];
    let rpr = wml(heading, "r").and_then(|r| wml(r, "rPr")).unwrap();
    assert!(wml(rpr, "b").is_some());
    assert!(wml(rpr, "caps").is_some());
    let ppr = wml(heading, "pPr").unwrap();
    assert_eq!(wml_val(ppr, "spacing", "before"), Some("480"));

    // action is not in the sheet: plain fallback paragraph
    let action_ppr = wml(paras[1], "pPr").unwrap();
    assert_eq!(wml_val(action_ppr, "ind", "left"), Some("0"));
    assert_eq!(wml_val(action_ppr, "jc", "val"), Some("left"));
    let action_rpr = wml(paras[1], "r").and_then(|r| wml(r, "rPr")).unwrap();
    assert_eq!(action_rpr.children().count(), 0);

    let character_ppr = wml(paras[2], "pPr").unwrap();
    assert_eq!(wml_val(character_ppr, "ind", "left"), Some("3160"));

    let dialogue_ppr = wml(paras[3], "pPr").unwrap();
    assert_eq!(wml_val(dialogue_ppr, "ind", "right"), Some("200"));
    assert_eq!(wml_val(dialogue_ppr, "spacing", "line"), Some("240"));
    assert_eq!(wml_val(dialogue_ppr, "spacing", "lineRule"), Some("exact"));

    let transition = paras[4];
    assert_eq!(wml_val(wml(transition, "pPr").unwrap(), "jc", "val"), Some("right"));
    let transition_rpr = wml(transition, "r").and_then(|r| wml(r, "rPr")).unwrap();
    assert!(wml(transition_rpr, "i").is_some());
    assert_eq!(wml_val(transition_rpr, "u", "val"), Some("single"));
}

#[test]
fn export_page_geometry() {
    let catalog = StyleCatalog::parse(SHEET).unwrap();
    let bytes = beat_styles::export_docx(&catalog, &[], PaperSize::UsLetter).unwrap();
    let xml = read_part(&bytes, "word/document.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();
    assert!(paragraphs(&doc).is_empty());

    let sect = wml(doc.root_element(), "body").and_then(|b| wml(b, "sectPr")).unwrap();
    assert_eq!(wml_val(sect, "pgSz", "w"), Some("12240"));
    assert_eq!(wml_val(sect, "pgSz", "h"), Some("15840"));
    assert_eq!(wml_val(sect, "pgMar", "left"), Some("2160"));
    assert_eq!(wml_val(sect, "pgMar", "top"), Some("1440"));
}

#[test]
fn export_without_page_style_fails() {
    let catalog = StyleCatalog::parse("action { bold: true }").unwrap();
    let result = beat_styles::export_docx(&catalog, &script(), PaperSize::A4);
    assert!(matches!(result, Err(Error::MissingPageStyle)));
}

#[test]
fn read_script_lines() {
    let lines = beat_styles::read_script("scene-heading\tEXT. ROOF - DAY\n\nShe waits.\ncharacter \tMAYA\n");
    assert_eq!(
        lines,
        vec![
            ScriptLine::new("scene-heading", "EXT. ROOF - DAY"),
            ScriptLine::new("action", "She waits."),
            ScriptLine::new("character", "MAYA"),
        ]
    );
}

#[test]
fn export_script_file_with_bundled_styles() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("pilot.txt");
    let output = dir.path().join("pilot.docx");
    std::fs::write(&input, "scene-heading\tINT. OFFICE - DAY\ncharacter\tJO\ndialogue\tMorning.\n").unwrap();

    let catalog = StyleCatalog::bundled();
    beat_styles::export_script_to_docx(&catalog, &input, &output, PaperSize::A4).unwrap();

    let bytes = std::fs::read(&output).unwrap();
    let xml = read_part(&bytes, "word/document.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let texts: Vec<String> = paragraphs(&doc).into_iter().map(paragraph_text).collect();
    assert_eq!(texts, vec!["INT. OFFICE - DAY", "JO", "Morning."]);
}

fn document(sheet: &str, lines: &[ScriptLine], paper: PaperSize) -> String {
    let catalog = StyleCatalog::parse(sheet).unwrap();
    let bytes = beat_styles::export_docx(&catalog, lines, paper).unwrap();
    read_part(&bytes, "word/document.xml")
}

#[test]
fn element_width_narrows_right_indent() {
    let sheet = "page { width-a4: 595; default-width-a4: 400; margin-left: 108; margin-right: 72 }";
    let xml = document(sheet, &[ScriptLine::new("shot", "CLOSE ON the clock.")], PaperSize::A4);
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let ppr = wml(paragraphs(&doc)[0], "pPr").unwrap();
    // 595 - 108 - 72 leaves 415pt of text width, the fallback is 400pt wide.
    assert_eq!(wml_val(ppr, "ind", "right"), Some("300"));

    let wide = "page { width-a4: 595; margin-left: 108; margin-right: 72 }";
    let xml = document(wide, &[ScriptLine::new("shot", "CLOSE ON the clock.")], PaperSize::A4);
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let ppr = wml(paragraphs(&doc)[0], "pPr").unwrap();
    assert_eq!(wml_val(ppr, "ind", "right"), Some("0"));
}

#[test]
fn element_margin_right_wins_over_wider_gap() {
    let sheet = "page { width-us: 612; margin-left: 72; margin-right: 72 } \
                 parenthetical { width-us: 400; margin-left: 50; margin-right: 100 }";
    let xml = document(sheet, &[ScriptLine::new("parenthetical", "(beat)")], PaperSize::UsLetter);
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let ppr = wml(paragraphs(&doc)[0], "pPr").unwrap();
    // 468 - 50 - 400 = 18pt of gap, below the element's own 100pt margin.
    assert_eq!(wml_val(ppr, "ind", "right"), Some("2000"));
    assert_eq!(wml_val(ppr, "ind", "left"), Some("1000"));
}

#[test]
fn content_padding_insets_both_sides() {
    let sheet = "page { } lyrics { margin-left: 10; padding-left: 5; content-padding: 3; margin-right: 4; text-align: justify }";
    let xml = document(sheet, &[ScriptLine::new("lyrics", "La la la")], PaperSize::A4);
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let ppr = wml(paragraphs(&doc)[0], "pPr").unwrap();
    assert_eq!(wml_val(ppr, "ind", "left"), Some("360"));
    assert_eq!(wml_val(ppr, "ind", "right"), Some("140"));
    assert_eq!(wml_val(ppr, "jc", "val"), Some("both"));
}

#[test]
fn page_width_comes_from_page_style() {
    let xml = document("page { width-us: 600; margin-left: 12.34 }", &[], PaperSize::UsLetter);
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let sect = wml(doc.root_element(), "body").and_then(|b| wml(b, "sectPr")).unwrap();
    assert_eq!(wml_val(sect, "pgSz", "w"), Some("12000"));
    assert_eq!(wml_val(sect, "pgSz", "h"), Some("15840"));
    assert_eq!(wml_val(sect, "pgMar", "left"), Some("247"));
}

#[test]
fn control_characters_are_dropped_from_text() {
    let lines = [
        ScriptLine::new("action", "A\u{1}B\u{FFFF}C\u{1B}"),
        ScriptLine::new("dialogue", "\"Quoted\" & 'single' <tag>\ttab"),
    ];
    let xml = document("page { }", &lines, PaperSize::A4);
    let doc = roxmltree::Document::parse(&xml).expect("document.xml should be well-formed");
    let texts: Vec<String> = paragraphs(&doc).into_iter().map(paragraph_text).collect();
    assert_eq!(texts, vec!["ABC", "\"Quoted\" & 'single' <tag>\ttab"]);
}
