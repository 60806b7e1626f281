use std::io::{Cursor, Write};

use log::debug;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use zip::write::SimpleFileOptions;

use crate::error::Error;
use crate::model::{PaperSize, ScriptLine, StyleRule, TextAlign};
use crate::styles::StyleCatalog;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

type XmlWriter = Writer<Vec<u8>>;

fn pts_to_twips(pts: f32) -> String {
    ((pts * 20.0).round() as i64).to_string()
}

/// Drops characters XML 1.0 cannot carry.
fn xml_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(c,
                '\t' | '\n' | '\r'
                | '\u{20}'..='\u{D7FF}'
                | '\u{E000}'..='\u{FFFD}'
                | '\u{10000}'..='\u{10FFFF}')
        })
        .collect()
}

fn jc_value(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Right => "right",
        TextAlign::Justify => "both",
    }
}

fn tag<'a>(name: &'a str, attrs: &[(&str, String)]) -> BytesStart<'a> {
    let mut tag = BytesStart::new(name);
    for (key, value) in attrs {
        tag.push_attribute((*key, value.as_str()));
    }
    tag
}

fn empty(writer: &mut XmlWriter, name: &str, attrs: &[(&str, String)]) -> Result<(), Error> {
    writer.write_event(Event::Empty(tag(name, attrs)))?;
    Ok(())
}

fn start(writer: &mut XmlWriter, name: &str, attrs: &[(&str, String)]) -> Result<(), Error> {
    writer.write_event(Event::Start(tag(name, attrs)))?;
    Ok(())
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<(), Error> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Page geometry shared by every paragraph of one export.
struct Layout {
    paper: PaperSize,
    text_width: f32,
}

fn write_paragraph(
    writer: &mut XmlWriter,
    style: &StyleRule,
    text: &str,
    layout: &Layout,
) -> Result<(), Error> {
    // An element narrower than the text area ends before the right margin.
    let width = style.width_for(layout.paper);
    let right_gap = if width > 0.0 {
        (layout.text_width - style.margin_left - width).max(style.margin_right)
    } else {
        style.margin_right
    };
    let indent_left = style.margin_left + style.padding_left + style.content_padding;
    let indent_right = (right_gap + style.content_padding).max(0.0);

    start(writer, "w:p", &[])?;
    start(writer, "w:pPr", &[])?;
    let mut spacing = vec![
        ("w:before", pts_to_twips(style.margin_top)),
        ("w:after", pts_to_twips(style.margin_bottom)),
    ];
    if style.line_height > 0.0 {
        spacing.push(("w:line", pts_to_twips(style.line_height)));
        spacing.push(("w:lineRule", "exact".to_string()));
    }
    empty(writer, "w:spacing", &spacing)?;
    empty(
        writer,
        "w:ind",
        &[
            ("w:left", pts_to_twips(indent_left)),
            ("w:right", pts_to_twips(indent_right)),
        ],
    )?;
    empty(writer, "w:jc", &[("w:val", jc_value(style.text_align).to_string())])?;
    end(writer, "w:pPr")?;

    start(writer, "w:r", &[])?;
    start(writer, "w:rPr", &[])?;
    if style.bold {
        empty(writer, "w:b", &[])?;
    }
    if style.italic {
        empty(writer, "w:i", &[])?;
    }
    if style.underline {
        empty(writer, "w:u", &[("w:val", "single".to_string())])?;
    }
    if style.uppercase {
        empty(writer, "w:caps", &[])?;
    }
    end(writer, "w:rPr")?;
    start(writer, "w:t", &[("xml:space", "preserve".to_string())])?;
    writer.write_event(Event::Text(BytesText::new(&xml_chars(text))))?;
    end(writer, "w:t")?;
    end(writer, "w:r")?;
    end(writer, "w:p")
}

fn document_xml(
    catalog: &StyleCatalog,
    lines: &[ScriptLine],
    paper: PaperSize,
) -> Result<Vec<u8>, Error> {
    let page = catalog.page()?;
    let (paper_width, page_height) = paper.dimensions();
    let page_width = Some(page.width_for(paper))
        .filter(|w| *w > 0.0)
        .unwrap_or(paper_width);
    let layout = Layout {
        paper,
        text_width: page_width - page.margin_left - page.margin_right,
    };

    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    start(&mut writer, "w:document", &[("xmlns:w", WML_NS.to_string())])?;
    start(&mut writer, "w:body", &[])?;

    for line in lines {
        let style = catalog.for_element(&line.element);
        write_paragraph(&mut writer, &style, &line.text, &layout)?;
    }

    start(&mut writer, "w:sectPr", &[])?;
    empty(
        &mut writer,
        "w:pgSz",
        &[
            ("w:w", pts_to_twips(page_width)),
            ("w:h", pts_to_twips(page_height)),
        ],
    )?;
    empty(
        &mut writer,
        "w:pgMar",
        &[
            ("w:top", pts_to_twips(page.margin_top)),
            ("w:right", pts_to_twips(page.margin_right)),
            ("w:bottom", pts_to_twips(page.margin_bottom)),
            ("w:left", pts_to_twips(page.margin_left)),
        ],
    )?;
    end(&mut writer, "w:sectPr")?;
    end(&mut writer, "w:body")?;
    end(&mut writer, "w:document")?;

    Ok(writer.into_inner())
}

/// Writes `lines` as a DOCX package, one paragraph per line, styled from
/// `catalog`. Fails if the catalog has no page style.
///
/// The page is as wide as the page style's width for `paper`, or the nominal
/// paper width when the style leaves it at zero.
pub fn export(
    catalog: &StyleCatalog,
    lines: &[ScriptLine],
    paper: PaperSize,
) -> Result<Vec<u8>, Error> {
    let document = document_xml(catalog, lines, paper)?;

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes()),
        ("word/document.xml", document.as_slice()),
    ] {
        zip.start_file(name, SimpleFileOptions::default())?;
        zip.write_all(content)?;
    }
    let bytes = zip.finish()?.into_inner();

    debug!("Exported {} lines ({} bytes)", lines.len(), bytes.len());
    Ok(bytes)
}
