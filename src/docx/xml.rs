//! Paragraph scanning and run rendering for `word/document.xml`.
//!
//! Only body-level `<w:p>` elements count as paragraphs; paragraphs in table
//! cells, text boxes or content controls are left alone. Scanning records
//! byte offsets into the original XML so that saving can splice new runs in
//! without re-serializing anything else.

use super::Run;
use crate::error::{Error, Result};
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Where appended runs go for a scanned paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphSpan {
    /// Byte offset of the paragraph's `</w:p>` tag.
    Element { close_at: usize },
    /// Byte range of a self-closing `<w:p .../>` tag.
    SelfClosing { start: usize, end: usize },
}

struct OpenParagraph {
    text: String,
    /// Depth of `<w:p>` elements nested inside this one (text boxes).
    nested: usize,
}

/// Collect the text and location of each body-level paragraph, in order.
pub fn scan_paragraphs(xml: &str) -> Result<Vec<(String, ParagraphSpan)>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut depth = 0usize;
    let mut body_depth: Option<usize> = None;
    let mut open: Option<OpenParagraph> = None;
    let mut text_start: Option<usize> = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader.read_event()?;
        let after = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                depth += 1;
                match e.name().as_ref() {
                    b"w:body" => body_depth = Some(depth),
                    b"w:p" => match open.as_mut() {
                        Some(para) => para.nested += 1,
                        None if body_depth == Some(depth - 1) => {
                            open = Some(OpenParagraph {
                                text: String::new(),
                                nested: 0,
                            });
                        }
                        None => {}
                    },
                    b"w:t" if open.as_ref().is_some_and(|p| p.nested == 0) => {
                        text_start = Some(after);
                    }
                    _ => {}
                }
            }
            Event::End(e) => {
                match e.name().as_ref() {
                    b"w:t" => {
                        if let (Some(start), Some(para)) = (text_start.take(), open.as_mut()) {
                            let raw = &xml[start..before];
                            let text = unescape(raw)
                                .map_err(|err| Error::InvalidDocx(format!("bad text escape: {err}")))?;
                            para.text.push_str(&text);
                        }
                    }
                    b"w:p" => match open.as_mut() {
                        Some(para) if para.nested > 0 => para.nested -= 1,
                        Some(_) => {
                            if let Some(para) = open.take() {
                                paragraphs.push((para.text, ParagraphSpan::Element { close_at: before }));
                            }
                        }
                        None => {}
                    },
                    b"w:body" => body_depth = None,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Empty(e) => {
                let collecting = open.as_ref().is_some_and(|p| p.nested == 0);
                match e.name().as_ref() {
                    b"w:p" if open.is_none() && body_depth == Some(depth) => {
                        paragraphs.push((
                            String::new(),
                            ParagraphSpan::SelfClosing { start: before, end: after },
                        ));
                    }
                    b"w:tab" if collecting => push_text(&mut open, '\t'),
                    b"w:br" | b"w:cr" if collecting => push_text(&mut open, '\n'),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if body_depth.is_some() || open.is_some() {
        return Err(Error::InvalidDocx("unterminated document body".to_string()));
    }
    Ok(paragraphs)
}

fn push_text(open: &mut Option<OpenParagraph>, c: char) {
    if let Some(para) = open.as_mut() {
        para.text.push(c);
    }
}

/// Render one run as WordprocessingML.
pub fn render_run(run: &Run) -> String {
    let mut props = String::new();
    if let Some(font) = &run.font {
        let font = escape(font.as_str());
        props.push_str(&format!(
            r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/>"#
        ));
    }
    if run.bold {
        props.push_str("<w:b/><w:bCs/>");
    }
    if let Some(size) = run.size_pt {
        // Half-points.
        let half = size * 2;
        props.push_str(&format!(r#"<w:sz w:val="{half}"/><w:szCs w:val="{half}"/>"#));
    }

    let mut out = String::from("<w:r>");
    if !props.is_empty() {
        out.push_str("<w:rPr>");
        out.push_str(&props);
        out.push_str("</w:rPr>");
    }
    out.push_str(&render_text(&run.text));
    out.push_str("</w:r>");
    out
}

/// Characters XML 1.0 allows in content.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Run content for `text`: `<w:t>` pieces separated by breaks and tabs.
///
/// Characters that cannot appear in XML are dropped.
pub fn render_text(text: &str) -> String {
    let text: String = text.chars().filter(|&c| is_xml_char(c)).collect();
    let mut out = String::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<w:br/>");
        }
        for (j, piece) in line.split('\t').enumerate() {
            if j > 0 {
                out.push_str("<w:tab/>");
            }
            if !piece.is_empty() {
                out.push_str(r#"<w:t xml:space="preserve">"#);
                out.push_str(&escape(piece));
                out.push_str("</w:t>");
            }
        }
    }
    out
}

/// Splice runs into the document XML. `edits` must follow document order.
pub fn apply_runs(xml: &str, edits: &[(ParagraphSpan, &[Run])]) -> String {
    let mut out = String::with_capacity(xml.len() + edits.len() * 256);
    let mut cursor = 0usize;

    for (span, runs) in edits {
        let rendered: String = runs.iter().map(render_run).collect();
        match *span {
            ParagraphSpan::Element { close_at } => {
                out.push_str(&xml[cursor..close_at]);
                out.push_str(&rendered);
                cursor = close_at;
            }
            ParagraphSpan::SelfClosing { start, end } => {
                out.push_str(&xml[cursor..start]);
                let tag = xml[start..end].trim_end_matches('>').trim_end_matches('/');
                out.push_str(tag.trim_end());
                out.push('>');
                out.push_str(&rendered);
                out.push_str("</w:p>");
                cursor = end;
            }
        }
    }
    out.push_str(&xml[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
        r#"<w:p><w:r><w:t>Tom &amp; Jerry</w:t></w:r><w:r><w:tab/><w:t xml:space="preserve"> run</w:t></w:r></w:p>"#,
        r#"<w:p w:rsidR="00AB"/>"#,
        r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>In a table</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        r#"<w:p><w:r><w:t>Outer</w:t></w:r><w:r><w:txbxContent><w:p><w:r><w:t>Boxed</w:t></w:r></w:p></w:txbxContent></w:r><w:r><w:br/><w:t>after</w:t></w:r></w:p>"#,
        r#"<w:sectPr/></w:body></w:document>"#
    );

    #[test]
    fn test_scan_body_paragraphs_only() {
        let paragraphs = scan_paragraphs(BODY).unwrap();
        let texts: Vec<&str> = paragraphs.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["Tom & Jerry\t run", "", "Outer\nafter"]);
        assert!(matches!(paragraphs[1].1, ParagraphSpan::SelfClosing { .. }));
    }

    #[test]
    fn test_apply_runs_inserts_before_close_tag() {
        let paragraphs = scan_paragraphs(BODY).unwrap();
        let runs = vec![Run::new("\nextra")];
        let xml = apply_runs(BODY, &[(paragraphs[0].1, runs.as_slice())]);
        assert!(xml.contains(r#" run</w:t></w:r><w:r><w:br/><w:t xml:space="preserve">extra</w:t></w:r></w:p>"#));

        let rescanned = scan_paragraphs(&xml).unwrap();
        assert_eq!(rescanned[0].0, "Tom & Jerry\t run\nextra");
        assert_eq!(rescanned.len(), 3);
    }

    #[test]
    fn test_apply_runs_expands_self_closing_paragraph() {
        let paragraphs = scan_paragraphs(BODY).unwrap();
        let runs = vec![Run::new("now filled")];
        let xml = apply_runs(BODY, &[(paragraphs[1].1, runs.as_slice())]);
        assert!(xml.contains(r#"<w:p w:rsidR="00AB"><w:r>"#));

        let rescanned = scan_paragraphs(&xml).unwrap();
        assert_eq!(rescanned[1].0, "now filled");
        assert_eq!(rescanned[2].0, "Outer\nafter");
    }

    #[test]
    fn test_render_run_formatting() {
        let run = Run::new("总结 & more").font("Microsoft YaHei").bold(true).size(11);
        let xml = render_run(&run);
        assert!(xml.contains(r#"w:eastAsia="Microsoft YaHei""#));
        assert!(xml.contains("<w:b/>"));
        assert!(xml.contains(r#"<w:sz w:val="22"/>"#));
        assert!(xml.contains("总结 &amp; more"));
    }

    #[test]
    fn test_render_plain_run_has_no_properties() {
        let xml = render_run(&Run::new("plain"));
        assert_eq!(xml, r#"<w:r><w:t xml:space="preserve">plain</w:t></w:r>"#);
    }

    #[test]
    fn test_render_text_breaks_and_tabs() {
        assert_eq!(
            render_text("a\tb\nc"),
            r#"<w:t xml:space="preserve">a</w:t><w:tab/><w:t xml:space="preserve">b</w:t><w:br/><w:t xml:space="preserve">c</w:t>"#
        );
    }

    #[test]
    fn test_render_text_drops_control_characters() {
        assert_eq!(
            render_text("Vertical\u{B}tab\u{0}and\u{1F} form\u{C}feed\u{FFFF}"),
            r#"<w:t xml:space="preserve">Verticaltaband formfeed</w:t>"#
        );
        assert_eq!(render_text("\u{8}"), "");
    }

    #[test]
    fn test_control_characters_survive_a_save() {
        let xml = format!(
            r#"<w:document><w:body><w:p>{}</w:p></w:body></w:document>"#,
            render_run(&Run::new("bell\u{7} here"))
        );
        let paragraphs = scan_paragraphs(&xml).unwrap();
        assert_eq!(paragraphs[0].0, "bell here");
    }

    #[test]
    fn test_unterminated_body_rejected() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>x</w:t></w:r></w:p>"#;
        assert!(scan_paragraphs(xml).is_err());
    }
}
