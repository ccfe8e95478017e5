//! Building new documents from scratch.
//!
//! Documents come out on A4 paper with one-inch margins, body text in 12pt,
//! and a `Heading1` style for article titles.

use super::package::Part;
use super::xml::render_text;
use super::{DOCUMENT_PART, Document};
use crate::error::Result;
use quick_xml::escape::escape;

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
    r#"</Types>"#
);

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#
);

const DOCUMENT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"</Relationships>"#
);

const STYLES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/>"#,
    r#"<w:rPr><w:sz w:val="24"/><w:szCs w:val="24"/></w:rPr></w:style>"#,
    r#"<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/>"#,
    r#"<w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
    r#"<w:pPr><w:keepNext/><w:spacing w:before="480" w:after="0"/><w:outlineLvl w:val="0"/></w:pPr>"#,
    r#"<w:rPr><w:b/><w:bCs/><w:sz w:val="28"/><w:szCs w:val="28"/></w:rPr></w:style>"#,
    r#"<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/>"#,
    r#"<w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
    r#"<w:pPr><w:keepNext/><w:spacing w:before="200" w:after="0"/><w:outlineLvl w:val="1"/></w:pPr>"#,
    r#"<w:rPr><w:b/><w:bCs/><w:sz w:val="26"/><w:szCs w:val="26"/></w:rPr></w:style>"#,
    r#"</w:styles>"#
);

/// Page geometry in twentieths of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageSetup {
    width: u32,
    height: u32,
    margin: u32,
}

impl PageSetup {
    /// 8.3in x 11.7in with one-inch margins.
    const A4: PageSetup = PageSetup {
        width: 11952,
        height: 16848,
        margin: 1440,
    };
}

/// Accumulates paragraphs for a new document.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    page: PageSetup,
    body: String,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self {
            page: PageSetup::A4,
            body: String::new(),
        }
    }

    /// Add a heading paragraph; levels above 2 are clamped.
    pub fn add_heading(&mut self, text: &str, level: u8) -> &mut Self {
        let style = format!("Heading{}", level.clamp(1, 2));
        self.push_paragraph(text, Some(style.as_str()), false)
    }

    pub fn add_paragraph(&mut self, text: &str) -> &mut Self {
        self.push_paragraph(text, None, false)
    }

    pub fn add_left_aligned_paragraph(&mut self, text: &str) -> &mut Self {
        self.push_paragraph(text, None, true)
    }

    fn push_paragraph(
        &mut self,
        text: &str,
        style: Option<&str>,
        align_left: bool,
    ) -> &mut Self {
        if text.is_empty() && style.is_none() && !align_left {
            self.body.push_str("<w:p/>");
            return self;
        }

        self.body.push_str("<w:p>");
        if style.is_some() || align_left {
            self.body.push_str("<w:pPr>");
            if let Some(style) = style {
                self.body
                    .push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, escape(style)));
            }
            if align_left {
                self.body.push_str(r#"<w:jc w:val="left"/>"#);
            }
            self.body.push_str("</w:pPr>");
        }
        if !text.is_empty() {
            self.body.push_str("<w:r>");
            self.body.push_str(&render_text(text));
            self.body.push_str("</w:r>");
        }
        self.body.push_str("</w:p>");
        self
    }

    fn document_xml(&self) -> String {
        let PageSetup {
            width,
            height,
            margin,
        } = self.page;
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
                r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
                "<w:body>{body}",
                r#"<w:sectPr><w:pgSz w:w="{width}" w:h="{height}"/>"#,
                r#"<w:pgMar w:top="{margin}" w:right="{margin}" w:bottom="{margin}" w:left="{margin}" "#,
                r#"w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#,
                "</w:body></w:document>"
            ),
            body = self.body,
            width = width,
            height = height,
            margin = margin,
        )
    }

    pub fn build(&self) -> Result<Document> {
        let parts = vec![
            Part::new("[Content_Types].xml", CONTENT_TYPES),
            Part::new("_rels/.rels", PACKAGE_RELS),
            Part::new(DOCUMENT_PART, self.document_xml()),
            Part::new("word/_rels/document.xml.rels", DOCUMENT_RELS),
            Part::new("word/styles.xml", STYLES),
        ];
        Document::from_parts(parts)
    }
}
