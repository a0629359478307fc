//! Minimal single-sheet XLSX writer.
//!
//! Produces just the parts Excel, LibreOffice and pandas need to open a workbook:
//! content types, package relationships, the workbook, one worksheet and the shared
//! string table. No styles.

use crate::error::ExportError;
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const SHEET_NAME: &str = "Sheet1";

const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
    r#"</Types>"#,
);

const ROOT_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#,
);

const WORKBOOK_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
    r#"</Relationships>"#,
);

/// Value of a single populated cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue<'a> {
    Text(&'a str),
    /// Already formatted as a plain decimal or exponent literal
    Number(String),
    Bool(bool),
}

/// Escape text for element content, dropping characters XML 1.0 cannot carry.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 => {}
            '\u{FFFE}' | '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

/// Convert a 1-based column number to its letters (1 -> A, 27 -> AA).
fn column_to_letters(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Deduplicating shared string table
#[derive(Debug, Default)]
struct SharedStrings {
    strings: Vec<String>,
    index: HashMap<String, usize>,
    /// Number of cells referencing the table, duplicates included
    references: usize,
}

impl SharedStrings {
    fn add(&mut self, s: &str) -> usize {
        self.references += 1;
        if let Some(&idx) = self.index.get(s) {
            return idx;
        }
        let idx = self.strings.len();
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), idx);
        idx
    }

    fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(64 + self.strings.len() * 32);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        let _ = write!(
            xml,
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
            self.references,
            self.strings.len()
        );

        for s in &self.strings {
            if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
                let _ = write!(xml, r#"<si><t xml:space="preserve">{}</t></si>"#, escape_xml(s));
            } else {
                let _ = write!(xml, "<si><t>{}</t></si>", escape_xml(s));
            }
        }

        xml.push_str("</sst>");
        xml
    }
}

/// Builds a one-sheet workbook row by row, then packs it into an XLSX buffer.
#[derive(Debug, Default)]
pub struct WorkbookWriter {
    strings: SharedStrings,
    sheet_data: String,
    rows: u32,
    max_col: u32,
}

impl WorkbookWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> u32 {
        self.rows
    }

    /// Append a row. `None` leaves that column's cell out entirely.
    pub fn write_row(&mut self, cells: &[Option<CellValue<'_>>]) {
        self.rows += 1;
        let row = self.rows;
        let _ = write!(self.sheet_data, r#"<row r="{}">"#, row);

        for (i, cell) in cells.iter().enumerate() {
            let Some(value) = cell else { continue };
            let col = i as u32 + 1;
            self.max_col = self.max_col.max(col);
            let cell_ref = format!("{}{}", column_to_letters(col), row);

            let _ = match value {
                CellValue::Text(s) => {
                    let idx = self.strings.add(s);
                    write!(self.sheet_data, r#"<c r="{}" t="s"><v>{}</v></c>"#, cell_ref, idx)
                }
                CellValue::Number(n) => {
                    write!(self.sheet_data, r#"<c r="{}"><v>{}</v></c>"#, cell_ref, n)
                }
                CellValue::Bool(b) => write!(
                    self.sheet_data,
                    r#"<c r="{}" t="b"><v>{}</v></c>"#,
                    cell_ref,
                    u8::from(*b)
                ),
            };
        }

        self.sheet_data.push_str("</row>");
    }

    fn sheet_xml(&self) -> String {
        let mut xml = String::with_capacity(self.sheet_data.len() + 512);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);

        if self.rows > 0 && self.max_col > 0 {
            let _ = write!(
                xml,
                r#"<dimension ref="A1:{}{}"/>"#,
                column_to_letters(self.max_col),
                self.rows
            );
        }

        xml.push_str("<sheetData>");
        xml.push_str(&self.sheet_data);
        xml.push_str("</sheetData></worksheet>");
        xml
    }

    fn workbook_xml() -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
                r#"<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>"#,
                r#"</workbook>"#
            ),
            SHEET_NAME
        )
    }

    /// Pack the workbook into an in-memory `.xlsx` archive
    pub fn finish(self) -> Result<Vec<u8>, ExportError> {
        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
            ("_rels/.rels", ROOT_RELS_XML.to_string()),
            ("xl/workbook.xml", Self::workbook_xml()),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.to_string()),
            ("xl/worksheets/sheet1.xml", self.sheet_xml()),
            ("xl/sharedStrings.xml", self.strings.to_xml()),
        ];

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, contents) in parts {
            zip.start_file(name, options)?;
            zip.write_all(contents.as_bytes())?;
        }

        Ok(zip.finish()?.into_inner())
    }
}
