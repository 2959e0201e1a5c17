//! Single-sheet XLSX export.
//!
//! The workbook is written directly as SpreadsheetML parts inside a zip
//! container. Cells are inline strings, so no shared-string table is needed.
//! Every zip entry carries the same fixed timestamp.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{entry_row, ExportResult, EXPORT_HEADERS};
use crate::models::Entry;

pub const SHEET_NAME: &str = "Записи";

const COLUMNS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const CONTENT_TYPES: &str = concat!(
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    r#"</Types>"#,
);

const ROOT_RELS: &str = concat!(
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#,
);

const WORKBOOK_RELS: &str = concat!(
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"</Relationships>"#,
);

const STYLES: &str = concat!(
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>"#,
    r#"</styleSheet>"#,
);

/// Encode entries as an XLSX workbook with one sheet.
pub fn build_xlsx(entries: &[Entry]) -> ExportResult<Vec<u8>> {
    let parts = [
        ("[Content_Types].xml", xml_part(CONTENT_TYPES)),
        ("_rels/.rels", xml_part(ROOT_RELS)),
        ("xl/workbook.xml", workbook_xml()),
        ("xl/_rels/workbook.xml.rels", xml_part(WORKBOOK_RELS)),
        ("xl/styles.xml", xml_part(STYLES)),
        ("xl/worksheets/sheet1.xml", worksheet_xml(entries)),
    ];

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in parts {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

fn xml_part(body: &str) -> String {
    format!("{}\n{}", XML_DECLARATION, body)
}

fn workbook_xml() -> String {
    xml_part(&format!(
        concat!(
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>"#,
            r#"</workbook>"#,
        ),
        escape_xml(SHEET_NAME)
    ))
}

fn worksheet_xml(entries: &[Entry]) -> String {
    let mut sheet = String::from(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    push_row(&mut sheet, 1, &EXPORT_HEADERS);
    for (index, entry) in entries.iter().enumerate() {
        push_row(&mut sheet, index + 2, &entry_row(entry));
    }

    sheet.push_str("</sheetData></worksheet>");
    xml_part(&sheet)
}

/// Append a row; empty values produce no cell.
fn push_row<S: AsRef<str>>(sheet: &mut String, row_number: usize, values: &[S; 6]) {
    sheet.push_str(&format!(r#"<row r="{}">"#, row_number));
    for (column, value) in COLUMNS.iter().zip(values.iter()) {
        let value = value.as_ref();
        if value.is_empty() {
            continue;
        }
        sheet.push_str(&format!(
            r#"<c r="{}{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            column,
            row_number,
            escape_xml(value)
        ));
    }
    sheet.push_str("</row>");
}

/// Escape markup characters and drop control characters XML 1.0 cannot carry.
fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(ch),
            c if c < ' ' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::{make_entry, sample_entries};
    use chrono::NaiveDate;
    use std::io::Read;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        contents
    }

    #[test]
    fn test_contains_workbook_parts() {
        let bytes = build_xlsx(&sample_entries()).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<_> = archive.file_names().collect();

        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/styles.xml",
            "xl/worksheets/sheet1.xml",
        ] {
            assert!(names.contains(&part), "missing {}", part);
        }
    }

    #[test]
    fn test_single_named_sheet() {
        let bytes = build_xlsx(&sample_entries()).unwrap();
        let workbook = read_part(&bytes, "xl/workbook.xml");
        assert_eq!(workbook.matches("<sheet ").count(), 1);
        assert!(workbook.contains(r#"name="Записи""#));
    }

    #[test]
    fn test_rows_follow_input_order() {
        let bytes = build_xlsx(&sample_entries()).unwrap();
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");

        assert_eq!(sheet.matches("<row ").count(), 3);
        assert!(sheet.contains(r#"<c r="A1" t="inlineStr"><is><t xml:space="preserve">Дата</t></is></c>"#));
        assert!(sheet.contains(r#"<c r="F1" t="inlineStr"><is><t xml:space="preserve">Заметки</t></is></c>"#));

        let first = sheet.find("2024-05-01").unwrap();
        let second = sheet.find("2024-04-30").unwrap();
        assert!(first < second);

        assert!(sheet.contains(r#"<c r="C2" t="inlineStr"><is><t xml:space="preserve">5</t></is></c>"#));
        assert!(sheet.contains(r#"<c r="E2" t="inlineStr"><is><t xml:space="preserve">нет</t></is></c>"#));
        assert!(sheet.contains(r#"<c r="B3" t="inlineStr"><is><t xml:space="preserve">severe</t></is></c>"#));
        assert!(sheet.contains(r#"<c r="E3" t="inlineStr"><is><t xml:space="preserve">да</t></is></c>"#));
        // Absent values leave no cell
        assert!(!sheet.contains(r#"r="B2""#));
    }

    #[test]
    fn test_byte_identical_output() {
        let entries = sample_entries();
        assert_eq!(build_xlsx(&entries).unwrap(), build_xlsx(&entries).unwrap());
    }

    #[test]
    fn test_escapes_markup() {
        let mut entry = make_entry(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        entry.notes = Some("<b>bold</b> & \"quoted\"\u{1}".into());

        let bytes = build_xlsx(&[entry]).unwrap();
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("&lt;b&gt;bold&lt;/b&gt; &amp; &quot;quoted&quot;</t>"));
    }

    #[test]
    fn test_escape_xml_keeps_whitespace() {
        assert_eq!(escape_xml("a\tb\nc"), "a\tb\nc");
        assert_eq!(escape_xml("it's"), "it&apos;s");
    }
}
