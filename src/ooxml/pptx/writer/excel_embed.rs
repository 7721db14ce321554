//! Excel workbook embedding for chart data.
//!
//! This module generates minimal XLSX files containing chart data for embedding
//! in PowerPoint presentations. The generated files are valid Excel workbooks
//! that PowerPoint opens when the user edits a chart's data.

use crate::common::xml::escape_xml;
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::{content_type as ct, namespace, relationship_type as rt};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use crate::ooxml::opc::phys_pkg::{Compression, PhysPkgWriter};
use crate::ooxml::pptx::parts::chart::{ChartData, DATA_SHEET_NAME};
use std::fmt::Write;

/// Generate a minimal Excel workbook containing chart data.
///
/// Creates a valid XLSX file with one worksheet containing:
/// - Categories in column A (row 2 onwards)
/// - Series names in row 1 (column B onwards)
/// - Series data in the corresponding columns
///
/// # Example Layout
/// ```text
///     |    A     |    B     |    C     |
/// ----+----------+----------+----------+
///   1 |          | Series 1 | Series 2 |
///   2 | Cat 1    |   10.0   |   15.0   |
///   3 | Cat 2    |   20.0   |   25.0   |
/// ```
pub fn generate_chart_excel_data(chart: &ChartData) -> Result<Vec<u8>> {
    let mut writer = PhysPkgWriter::new(Compression::Deflated);

    let members = [
        (CONTENT_TYPES_URI, generate_content_types()),
        ("/_rels/.rels", generate_root_rels()),
        ("/xl/workbook.xml", generate_workbook_xml()),
        ("/xl/_rels/workbook.xml.rels", generate_workbook_rels()),
        ("/xl/worksheets/sheet1.xml", generate_worksheet_xml(chart)),
        ("/xl/styles.xml", generate_styles_xml()),
    ];
    for (name, xml) in &members {
        writer.write(&PackURI::new(*name)?, xml.as_bytes())?;
    }

    let bytes = writer.finish()?;
    log::debug!(
        "Generated chart workbook: {} series, {} rows, {} bytes",
        chart.series.len(),
        chart.row_count(),
        bytes.len()
    );
    Ok(bytes)
}

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Generate [Content_Types].xml for the XLSX package.
fn generate_content_types() -> String {
    format!(
        concat!(
            "{}",
            r#"<Types xmlns="{}">"#,
            r#"<Default Extension="rels" ContentType="{}"/>"#,
            r#"<Default Extension="xml" ContentType="{}"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="{}"/>"#,
            r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="{}"/>"#,
            r#"<Override PartName="/xl/styles.xml" ContentType="{}"/>"#,
            "</Types>"
        ),
        XML_HEADER,
        namespace::OPC_CONTENT_TYPES,
        ct::OPC_RELATIONSHIPS,
        ct::XML,
        ct::SML_SHEET_MAIN,
        ct::SML_WORKSHEET,
        ct::SML_STYLES,
    )
}

/// Generate root _rels/.rels file.
fn generate_root_rels() -> String {
    format!(
        r#"{}<Relationships xmlns="{}"><Relationship Id="rId1" Type="{}" Target="xl/workbook.xml"/></Relationships>"#,
        XML_HEADER,
        namespace::OPC_RELATIONSHIPS,
        rt::OFFICE_DOCUMENT,
    )
}

/// Generate xl/workbook.xml.
fn generate_workbook_xml() -> String {
    format!(
        r#"{}<workbook xmlns="{}" xmlns:r="{}"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        XML_HEADER,
        namespace::SML_MAIN,
        namespace::OFC_RELATIONSHIPS,
        DATA_SHEET_NAME,
    )
}

/// Generate xl/_rels/workbook.xml.rels.
fn generate_workbook_rels() -> String {
    format!(
        concat!(
            "{}",
            r#"<Relationships xmlns="{}">"#,
            r#"<Relationship Id="rId1" Type="{}" Target="worksheets/sheet1.xml"/>"#,
            r#"<Relationship Id="rId2" Type="{}" Target="styles.xml"/>"#,
            "</Relationships>"
        ),
        XML_HEADER,
        namespace::OPC_RELATIONSHIPS,
        rt::WORKSHEET,
        rt::STYLES,
    )
}

/// Generate xl/styles.xml (minimal styles).
fn generate_styles_xml() -> String {
    format!(
        concat!(
            "{}",
            r#"<styleSheet xmlns="{}">"#,
            r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>"#,
            r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
            r#"<borders count="1"><border/></borders>"#,
            r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
            r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>"#,
            "</styleSheet>"
        ),
        XML_HEADER,
        namespace::SML_MAIN,
    )
}

/// Generate xl/worksheets/sheet1.xml with chart data.
fn generate_worksheet_xml(chart: &ChartData) -> String {
    let mut xml = String::with_capacity(4096);

    xml.push_str(XML_HEADER);
    let _ = write!(xml, r#"<worksheet xmlns="{}">"#, namespace::SML_MAIN);
    xml.push_str("<sheetData>");

    // Row 1: series names, A1 left empty
    xml.push_str(r#"<row r="1">"#);
    for (col_idx, series) in chart.series.iter().enumerate() {
        let col_letter = column_letter(col_idx + 1);
        let _ = write!(
            xml,
            r#"<c r="{}1" t="inlineStr"><is><t>{}</t></is></c>"#,
            col_letter,
            escape_xml(&series.name)
        );
    }
    xml.push_str("</row>");

    for row_idx in 0..chart.row_count() {
        let row_num = row_idx + 2;
        let _ = write!(xml, r#"<row r="{}">"#, row_num);

        if let Some(category) = chart.categories.get(row_idx)
            && !category.is_empty()
        {
            let _ = write!(
                xml,
                r#"<c r="A{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                row_num,
                escape_xml(category)
            );
        }

        for (col_idx, series) in chart.series.iter().enumerate() {
            if let Some(value) = series.values.get(row_idx) {
                let _ = write!(
                    xml,
                    r#"<c r="{}{}"><v>{}</v></c>"#,
                    column_letter(col_idx + 1),
                    row_num,
                    value
                );
            }
        }

        xml.push_str("</row>");
    }

    xml.push_str("</sheetData>");
    xml.push_str("</worksheet>");

    xml
}

/// Convert a 0-based column index to Excel column letter (0=A, 1=B, ..., 25=Z, 26=AA).
pub(crate) fn column_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;

    loop {
        let remainder = n % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::phys_pkg::PhysPkgReader;
    use crate::ooxml::pptx::parts::chart::{ChartSeries, ChartType};

    fn sales() -> ChartData {
        ChartData::new(ChartType::Bar)
            .with_categories(vec!["Q1".to_string(), "Q2 & Q3".to_string()])
            .add_series(ChartSeries::new("Sales").with_values(vec![100.0, 200.0]))
            .add_series(ChartSeries::new("Profit").with_values(vec![50.0, 75.5]))
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(1), "B");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_generate_chart_excel_data() {
        let bytes = generate_chart_excel_data(&sales()).unwrap();
        assert_eq!(&bytes[0..4], &[0x50, 0x4B, 0x03, 0x04]);

        let reader = PhysPkgReader::from_bytes(bytes).unwrap();
        assert_eq!(reader.len(), 6);
        assert!(reader.content_types_xml().is_some());
        let sheet = PackURI::new("/xl/worksheets/sheet1.xml").unwrap();
        let xml = String::from_utf8(reader.blob_for(&sheet).unwrap().to_vec()).unwrap();
        assert!(xml.contains(r#"<c r="C3"><v>75.5</v></c>"#));
    }

    #[test]
    fn test_generate_worksheet_xml() {
        let xml = generate_worksheet_xml(&sales());
        assert!(xml.contains(r#"<c r="B1" t="inlineStr"><is><t>Sales</t></is></c>"#));
        assert!(xml.contains(r#"<c r="A3" t="inlineStr"><is><t>Q2 &amp; Q3</t></is></c>"#));
        assert!(xml.contains(r#"<c r="B2"><v>100</v></c>"#));
        assert!(!xml.contains(r#"r="A1""#));
    }

    #[test]
    fn test_ragged_series_fill_longest_column() {
        let chart = ChartData::new(ChartType::Line)
            .add_series(ChartSeries::new("Short").with_values(vec![1.0]))
            .add_series(ChartSeries::new("Long").with_values(vec![1.0, 2.0, 3.0]));
        let xml = generate_worksheet_xml(&chart);
        assert!(xml.contains(r#"<row r="4">"#));
        assert!(xml.contains(r#"<c r="C4"><v>3</v></c>"#));
        assert!(!xml.contains(r#"r="B4""#));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn chart_type_strategy() -> impl Strategy<Value = ChartType> {
            prop_oneof![
                Just(ChartType::Bar),
                Just(ChartType::Column),
                Just(ChartType::Line),
                Just(ChartType::Pie),
                Just(ChartType::Area),
                Just(ChartType::Doughnut),
                Just(ChartType::Radar),
            ]
        }

        fn series_strategy() -> impl Strategy<Value = ChartSeries> {
            (
                "[a-zA-Z<&][a-zA-Z0-9 ]{0,20}",
                prop::collection::vec(-1000.0f64..1000.0f64, 1..10),
            )
                .prop_map(|(name, values)| ChartSeries::new(name).with_values(values))
        }

        fn chart_data_strategy() -> impl Strategy<Value = ChartData> {
            (
                chart_type_strategy(),
                prop::collection::vec("[a-zA-Z0-9][a-zA-Z0-9 ]{0,10}", 0..10),
                prop::collection::vec(series_strategy(), 1..5),
            )
                .prop_map(|(chart_type, categories, series)| {
                    series
                        .into_iter()
                        .fold(ChartData::new(chart_type).with_categories(categories), ChartData::add_series)
                })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn prop_excel_data_is_readable_zip(chart in chart_data_strategy()) {
                let bytes = generate_chart_excel_data(&chart).unwrap();
                prop_assert_eq!(&bytes[0..4], &[0x50, 0x4B, 0x03, 0x04]);

                let reader = PhysPkgReader::from_bytes(bytes).unwrap();
                let sheet = PackURI::new("/xl/worksheets/sheet1.xml").unwrap();
                let parsed = crate::common::xml::Element::parse(reader.blob_for(&sheet).unwrap());
                prop_assert!(parsed.is_ok());
                let rows = parsed.unwrap().descendants("row").len();
                prop_assert_eq!(rows, chart.row_count() + 1);
            }
        }
    }
}
