//! XML sheet format (`.xlcx`)
//!
//! ```text
//! <SavedData>
//!   <Rows>5</Rows>
//!   <Cols>5</Cols>
//!   <Cells>
//!     <CellRecord>
//!       <Name>A1</Name>
//!       <Value>=B1+1</Value>
//!     </CellRecord>
//!   </Cells>
//! </SavedData>
//! ```

use super::{SheetData, read_sheet_file};
use crate::document::Sheet;
use crate::error::{GridcalcError, Result};
use gridcalc_engine::engine::CellRef;
use serde::{Deserialize, Serialize};
use std::path::Path;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "SavedData")]
struct SavedData {
    #[serde(rename = "Rows")]
    rows: usize,
    #[serde(rename = "Cols")]
    cols: usize,
    #[serde(rename = "Cells", default)]
    cells: CellList,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CellList {
    #[serde(rename = "CellRecord", default)]
    records: Vec<CellRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CellRecord {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Value", default)]
    value: String,
}

/// Parse an XML sheet file
pub fn parse_xml(path: &Path) -> Result<SheetData> {
    let content = read_sheet_file(path)?;
    parse_xml_content(&content)
}

/// Parse XML sheet content
///
/// Cell names are case-insensitive. A record outside the declared extent is
/// rejected, and empty values are dropped.
pub fn parse_xml_content(content: &str) -> Result<SheetData> {
    let saved: SavedData =
        quick_xml::de::from_str(content).map_err(|e| GridcalcError::Xml(e.to_string()))?;

    let mut data = SheetData {
        rows: saved.rows,
        cols: saved.cols,
        cells: Vec::with_capacity(saved.cells.records.len()),
    };
    for record in saved.cells.records {
        let cell_ref = CellRef::from_str(record.name.trim())
            .ok_or_else(|| GridcalcError::Xml(format!("Invalid cell name: {}", record.name)))?;
        if !cell_ref.in_bounds(data.rows, data.cols) {
            return Err(GridcalcError::Xml(format!(
                "Cell {} lies outside the declared size {}x{}",
                cell_ref, data.rows, data.cols
            )));
        }
        if !record.value.is_empty() {
            data.cells.push((cell_ref, record.value));
        }
    }

    Ok(data)
}

/// Write a sheet to an XML file
pub fn write_xml(path: &Path, sheet: &Sheet) -> Result<()> {
    let content = write_xml_content(sheet)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Write a sheet to an XML string, cells sorted by row then column
pub fn write_xml_content(sheet: &Sheet) -> Result<String> {
    let saved = SavedData {
        rows: sheet.rows,
        cols: sheet.cols,
        cells: CellList {
            records: sheet
                .sorted_cells()
                .into_iter()
                .map(|(cell_ref, value)| CellRecord {
                    name: cell_ref.to_string(),
                    value,
                })
                .collect(),
        },
    };

    let mut out = String::from(XML_DECLARATION);
    let mut serializer = quick_xml::se::Serializer::new(&mut out);
    serializer.indent(' ', 2);
    saved
        .serialize(serializer)
        .map_err(|e| GridcalcError::Xml(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    #[test]
    fn test_parse_xml_serializer_output() {
        let content = r#"<?xml version="1.0" encoding="utf-16"?>
<SavedData xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <Rows>6</Rows>
  <Cols>4</Cols>
  <Cells>
    <CellRecord>
      <Name>A1</Name>
      <Value>10</Value>
    </CellRecord>
    <CellRecord>
      <Name>d6</Name>
      <Value>=A1 &lt;&gt; 3</Value>
    </CellRecord>
  </Cells>
</SavedData>"#;
        let data = parse_xml_content(content).unwrap();
        assert_eq!((data.rows, data.cols), (6, 4));
        assert_eq!(
            data.cells,
            vec![
                (cell("A1"), "10".to_string()),
                (cell("D6"), "=A1 <> 3".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_xml_without_cells() {
        let data = parse_xml_content("<SavedData><Rows>2</Rows><Cols>3</Cols><Cells /></SavedData>")
            .unwrap();
        assert_eq!((data.rows, data.cols), (2, 3));
        assert!(data.cells.is_empty());
    }

    #[test]
    fn test_parse_xml_rejects_bad_records() {
        let bad_name = "<SavedData><Rows>2</Rows><Cols>2</Cols><Cells>\
            <CellRecord><Name>1A</Name><Value>1</Value></CellRecord></Cells></SavedData>";
        assert!(matches!(parse_xml_content(bad_name), Err(GridcalcError::Xml(_))));

        let outside = "<SavedData><Rows>2</Rows><Cols>2</Cols><Cells>\
            <CellRecord><Name>C1</Name><Value>1</Value></CellRecord></Cells></SavedData>";
        assert!(matches!(parse_xml_content(outside), Err(GridcalcError::Xml(_))));

        assert!(matches!(parse_xml_content("not xml"), Err(GridcalcError::Xml(_))));
    }

    #[test]
    fn test_write_xml_shape() {
        let mut sheet = Sheet::new();
        sheet.set_cell(cell("B2"), "=A1<3").unwrap();
        sheet.set_cell(cell("A1"), "2").unwrap();
        let content = write_xml_content(&sheet).unwrap();

        assert!(content.starts_with("<?xml"));
        assert!(content.contains("<Rows>5</Rows>"));
        assert!(content.contains("<Cols>5</Cols>"));
        assert!(content.contains("<Name>A1</Name>"));
        assert!(content.contains("<Value>=A1&lt;3</Value>"));
        let a1 = content.find("<Name>A1</Name>").unwrap();
        let b2 = content.find("<Name>B2</Name>").unwrap();
        assert!(a1 < b2);
    }

    #[test]
    fn test_xml_content_survives_reload() {
        let mut sheet = Sheet::new();
        sheet.add_row();
        sheet.set_cell(cell("A1"), "label & \"quotes\"").unwrap();
        sheet.set_cell(cell("E6"), "=inc(A2) div 2").unwrap();

        let data = parse_xml_content(&write_xml_content(&sheet).unwrap()).unwrap();
        assert_eq!((data.rows, data.cols), (6, 5));
        assert_eq!(data.cells, sheet.sorted_cells());
    }
}
