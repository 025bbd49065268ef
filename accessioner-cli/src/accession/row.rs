//! Spreadsheet row model and CSV input/output
//!
//! Input sheets carry two header rows followed by data rows in a fixed column
//! order. Output sheets repeat the input columns and append the URIs created
//! while processing the row.

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Writer};

use crate::error::Result;

/// Number of header rows at the top of every input sheet
pub const HEADER_ROW_COUNT: usize = 2;

/// Number of event (type, outcome, date, note) groups per row
pub const EVENT_SLOTS: usize = 3;

/// Input columns, in sheet order
pub const INPUT_COLUMNS: [&str; 23] = [
    "Repository Name",
    "Security Tag",
    "Parent Record",
    "Title",
    "Component Unique ID",
    "Type_1",
    "Number_of_bytes",
    "Container_Summary",
    "Top Container",
    "Collection Name",
    "Event_Type_1",
    "Outcome_1",
    "Begin_1",
    "Outcome_Note_1",
    "Event_Type_2",
    "Outcome_2",
    "Begin_2",
    "Outcome_Note_2",
    "Event_Type_3",
    "Outcome_3",
    "Begin_3",
    "Outcome_Note_3",
    "This field will not be ingested into ArchivesSpace, this information is only shared with the Digital Accessioning Service",
];

/// Columns appended to the output sheet
pub const OUTPUT_EXTRA_COLUMNS: [&str; 4] = [
    "New_Component_URI",
    "Event_URI_1",
    "Event_URI_2",
    "Event_URI_3",
];

/// One event group of a row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSlot {
    pub event_type: String,
    pub outcome: String,
    pub begin: String,
    pub outcome_note: String,
}

impl EventSlot {
    pub fn is_present(&self) -> bool {
        !self.event_type.trim().is_empty()
    }
}

/// A single accession row, plus the fields derived while processing it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessionRow {
    pub repository_name: String,
    pub security_tag: String,
    pub parent_record: String,
    pub title: String,
    pub component_id: String,
    pub extent_type: String,
    pub number_of_bytes: String,
    pub container_summary: String,
    /// Container indicator on input; replaced by the resolved container URI
    pub top_container: String,
    pub collection_name: String,
    pub events: [EventSlot; EVENT_SLOTS],
    pub das_note: String,

    pub new_component_uri: Option<String>,
    pub event_uris: [Option<String>; EVENT_SLOTS],
}

impl AccessionRow {
    /// Build a row from a raw record; missing trailing cells read as empty
    pub fn from_record(record: &StringRecord) -> Self {
        let cell = |i: usize| record.get(i).unwrap_or("").to_string();
        let slot = |base: usize| EventSlot {
            event_type: cell(base),
            outcome: cell(base + 1),
            begin: cell(base + 2),
            outcome_note: cell(base + 3),
        };

        Self {
            repository_name: cell(0),
            security_tag: cell(1),
            parent_record: cell(2),
            title: cell(3),
            component_id: cell(4),
            extent_type: cell(5),
            number_of_bytes: cell(6),
            container_summary: cell(7),
            top_container: cell(8),
            collection_name: cell(9),
            events: [slot(10), slot(14), slot(18)],
            das_note: cell(22),
            new_component_uri: None,
            event_uris: Default::default(),
        }
    }

    /// Output cells: input columns followed by the derived URIs
    pub fn to_output_record(&self) -> Vec<String> {
        let mut cells = vec![
            self.repository_name.clone(),
            self.security_tag.clone(),
            self.parent_record.clone(),
            self.title.clone(),
            self.component_id.clone(),
            self.extent_type.clone(),
            self.number_of_bytes.clone(),
            self.container_summary.clone(),
            self.top_container.clone(),
            self.collection_name.clone(),
        ];
        for slot in &self.events {
            cells.push(slot.event_type.clone());
            cells.push(slot.outcome.clone());
            cells.push(slot.begin.clone());
            cells.push(slot.outcome_note.clone());
        }
        cells.push(self.das_note.clone());
        cells.push(self.new_component_uri.clone().unwrap_or_default());
        for uri in &self.event_uris {
            cells.push(uri.clone().unwrap_or_default());
        }
        cells
    }

    pub fn has_container(&self) -> bool {
        !self.top_container.trim().is_empty()
    }
}

/// Read every data row of an input sheet, skipping the header rows
pub fn read_rows(path: &Path) -> Result<Vec<AccessionRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if index < HEADER_ROW_COUNT {
            continue;
        }
        rows.push(AccessionRow::from_record(&record));
    }
    Ok(rows)
}

/// Output sheet writer; every row is flushed as soon as it is written
pub struct OutputWriter {
    writer: Writer<File>,
}

impl OutputWriter {
    /// Create (or truncate) the output file and write its header row
    pub fn create(path: &Path) -> Result<Self> {
        let mut writer = Writer::from_path(path)?;
        let header: Vec<&str> = INPUT_COLUMNS
            .iter()
            .chain(OUTPUT_EXTRA_COLUMNS.iter())
            .copied()
            .collect();
        writer.write_record(&header)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn write_row(&mut self, row: &AccessionRow) -> Result<()> {
        self.writer.write_record(row.to_output_record())?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_record() -> StringRecord {
        let mut cells = vec![""; INPUT_COLUMNS.len()];
        cells[0] = "mssa";
        cells[2] = "https://aspace.example.edu/repositories/12/resources/77#tree::archival_object_123";
        cells[3] = "Floppy disk 1";
        cells[8] = "Box 2";
        cells[14] = "virus check";
        cells[16] = "03/04/2024";
        StringRecord::from(cells)
    }

    #[test]
    fn test_from_record_maps_columns() {
        let row = AccessionRow::from_record(&sample_record());
        assert_eq!(row.repository_name, "mssa");
        assert_eq!(row.title, "Floppy disk 1");
        assert_eq!(row.top_container, "Box 2");
        assert!(!row.events[0].is_present());
        assert_eq!(row.events[1].event_type, "virus check");
        assert_eq!(row.events[1].begin, "03/04/2024");
    }

    #[test]
    fn test_short_record_reads_missing_cells_as_empty() {
        let row = AccessionRow::from_record(&StringRecord::from(vec!["mssa", "", "ref_5"]));
        assert_eq!(row.parent_record, "ref_5");
        assert_eq!(row.das_note, "");
        assert!(!row.has_container());
    }

    #[test]
    fn test_output_record_appends_uris() {
        let mut row = AccessionRow::from_record(&sample_record());
        row.new_component_uri = Some("/repositories/12/archival_objects/900".to_string());
        row.event_uris[1] = Some("/repositories/12/events/4".to_string());

        let cells = row.to_output_record();
        assert_eq!(cells.len(), INPUT_COLUMNS.len() + OUTPUT_EXTRA_COLUMNS.len());
        assert_eq!(cells[23], "/repositories/12/archival_objects/900");
        assert_eq!(cells[24], "");
        assert_eq!(cells[25], "/repositories/12/events/4");
    }

    #[test]
    fn test_read_rows_skips_two_headers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Repository Name,Security Tag,Parent Record").unwrap();
        writeln!(file, "required,optional,required").unwrap();
        writeln!(file, "mssa,,ref_1").unwrap();
        writeln!(file, "mssa,,ref_2").unwrap();

        let rows = read_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].parent_record, "ref_1");
        assert_eq!(rows[1].parent_record, "ref_2");
    }

    #[test]
    fn test_output_writer_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        {
            let mut writer = OutputWriter::create(&path).unwrap();
            writer.write_row(&AccessionRow::default()).unwrap();
        }

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "Repository Name");
        assert_eq!(&headers[23], "New_Component_URI");
        assert_eq!(reader.records().count(), 1);
    }
}
