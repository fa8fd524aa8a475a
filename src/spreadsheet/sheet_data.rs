//! Streaming parser for a worksheet part.
//! Rows and cells are taken in document order; declared references win over sequential positions.
//! Logical row indices come from the declared row numbers, so rows stored out of order keep their place.

use crate::database::column::ColumnType;
use crate::database::range::Range;
use crate::database::table::TabularDatabase;
use crate::error::SheetError;
use crate::helpers::string::find_incompatible_char;
use crate::helpers::xml::Flow;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::xml::XmlVisitor;
use crate::spreadsheet::cell::resolve_value;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::config::ImportConfig;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_col;
use crate::spreadsheet::shared_strings::RichText;
use crate::spreadsheet::shared_strings::SharedStringTable;
use crate::warning::ImportWarning;
use crate::warning::WarningKind;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use std::collections::BTreeSet;
use std::io::BufRead;

// XML tag names, matched by local name
const TAG_SHEET_DATA: &[u8] = b"sheetData"; // Cell table of the worksheet
const TAG_ROW: &[u8] = b"row"; // Row in worksheet
const TAG_CELL: &[u8] = b"c"; // Cell in worksheet
const TAG_VALUE: &[u8] = b"v"; // Cell value, or cached formula result
const TAG_INLINE_STRING: &[u8] = b"is"; // Inline string value

// Last addressable row and column of a worksheet (XFD1048576)
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// Cell between its start and end tags
struct PendingCell {
    /// Column relative to the data range, 1-based
    col: usize,
    /// Sheet reference, for diagnostics
    reference: String,
    kind: CellType,
    raw: String,
    is_value: bool,
    /// Present while inside `<is>`
    inline: Option<RichText>,
}

/// Row inside the data range, still numbered as in the sheet
struct PendingRow {
    row: usize,
    cells: Vec<Option<String>>,
    types: Vec<Option<ColumnType>>,
    warnings: Vec<ImportWarning>,
}

impl PendingRow {
    fn new(row: usize) -> Self {
        PendingRow {
            row,
            cells: Vec::new(),
            types: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

pub(crate) struct SheetDataParser<'a> {
    config: &'a ImportConfig,
    shared_strings: &'a SharedStringTable,
    part: &'a str,
    range: Range,

    is_sheet_data: bool,
    last_row: usize,
    next_col: usize,
    /// Row currently open, None when it lies outside the range
    current: Option<PendingRow>,
    cell: Option<PendingCell>,

    /// Non-empty rows in document order
    rows: Vec<PendingRow>,
    /// Every sheet row from the first row of the range up to `prefix` has been read
    prefix: usize,
    /// Rows read past `prefix` that are not yet contiguous with it
    seen: BTreeSet<usize>,
    lowest_filled: Option<usize>,
}

impl<'a> SheetDataParser<'a> {
    pub(crate) fn new(config: &'a ImportConfig, shared_strings: &'a SharedStringTable, part: &'a str) -> Self {
        let range = config.range.unwrap_or_default();
        SheetDataParser {
            config,
            shared_strings,
            part,
            range,
            is_sheet_data: false,
            last_row: 0,
            next_col: 1,
            current: None,
            cell: None,
            rows: Vec::new(),
            prefix: range.row_lower_bound.unwrap_or(1) - 1,
            seen: BTreeSet::new(),
            lowest_filled: None,
        }
    }

    /// Sheet row mapped to logical row 0 when no header row is used
    fn fixed_base(&self) -> usize {
        self.range.row_lower_bound.unwrap_or(1) - 1
    }

    fn start_row(&mut self, event: &BytesStart<'_>) -> Result<(), SheetError> {
        let row = event
            .parse_attribute_value::<usize>("r")?
            .filter(|row| *row > 0)
            .unwrap_or(self.last_row + 1);
        if row > MAX_ROWS {
            Err(SheetError::CellReferenceError(format!(
                "Row {row} is beyond the last worksheet row {MAX_ROWS}"
            )))?
        }
        self.last_row = row;
        self.next_col = 1;
        self.current = if self.range.before_row(row) || self.range.after_row(row) {
            None
        } else {
            Some(PendingRow::new(row))
        };
        Ok(())
    }

    fn end_row(&mut self) -> Flow {
        let Some(pending) = self.current.take() else {
            return Flow::Continue;
        };
        let row = pending.row;
        if row > self.prefix {
            self.seen.insert(row);
            while self.seen.remove(&(self.prefix + 1)) {
                self.prefix += 1;
            }
        }
        if !pending.is_empty() {
            self.lowest_filled = Some(self.lowest_filled.map_or(row, |lowest| lowest.min(row)));
            self.rows.push(pending);
        }

        if self.is_window_complete() {
            log::debug!("Stop after row {row}, every row of the data window has been read");
            return Flow::Stop;
        }
        Flow::Continue
    }

    /// True once no row still to come can change the result
    fn is_window_complete(&self) -> bool {
        if let Some(upper) = self.range.row_upper_bound {
            if self.prefix >= upper {
                return true;
            }
        }
        let Some(limit) = self.config.rows_limit.filter(|_| !self.config.skip_empty_rows) else {
            return false;
        };
        let base = if self.config.header {
            // The header row is settled once every row before it is known to be empty
            match self.lowest_filled.filter(|lowest| *lowest <= self.prefix) {
                Some(header_row) => header_row,
                None => return false,
            }
        } else {
            self.fixed_base()
        };
        self.prefix >= base.saturating_add(limit)
    }

    fn start_cell(&mut self, event: &BytesStart<'_>) -> Result<(), SheetError> {
        let Some(row) = self.current.as_ref().map(|pending| pending.row) else {
            return Ok(());
        };
        let col = event
            .get_attribute_value("r")?
            .as_deref()
            .and_then(reference_to_col)
            .unwrap_or(self.next_col);
        if col > MAX_COLS {
            Err(SheetError::CellReferenceError(format!(
                "Column {col} in row {row} is beyond the last worksheet column {MAX_COLS}"
            )))?
        }
        self.next_col = col + 1;
        if !self.range.contains_col(col) {
            self.cell = None;
            return Ok(());
        }

        let kind = CellType::parse(event.get_attribute_value("t")?.as_deref());
        self.cell = Some(PendingCell {
            col: col - self.range.col_offset(),
            reference: index_to_reference(row, col),
            kind,
            raw: String::new(),
            is_value: false,
            inline: None,
        });
        Ok(())
    }

    fn end_cell(&mut self) -> Result<(), SheetError> {
        let Some(cell) = self.cell.take() else {
            return Ok(());
        };
        let Some(pending) = self.current.as_mut() else {
            return Ok(());
        };
        // A declared cell widens its row even when it holds no value
        let position = cell.col - 1;
        if pending.cells.len() <= position {
            pending.cells.resize(position + 1, None);
            pending.types.resize(position + 1, None);
        }

        let value = resolve_value(cell.kind, &cell.raw, self.shared_strings, self.config.error_as_null)?;
        let Some(value) = value else {
            return Ok(());
        };
        if self.config.flag_incompatible_content {
            if let Some(character) = find_incompatible_char(&value) {
                let kind = WarningKind::VerbatimIncompatible { character };
                pending.warnings.push(ImportWarning::new(self.part, cell.reference, kind));
            }
        }
        pending.types[position] = ColumnType::from(cell.kind, &value);
        pending.cells[position] = Some(value);
        Ok(())
    }

    /// Largest logical row kept under the row limit
    fn row_cutoff(&self, base: usize) -> usize {
        match self.config.rows_limit {
            Some(0) => 0,
            Some(limit) if self.config.skip_empty_rows => {
                let mut logical: Vec<usize> = self
                    .rows
                    .iter()
                    .filter(|pending| pending.row > base)
                    .map(|pending| pending.row - base)
                    .collect();
                logical.sort_unstable();
                logical.dedup();
                logical.get(limit - 1).copied().unwrap_or(usize::MAX)
            }
            Some(limit) => limit,
            None => usize::MAX,
        }
    }

    /// Builds the database from the collected rows
    pub(crate) fn finish(self) -> (TabularDatabase, Vec<ImportWarning>) {
        let header_row = if self.config.header { self.lowest_filled } else { None };
        let base = match header_row {
            Some(header_row) => {
                log::debug!("Use row {header_row} as header");
                header_row
            }
            // Header wanted but the range holds no values
            None if self.config.header => usize::MAX,
            None => self.fixed_base(),
        };
        let cutoff = self.row_cutoff(base);

        let mut names = Vec::new();
        let mut column_types: Vec<Option<ColumnType>> = Vec::new();
        let mut warnings = Vec::new();
        let mut kept = Vec::new();
        let stored_rows = self.rows.len();
        for pending in self.rows {
            if header_row == Some(pending.row) && names.is_empty() {
                names = pending.cells;
                warnings.extend(pending.warnings);
                continue;
            }
            if pending.row <= base {
                log::debug!("Skip row {} declared before the data start", pending.row);
                continue;
            }
            let logical_row = pending.row - base;
            if logical_row > cutoff {
                continue;
            }

            for (position, kind) in pending.types.into_iter().enumerate() {
                let Some(kind) = kind else { continue };
                if column_types.len() <= position {
                    column_types.resize(position + 1, None);
                }
                let slot = &mut column_types[position];
                *slot = Some(slot.map_or(kind, |current| current.merge(kind)));
            }
            warnings.extend(pending.warnings);
            kept.push((logical_row, pending.cells));
        }

        let width = kept
            .iter()
            .map(|(_, cells)| cells.len())
            .chain([names.len()])
            .max()
            .unwrap_or(0);
        let mut database = TabularDatabase::new();
        for col in 1..=width {
            let name = names
                .get(col - 1)
                .cloned()
                .flatten()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| format!("column{col}"));
            let kind = column_types.get(col - 1).copied().flatten();
            database.add_header(col, name, kind);
        }

        let last_logical_row = kept.iter().map(|(index, _)| *index).max().unwrap_or(0);
        for (index, mut cells) in kept {
            cells.resize(width, None);
            database.add_row(index, cells);
        }
        if self.config.skip_empty_rows {
            database.compact_rows();
        } else {
            database.fill_row_gaps(last_logical_row);
        }
        log::debug!(
            "Parsed '{}': {} columns, {} rows ({} non-empty in range)",
            self.part,
            width,
            database.row_count(),
            stored_rows
        );
        (database, warnings)
    }
}

impl XmlVisitor for SheetDataParser<'_> {
    fn visit(&mut self, event: &Event<'_>) -> Result<Flow, SheetError> {
        if !self.is_sheet_data {
            if let Event::Start(event) = event {
                self.is_sheet_data = event.local_name().as_ref() == TAG_SHEET_DATA;
            }
            return Ok(Flow::Continue);
        }

        if let Some(cell) = self.cell.as_mut() {
            if let Some(inline) = cell.inline.as_mut() {
                match event {
                    Event::End(event) if event.local_name().as_ref() == TAG_INLINE_STRING => {
                        cell.raw = inline.finish();
                        cell.inline = None;
                    }
                    event => inline.feed(event)?,
                }
                return Ok(Flow::Continue);
            }
        }

        match event {
            Event::Start(event) => match event.local_name().as_ref() {
                TAG_ROW => self.start_row(event)?,
                TAG_CELL => self.start_cell(event)?,
                TAG_VALUE => {
                    if let Some(cell) = self.cell.as_mut() {
                        cell.is_value = true;
                    }
                }
                TAG_INLINE_STRING => {
                    if let Some(cell) = self.cell.as_mut() {
                        cell.inline = Some(RichText::default());
                    }
                }
                _ => (),
            },
            Event::End(event) => match event.local_name().as_ref() {
                // Merged cells, conditional formats and the rest of the sheet are not needed
                TAG_SHEET_DATA => return Ok(Flow::Stop),
                TAG_ROW => return Ok(self.end_row()),
                TAG_CELL => self.end_cell()?,
                TAG_VALUE => {
                    if let Some(cell) = self.cell.as_mut() {
                        cell.is_value = false;
                    }
                }
                _ => (),
            },
            Event::Text(text) => {
                if let Some(cell) = self.cell.as_mut().filter(|cell| cell.is_value) {
                    cell.raw.push_bytes_text(text)?;
                }
            }
            Event::CData(text) => {
                if let Some(cell) = self.cell.as_mut().filter(|cell| cell.is_value) {
                    cell.raw.push_str(&text.xml_content()?);
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(cell) = self.cell.as_mut().filter(|cell| cell.is_value) {
                    cell.raw.push_bytes_ref(reference)?;
                }
            }
            _ => (),
        }
        Ok(Flow::Continue)
    }
}

/// Parses one worksheet part into a database plus the deferred warnings
pub(crate) fn parse<R: BufRead>(
    reader: &mut XmlReader<R>,
    config: &ImportConfig,
    shared_strings: &SharedStringTable,
    part: &str,
) -> Result<(TabularDatabase, Vec<ImportWarning>), SheetError> {
    let mut parser = SheetDataParser::new(config, shared_strings, part);
    reader.drive(&mut parser)?;
    Ok(parser.finish())
}
