use crate::error::SheetError;
use crate::helpers::xml::Flow;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlVisitor;
use crate::spreadsheet::config::SheetSelector;
use glob::Pattern;
use quick_xml::events::Event;
use std::io::BufRead;

// XML tag names, matched by local name
const TAG_SHEETS: &[u8] = b"sheets"; // Worksheet list
const TAG_SHEET: &[u8] = b"sheet"; // Worksheet declaration

/// Sheet declared in the workbook manifest
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetDescriptor {
    name: String,
    relationship_id: String,
    order: usize,
    hidden: bool,
}

impl SheetDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the workbook relationship pointing at the sheet data
    pub fn relationship_id(&self) -> &str {
        &self.relationship_id
    }

    /// 1-based declaration order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Hidden or very hidden sheets
    pub fn hidden(&self) -> bool {
        self.hidden
    }
}

#[derive(Default)]
struct WorkbookVisitor {
    sheets: Vec<SheetDescriptor>,
}

impl XmlVisitor for WorkbookVisitor {
    fn visit(&mut self, event: &Event<'_>) -> Result<Flow, SheetError> {
        match event {
            Event::Start(event) if event.local_name().as_ref() == TAG_SHEET => {
                let name = event.get_local_attribute_value(b"name")?;
                let id = event.get_local_attribute_value(b"id")?;
                if let Some((name, id)) = name.zip(id) {
                    let hidden = event
                        .get_local_attribute_value(b"state")?
                        .map(|state| state != "visible")
                        .unwrap_or(false);
                    self.sheets.push(SheetDescriptor {
                        name: name.into_owned(),
                        relationship_id: id.into_owned(),
                        order: self.sheets.len() + 1,
                        hidden,
                    });
                } else {
                    log::debug!("Skip sheet declaration without name or relationship id");
                }
            }
            // Defined names, calculation properties and the rest are not needed
            Event::End(event) if event.local_name().as_ref() == TAG_SHEETS => return Ok(Flow::Stop),
            _ => (),
        }
        Ok(Flow::Continue)
    }
}

/// Reads the declared sheets in declaration order; a workbook without sheets is not importable
pub(crate) fn parse<R: BufRead>(reader: &mut XmlReader<R>) -> Result<Vec<SheetDescriptor>, SheetError> {
    let mut visitor = WorkbookVisitor::default();
    reader.drive(&mut visitor)?;
    if visitor.sheets.is_empty() {
        Err(SheetError::UnsupportedFormat("Workbook declares no sheets".to_owned()))?
    }
    log::debug!("Workbook declares {} sheets", visitor.sheets.len());
    Ok(visitor.sheets)
}

/// Picks the sheet to import.
/// Names match exactly first, then as glob patterns; indices are 1-based; no selector means the first sheet.
pub(crate) fn select<'a>(
    sheets: &'a [SheetDescriptor],
    selector: Option<&SheetSelector>,
) -> Result<&'a SheetDescriptor, SheetError> {
    let selected = match selector {
        None => sheets.first(),
        Some(SheetSelector::Index(index)) => index.checked_sub(1).and_then(|position| sheets.get(position)),
        Some(SheetSelector::Name(name)) => sheets
            .iter()
            .find(|sheet| sheet.name == *name)
            .or_else(|| {
                let pattern = Pattern::new(name).ok()?;
                sheets.iter().find(|sheet| pattern.matches(&sheet.name))
            }),
    };
    selected.ok_or_else(|| {
        let names: Vec<&str> = sheets.iter().map(SheetDescriptor::name).collect();
        let requested = selector.map(ToString::to_string).unwrap_or_default();
        SheetError::UnsupportedFormat(format!("No sheet matches {requested}, available: {names:?}"))
    })
}
