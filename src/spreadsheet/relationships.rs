//! Package relationships: the indirection between ids used inside a part and archive part paths

use crate::error::SheetError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::match_xml_events;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::BufRead;

/// XML tag name for relationship elements
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Package-level relationships part
pub(crate) const ROOT_RELATIONSHIPS: &str = "_rels/.rels";
/// Workbook manifest location when the package declares none
pub(crate) const DEFAULT_WORKBOOK: &str = "xl/workbook.xml";
/// Shared string table location when the workbook declares none
pub(crate) const DEFAULT_SHARED_STRINGS: &str = "xl/sharedStrings.xml";

pub(crate) const KIND_OFFICE_DOCUMENT: &str = "/officeDocument";
pub(crate) const KIND_SHARED_STRINGS: &str = "/sharedStrings";
pub(crate) const KIND_WORKSHEET: &str = "/worksheet";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Relationship {
    /// Relationship type URI
    pub(crate) kind: String,
    /// Archive part path, already resolved against the source part
    pub(crate) target: String,
}

/// Relationship id to target part, built once per relationships part
#[derive(Debug, Default)]
pub(crate) struct RelationshipMap {
    relationships: HashMap<String, Relationship>,
}

impl RelationshipMap {
    /// Parses a relationships part whose targets are relative to `base_dir`.
    /// External targets (hyperlinks and the like) are not parts and are left out.
    pub(crate) fn parse<R: BufRead>(reader: &mut XmlReader<R>, base_dir: &str) -> Result<RelationshipMap, SheetError> {
        let mut relationships = HashMap::new();
        match_xml_events!(reader => {
            Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
                let is_external = event
                    .get_attribute_value("TargetMode")?
                    .map(|mode| mode.eq_ignore_ascii_case("External"))
                    .unwrap_or(false);
                let id = event.get_attribute_value("Id")?;
                let target = event.get_attribute_value("Target")?;
                if let Some((id, target)) = id.zip(target).filter(|_| !is_external) {
                    let kind = event.get_attribute_value("Type")?.unwrap_or_default();
                    relationships.insert(id.into_owned(), Relationship {
                        kind: kind.into_owned(),
                        target: to_zip_path(base_dir, &target),
                    });
                }
            }
        });
        Ok(RelationshipMap { relationships })
    }

    /// Looks up the part a relationship id points to
    pub(crate) fn resolve(&self, id: &str) -> Result<&Relationship, SheetError> {
        self.relationships
            .get(id)
            .ok_or_else(|| SheetError::MissingPart(format!("Relationship '{id}' is not declared")))
    }

    /// Finds the first relationship (by id) whose type URI ends with `suffix`
    pub(crate) fn find_by_kind(&self, suffix: &str) -> Option<&Relationship> {
        self.relationships
            .iter()
            .filter(|(_, relationship)| relationship.kind.ends_with(suffix))
            .min_by(|(left, _), (right, _)| left.cmp(right))
            .map(|(_, relationship)| relationship)
    }

    pub(crate) fn len(&self) -> usize {
        self.relationships.len()
    }
}

/// Relationships part describing `part` ("xl/workbook.xml" → "xl/_rels/workbook.xml.rels")
pub(crate) fn relationships_path(part: &str) -> String {
    let (dir, file) = split_path(part);
    if dir.is_empty() {
        format!("_rels/{file}.rels")
    } else {
        format!("{dir}/_rels/{file}.rels")
    }
}

/// Directory holding `part`, empty at the archive root
pub(crate) fn parent_dir(part: &str) -> &str {
    split_path(part).0
}

fn split_path(part: &str) -> (&str, &str) {
    part.rsplit_once('/').unwrap_or(("", part))
}

/// Resolves a relationship target against the directory of its source part.
/// Absolute targets start at the archive root; `.` and `..` segments are folded.
pub(crate) fn to_zip_path(base_dir: &str, target: &str) -> String {
    let target = target.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_owned(),
        None if base_dir.is_empty() => target.to_owned(),
        None => format!("{base_dir}/{target}"),
    };
    for segment in joined.split('/') {
        match segment {
            "" | "." => (),
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments.join("/")
}
