use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::api::Catalog;
use crate::entities::{CommunityDraft, PropertyDraft};
use crate::error::{Error, Result};

/// Partial-success report for one bulk import submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    /// Number of rows persisted; always equals `created.len()`.
    pub imported: usize,
    pub created: Vec<CreatedRecord>,
    /// One message per failed row, in file order. `None` means no row
    /// failed, which is distinct from "the file had no rows".
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedRecord {
    pub id: i64,
    pub label: String,
}

/// Imports one community per spreadsheet row.
///
/// A structurally unreadable workbook fails fast with [`Error::MalformedFile`].
/// Row-level failures are collected into the outcome and never abort the rest
/// of the batch; only [`Error::AuthExpired`] does, since the session is gone.
pub async fn import_communities<C: Catalog>(catalog: &C, bytes: &[u8]) -> Result<ImportOutcome> {
    let rows = data_rows(bytes)?;
    let mut created = Vec::new();
    let mut errors = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let row_no = idx + 2; // 1-based, after the header row
        if cell_text(row, 0).is_none() {
            continue; // blank row
        }
        let draft = community_from_row(row);
        if let Err(err) = draft.validate() {
            errors.push(format!("row {row_no}: {err}"));
            continue;
        }
        match catalog.create_community(&draft).await {
            Ok(community) => created.push(CreatedRecord {
                id: community.id,
                label: community.name.clone(),
            }),
            Err(Error::AuthExpired) => return Err(Error::AuthExpired),
            Err(err) => errors.push(format!("row {row_no}: {err}")),
        }
    }

    info!("imported {} communities, {} rows failed", created.len(), errors.len());
    Ok(outcome(created, errors))
}

/// Imports one property listing per spreadsheet row.
///
/// Rows name their community; the name is resolved against the catalog before
/// anything else, so a listing can never be attached to a community that does
/// not exist yet.
pub async fn import_properties<C: Catalog>(catalog: &C, bytes: &[u8]) -> Result<ImportOutcome> {
    let rows = data_rows(bytes)?;
    let communities: HashMap<String, i64> = catalog
        .list_communities()
        .await?
        .into_iter()
        .map(|c| (c.name, c.id))
        .collect();

    let mut created = Vec::new();
    let mut errors = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let row_no = idx + 2;
        if cell_text(row, 0).is_none() {
            continue;
        }
        let draft = match property_from_row(row, &communities) {
            Ok(draft) => draft,
            Err(err) => {
                errors.push(format!("row {row_no}: {err}"));
                continue;
            }
        };
        if let Err(err) = draft.validate() {
            errors.push(format!("row {row_no}: {err}"));
            continue;
        }
        match catalog.create_property(&draft).await {
            Ok(property) => created.push(CreatedRecord {
                id: property.id,
                label: format!(
                    "area {} / price {}",
                    property.area.unwrap_or_default(),
                    property.price.unwrap_or_default()
                ),
            }),
            Err(Error::AuthExpired) => return Err(Error::AuthExpired),
            Err(err) => errors.push(format!("row {row_no}: {err}")),
        }
    }

    info!("imported {} properties, {} rows failed", created.len(), errors.len());
    Ok(outcome(created, errors))
}

fn outcome(created: Vec<CreatedRecord>, errors: Vec<String>) -> ImportOutcome {
    ImportOutcome {
        imported: created.len(),
        created,
        errors: if errors.is_empty() { None } else { Some(errors) },
    }
}

/// First sheet, header row skipped. Any structural problem is a single
/// top-level `MalformedFile`; there is no per-row report for those.
fn data_rows(bytes: &[u8]) -> Result<Vec<Vec<Data>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|err| Error::MalformedFile(err.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::MalformedFile("workbook has no sheets".to_string()))?
        .map_err(|err| Error::MalformedFile(err.to_string()))?;
    Ok(range.rows().skip(1).map(<[Data]>::to_vec).collect())
}

// Columns are mapped by position, mirroring the import templates; header
// text is ignored.

fn community_from_row(row: &[Data]) -> CommunityDraft {
    CommunityDraft {
        name: cell_text(row, 0).unwrap_or_default(),
        district: cell_text(row, 1).unwrap_or_default(),
        address: cell_text(row, 2),
        property_fee: cell_text(row, 3),
        parking: cell_text(row, 4),
        build_year: cell_int(row, 5),
        metro: cell_text(row, 6),
        primary_school: cell_text(row, 7),
        middle_school: cell_text(row, 8),
        environment_score: cell_int(row, 9),
        notes: cell_text(row, 10),
        ..Default::default()
    }
}

fn property_from_row(row: &[Data], communities: &HashMap<String, i64>) -> Result<PropertyDraft> {
    let community_name = cell_text(row, 0).unwrap_or_default();
    let community_id = *communities.get(&community_name).ok_or_else(|| {
        Error::validation(format!("community '{community_name}' does not exist, create it first"))
    })?;
    Ok(PropertyDraft {
        community_id,
        building: cell_text(row, 1),
        unit: cell_text(row, 2),
        room: cell_text(row, 3),
        area: cell_number(row, 4, "area")?,
        layout: cell_text(row, 5),
        floor: cell_text(row, 6),
        orientation: cell_text(row, 7),
        decoration: cell_text(row, 8),
        price: cell_number(row, 9, "price")?,
        rent: cell_number(row, 10, "rent")?,
        expected_price: cell_number(row, 11, "expected price")?,
        visit_date: cell_date(row, 12),
        notes: cell_text(row, 13),
        ..Default::default()
    })
}

fn cell(row: &[Data], idx: usize) -> Option<&Data> {
    match row.get(idx) {
        None | Some(Data::Empty) => None,
        Some(Data::String(s)) if s.trim().is_empty() => None,
        Some(data) => Some(data),
    }
}

fn cell_text(row: &[Data], idx: usize) -> Option<String> {
    let value = match cell(row, idx)? {
        Data::String(s) => s.trim().to_string(),
        // whole floats come back from spreadsheets for plain numbers
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    };
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Lenient integer read: anything that is not a whole number is treated as
/// absent, matching how optional numeric columns behave in the templates.
fn cell_int(row: &[Data], idx: usize) -> Option<i32> {
    match cell(row, idx)? {
        Data::Int(i) => Some(*i as i32),
        Data::Float(f) if f.fract() == 0.0 => Some(*f as i32),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Strict numeric read: a present but non-numeric cell is a row error, not a
/// silently dropped value.
fn cell_number(row: &[Data], idx: usize, field: &str) -> Result<Option<f64>> {
    match cell(row, idx) {
        None => Ok(None),
        Some(Data::Int(i)) => Ok(Some(*i as f64)),
        Some(Data::Float(f)) => Ok(Some(*f)),
        Some(Data::String(s)) => s.trim().parse().map(Some).map_err(|_| {
            Error::validation(format!("{field} is not a number: '{}'", s.trim()))
        }),
        Some(other) => Err(Error::validation(format!("{field} is not a number: '{other}'"))),
    }
}

/// Accepts native spreadsheet dates as well as `YYYY-MM-DD` text. Anything
/// unparseable reads as absent.
fn cell_date(row: &[Data], idx: usize) -> Option<NaiveDateTime> {
    match cell(row, idx)? {
        Data::DateTime(dt) => dt.as_datetime(),
        Data::DateTimeIso(s) => parse_date_text(s),
        Data::String(s) => parse_date_text(s),
        _ => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").ok()
}
