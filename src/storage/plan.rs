//! Plan records on the wire.
//!
//! A plan/session line is `encodeItem(timetableBlob)` followed by
//! `encodeList(exemptedCodes)`, where the timetable blob is the
//! concatenation of `encodeList([code, year, term])` for every placed module
//! in year-major, term-minor order. Years and terms are 1-based on the wire
//! and converted to the 0-based in-memory [`Slot`] here, at this boundary
//! only.

use crate::{
    domain::{Catalog, InvalidCodeError, ModuleCode, PlanConfig, PlanError, SchedulePlan, Slot},
    storage::codec::{self, CodecError},
};

/// Structural corruption of a plan line: the whole record is unusable.
#[derive(Debug, thiserror::Error)]
pub enum PlanRecordError {
    /// A framing violation anywhere in the line.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The line does not split into a timetable part and an exemption part.
    #[error("expected timetable and exemption parts, found {0} items")]
    PartCount(usize),
}

/// A problem localized to one stored timetable entry or exemption.
///
/// The entry is skipped; the rest of the plan still loads.
#[derive(Debug, thiserror::Error)]
enum StoredEntryError {
    #[error("expected [code, year, term], found {0} fields")]
    FieldCount(usize),

    #[error(transparent)]
    Code(#[from] InvalidCodeError),

    #[error("index field {0:?} is not a positive integer")]
    Index(String),

    #[error("module {0} is not in the catalog")]
    UnknownModule(ModuleCode),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Result of loading a plan: the plan plus a count of skipped entries.
#[derive(Debug)]
pub struct PlanLoad {
    /// The reconstructed plan.
    pub plan: SchedulePlan,
    /// Stored entries skipped because they no longer fit (unknown code,
    /// out-of-bounds slot, failed prerequisite) or were locally corrupt.
    pub skipped: usize,
    /// `true` when structural corruption forced a reset to an empty plan.
    pub reset: bool,
}

/// Encodes the whole plan and exemption list as one wire line.
#[must_use]
pub fn encode_plan(plan: &SchedulePlan) -> String {
    let mut blob = String::new();
    for (entry, slot) in plan.placed_with_slots() {
        let year = (slot.year + 1).to_string();
        let term = (slot.term + 1).to_string();
        blob.push_str(&codec::encode_list([
            entry.code().as_str(),
            year.as_str(),
            term.as_str(),
        ]));
    }

    let mut line = codec::encode_item(&blob);
    line.push_str(&codec::encode_list(
        plan.exempted().iter().map(ModuleCode::as_str),
    ));
    line
}

/// Decodes a plan line, re-placing each stored module through
/// [`SchedulePlan::place_module`].
///
/// Stored entries are applied in their stored (year-major) order, so a plan
/// that satisfied the grid invariants when saved satisfies them again after
/// loading. Entries that no longer fit — the catalog changed, a slot is out
/// of bounds, a prerequisite disappeared — are skipped with a warning rather
/// than failing the load.
///
/// # Errors
///
/// Returns [`PlanRecordError`] on structural corruption (framing violations,
/// wrong part count); the caller is expected to fall back to an empty plan.
pub fn decode_plan(
    line: &str,
    catalog: &Catalog,
    config: &PlanConfig,
) -> Result<PlanLoad, PlanRecordError> {
    let parts = codec::decode_item(line)?;
    let [timetable_blob, exemption_blob]: [String; 2] = parts
        .try_into()
        .map_err(|parts: Vec<String>| PlanRecordError::PartCount(parts.len()))?;

    let mut plan = SchedulePlan::new(config);
    let mut skipped = 0;

    for raw in codec::decode_item(&exemption_blob)? {
        let applied = ModuleCode::new(&raw)
            .map_err(StoredEntryError::from)
            .and_then(|code| plan.exempt(code).map_err(StoredEntryError::from));
        if let Err(err) = applied {
            tracing::warn!(%err, "skipping stored exemption");
            skipped += 1;
        }
    }

    for entry_blob in codec::decode_item(&timetable_blob)? {
        let fields = codec::decode_item(&entry_blob)?;
        if let Err(err) = place_stored(&mut plan, catalog, fields) {
            tracing::warn!(%err, "skipping stored timetable entry");
            skipped += 1;
        }
    }

    Ok(PlanLoad {
        plan,
        skipped,
        reset: false,
    })
}

fn place_stored(
    plan: &mut SchedulePlan,
    catalog: &Catalog,
    fields: Vec<String>,
) -> Result<(), StoredEntryError> {
    let [code, year, term]: [String; 3] = fields
        .try_into()
        .map_err(|fields: Vec<String>| StoredEntryError::FieldCount(fields.len()))?;

    let code = ModuleCode::new(&code)?;
    let year = parse_one_based(&year)?;
    let term = parse_one_based(&term)?;

    let entry = catalog
        .get(&code)
        .ok_or(StoredEntryError::UnknownModule(code))?;
    plan.place_module(entry, Slot::new(year, term))?;
    Ok(())
}

/// Parses a 1-based wire index into a 0-based slot index.
fn parse_one_based(raw: &str) -> Result<usize, StoredEntryError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .and_then(|index| index.checked_sub(1))
        .ok_or_else(|| StoredEntryError::Index(raw.to_string()))
}
