//! Catalog records on the wire.
//!
//! A catalog line is `encodeList([code, name, credits, category, prereqs])`
//! where the prerequisite field is itself a double-wrapped list: one encoded
//! list per option, wrapped once more for the whole option list.

use crate::{
    domain::{
        Catalog, InvalidCodeError, InvalidCreditsError, InvalidTokenError, ModuleCatalogEntry,
        ModuleCode, PrerequisiteSet,
    },
    storage::codec::{self, CodecError},
};

/// Number of fields in a catalog record.
const FIELD_COUNT: usize = 5;

/// A problem localized to a single catalog record.
///
/// The record is skipped and the rest of the file still loads; contrast with
/// [`CodecError`] on the outer wrapper, which aborts the whole load.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The record does not have exactly five fields.
    #[error("expected {FIELD_COUNT} fields, found {0}")]
    FieldCount(usize),

    /// The code field is not a valid module code.
    #[error(transparent)]
    Code(#[from] InvalidCodeError),

    /// The credits field is not an integer.
    #[error("credits field {0:?} is not an integer")]
    Credits(String),

    /// The credits field is out of range.
    #[error(transparent)]
    CreditsRange(#[from] InvalidCreditsError),

    /// A prerequisite token is empty.
    #[error(transparent)]
    Token(#[from] InvalidTokenError),

    /// The prerequisite blob is itself malformed.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Result of loading a catalog: the entries plus a count of skipped records.
#[derive(Debug)]
pub struct CatalogLoad {
    /// The loaded catalog.
    pub catalog: Catalog,
    /// Records skipped because of localized corruption.
    pub skipped: usize,
}

/// Encodes one catalog entry as a wire line.
#[must_use]
pub fn encode_entry(entry: &ModuleCatalogEntry) -> String {
    let prereq_blob = encode_prerequisites(entry.prerequisites());
    let credits = entry.credits().to_string();
    codec::encode_list([
        entry.code().as_str(),
        entry.name(),
        credits.as_str(),
        entry.category(),
        prereq_blob.as_str(),
    ])
}

fn encode_prerequisites(set: &PrerequisiteSet) -> String {
    codec::encode_list(
        set.options()
            .iter()
            .map(|option| codec::encode_list(option.iter().map(non_empty_string::NonEmptyString::as_str))),
    )
}

/// Decodes one catalog line.
///
/// # Errors
///
/// Returns [`CodecError`] (via [`RecordError::Codec`]) on framing violations
/// and the other [`RecordError`] variants on field-level problems.
pub fn decode_entry(line: &str) -> Result<ModuleCatalogEntry, RecordError> {
    entry_from_fields(codec::decode_list(line)?)
}

fn entry_from_fields(fields: Vec<String>) -> Result<ModuleCatalogEntry, RecordError> {
    let [code, name, credits, category, prereq_blob]: [String; FIELD_COUNT] = fields
        .try_into()
        .map_err(|fields: Vec<String>| RecordError::FieldCount(fields.len()))?;

    let code = ModuleCode::new(&code)?;
    let credits: u32 = credits
        .trim()
        .parse()
        .map_err(|_| RecordError::Credits(credits))?;
    let prerequisites = decode_prerequisites(&prereq_blob)?;

    // Preclusions are not persisted; they come from the metadata fetch.
    let entry = ModuleCatalogEntry::new(code, name, credits, category, Vec::new(), prerequisites)?;
    Ok(entry)
}

fn decode_prerequisites(blob: &str) -> Result<PrerequisiteSet, RecordError> {
    let options = codec::decode_list(blob)?
        .iter()
        .map(|option| codec::decode_list(option))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PrerequisiteSet::new(options)?)
}

/// Loads a catalog from stored lines.
///
/// Records with localized corruption (wrong field count, bad code or
/// credits, malformed prerequisite blob) are skipped with a warning;
/// corruption of a line's outer wrapper is structural and aborts the load.
///
/// # Errors
///
/// Returns [`CodecError`] when any line's outer wrapper fails to decode.
pub fn load_catalog<S: AsRef<str>>(lines: &[S]) -> Result<CatalogLoad, CodecError> {
    let mut catalog = Catalog::default();
    let mut skipped = 0;

    for (index, line) in lines.iter().enumerate() {
        let fields = codec::decode_list(line.as_ref())?;
        match entry_from_fields(fields) {
            Ok(entry) => {
                catalog.insert(entry);
            }
            Err(err) => {
                tracing::warn!(line = index + 1, %err, "skipping unreadable catalog record");
                skipped += 1;
            }
        }
    }

    Ok(CatalogLoad { catalog, skipped })
}

/// Encodes a whole catalog, one line per entry in code order.
#[must_use]
pub fn encode_catalog(catalog: &Catalog) -> Vec<String> {
    catalog.iter().map(encode_entry).collect()
}
