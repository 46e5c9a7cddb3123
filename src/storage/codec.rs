//! The length-prefixed wire codec.
//!
//! An item is framed as `<len>#<payload>|`, where `<len>` is the decimal
//! character length of the payload. The length prefix makes payloads
//! delimiter-safe without escaping: a payload may itself contain `#`, `|` or
//! whole encoded sub-items, which is how nested lists are stored. The cost is
//! that a wrong length desynchronizes every subsequent field on the line, so
//! any framing violation is treated as corruption and fails the whole decode
//! rather than producing partial results.

/// Separates the length prefix from the payload.
pub const LENGTH_DELIMITER: char = '#';

/// Terminates an encoded item.
pub const ITEM_TERMINATOR: char = '|';

/// Malformed wire data: the decode is abandoned with no partial results.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// No `#` found between the cursor and the end of input.
    #[error("missing '{LENGTH_DELIMITER}' length delimiter at offset {0}")]
    MissingLengthDelimiter(usize),

    /// The characters before `#` do not parse as a non-negative integer.
    #[error("invalid length prefix {0:?}")]
    InvalidLengthPrefix(String),

    /// The declared payload length exceeds the remaining input.
    #[error("declared payload length {declared} exceeds the {remaining} remaining characters")]
    TruncatedPayload {
        /// The length the prefix declared.
        declared: usize,
        /// Characters actually remaining after the delimiter.
        remaining: usize,
    },

    /// The character after the payload is not the `|` terminator.
    #[error("missing '{ITEM_TERMINATOR}' terminator after payload at offset {0}")]
    MissingTerminator(usize),

    /// A list wrapper decoded to something other than a single item.
    #[error("expected a single wrapped list, found {0} items")]
    MalformedListWrapper(usize),
}

/// Encodes one string as a self-delimiting wire item.
///
/// The payload may be empty and may contain `#` or `|`; the length prefix
/// keeps it unambiguous. `encode_item("CS1010")` is `"6#CS1010|"`.
#[must_use]
pub fn encode_item(payload: &str) -> String {
    format!(
        "{}{LENGTH_DELIMITER}{payload}{ITEM_TERMINATOR}",
        payload.chars().count()
    )
}

/// Encodes a sequence of strings as one wire item.
///
/// Each item is encoded in order and the whole concatenation is wrapped in
/// one more [`encode_item`] call, so a consumer can first extract the blob as
/// a single item and then re-decode it into its members.
#[must_use]
pub fn encode_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let concatenated: String = items
        .into_iter()
        .map(|item| encode_item(item.as_ref()))
        .collect();
    encode_item(&concatenated)
}

/// Decodes a concatenation of wire items into the payload sequence.
///
/// Scans left to right: parse the length prefix up to `#`, read exactly that
/// many characters, require the `|` terminator, repeat until the input is
/// exhausted. An empty input decodes to an empty sequence.
///
/// # Errors
///
/// Returns [`CodecError`] on any framing violation; no partial sequence is
/// ever returned.
pub fn decode_item(wire: &str) -> Result<Vec<String>, CodecError> {
    let chars: Vec<char> = wire.chars().collect();
    let mut items = Vec::new();
    let mut cursor = 0;

    while cursor < chars.len() {
        let delimiter = chars[cursor..]
            .iter()
            .position(|&c| c == LENGTH_DELIMITER)
            .map(|offset| cursor + offset)
            .ok_or(CodecError::MissingLengthDelimiter(cursor))?;

        let prefix: String = chars[cursor..delimiter].iter().collect();
        let declared: usize = prefix
            .parse()
            .map_err(|_| CodecError::InvalidLengthPrefix(prefix))?;

        let start = delimiter + 1;
        let remaining = chars.len() - start;
        if declared > remaining {
            return Err(CodecError::TruncatedPayload { declared, remaining });
        }

        let end = start + declared;
        if end >= chars.len() || chars[end] != ITEM_TERMINATOR {
            return Err(CodecError::MissingTerminator(end));
        }

        items.push(chars[start..end].iter().collect());
        cursor = end + 1;
    }

    Ok(items)
}

/// Decodes the output of [`encode_list`] back into the original sequence.
///
/// # Errors
///
/// Returns [`CodecError`] if the outer wrapper or any member item is
/// malformed, or if the wrapper holds anything other than exactly one blob.
pub fn decode_list(wire: &str) -> Result<Vec<String>, CodecError> {
    let outer = decode_item(wire)?;
    let [blob] = outer.as_slice() else {
        return Err(CodecError::MalformedListWrapper(outer.len()));
    };
    decode_item(blob)
}

/// Decodes a batch of independent wire lines, fail-fast.
///
/// # Errors
///
/// Returns the first [`CodecError`] encountered; no partial batch is
/// returned.
pub fn decode_records<S: AsRef<str>>(lines: &[S]) -> Result<Vec<Vec<String>>, CodecError> {
    lines.iter().map(|line| decode_item(line.as_ref())).collect()
}
