use std::collections::HashSet;

use uuid::Uuid;

const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];
const CANONICAL_LEN: usize = 36;

/// True iff `id` is a UUID in canonical 8-4-4-4-12 form (hex digits in either case).
pub fn is_valid(id: &str) -> bool {
    let bytes = id.as_bytes();
    if bytes.len() != CANONICAL_LEN {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| {
        if HYPHEN_POSITIONS.contains(&i) {
            *b == b'-'
        } else {
            b.is_ascii_hexdigit()
        }
    })
}

/// Parse a canonical identifier. Spellings `uuid` would otherwise accept
/// (braced, urn, unhyphenated) are rejected.
pub fn parse(id: &str) -> Option<Uuid> {
    if !is_valid(id) {
        return None;
    }
    Uuid::parse_str(id).ok()
}

/// Split raw identifiers into distinct valid keys and distinct malformed strings,
/// each in first-seen order.
pub fn partition(ids: &[String]) -> (Vec<Uuid>, Vec<String>) {
    let mut valid: Vec<Uuid> = Vec::new();
    let mut malformed: Vec<String> = Vec::new();
    let mut seen_valid: HashSet<Uuid> = HashSet::new();
    let mut seen_malformed: HashSet<&str> = HashSet::new();

    for raw in ids {
        match parse(raw) {
            Some(id) => {
                if seen_valid.insert(id) {
                    valid.push(id);
                }
            }
            None => {
                if seen_malformed.insert(raw.as_str()) {
                    malformed.push(raw.clone());
                }
            }
        }
    }

    (valid, malformed)
}
