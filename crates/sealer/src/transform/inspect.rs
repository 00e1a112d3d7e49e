//! Key-free survey of a document's target locations.

use common::{DocumentState, SchemaWarning};
use serde_json::Value;

use super::metadata;
use crate::crypto::{self, TokenShape};
use crate::schema;

/// Counts of target values by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    /// Number of selected target locations.
    pub locations: usize,
    /// Locations holding a structurally valid token.
    pub tokens: usize,
    /// Locations holding plaintext.
    pub plaintext: usize,
    /// Locations carrying the marker with an unparsable payload.
    pub malformed: usize,
    /// Summary of the counts above.
    pub state: DocumentState,
    /// Fingerprint of the sealing key, if the document records one.
    pub key_fingerprint: Option<String>,
    /// Shape problems found while selecting locations.
    pub warnings: Vec<SchemaWarning>,
}

/// Classify every target location of `document` without decrypting anything.
pub fn inspect(document: &Value) -> Inspection {
    let selection = schema::select(document);

    let (mut tokens, mut plaintext, mut malformed) = (0, 0, 0);
    for value in selection.locations.iter().filter_map(|l| l.value(document)) {
        match crypto::classify(value) {
            TokenShape::Token => tokens += 1,
            TokenShape::Plain => plaintext += 1,
            TokenShape::Malformed => malformed += 1,
        }
    }

    let locations = selection.locations.len();
    let state = if locations == 0 {
        DocumentState::Empty
    } else if tokens == locations {
        DocumentState::Sealed
    } else if plaintext == locations {
        DocumentState::Plaintext
    } else {
        DocumentState::Mixed
    };

    Inspection {
        locations,
        tokens,
        plaintext,
        malformed,
        state,
        key_fingerprint: metadata::read_info(document).map(|i| i.key_fingerprint),
        warnings: selection.warnings,
    }
}
