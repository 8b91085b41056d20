//! Activity diagram extractor
//!
//! Reads ordered steps from `pasos: a, b y c`, numbered lines, or
//! "primero X, luego Y, finalmente Z" prose. Every step becomes one
//! action, in the order it was written.

use tracing::debug;

use crate::core::{DiagramType, Element, ElementKind, Extraction, Extractor, RequestContext};
use crate::plugins::phrases::{clean_phrase, pattern, slug, split_list};

pattern!(
    STEP_LIST,
    r"(?i)\b(?:pasos|steps|acciones|actions|flujo|flow)\s*:\s*([^.\n]+)"
);
pattern!(NUMBERED, r"(?m)^\s*\d+\s*[.)-]\s*(.+?)\s*$");
pattern!(
    SEQUENCE_WORD,
    r"(?i)\b(?:primero|luego|después|despues|entonces|finalmente|first|then|next|afterwards|finally)\b"
);
pattern!(
    SEQUENCE_SPLIT,
    r"(?i)\s*(?:[,;.\n]|\b(?:(?:y|and)\s+)?(?:primero|luego|después|despues|entonces|finalmente|first|then|next|afterwards|finally)\b)\s*"
);

/// Heuristic extractor for activity diagrams
pub struct ActivityExtractor;

impl ActivityExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ActivityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn steps(text: &str) -> Vec<(usize, String)> {
    let mut found = Vec::new();
    for caps in STEP_LIST.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            for (i, item) in split_list(m.as_str()).into_iter().enumerate() {
                found.push((m.start() + i, item));
            }
        }
    }
    if found.is_empty() {
        for caps in NUMBERED.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                found.push((m.start(), m.as_str().to_string()));
            }
        }
    }
    if found.is_empty() {
        if let Some(first) = SEQUENCE_WORD.find(text) {
            let tail = &text[first.start()..];
            for (i, piece) in SEQUENCE_SPLIT.split(tail).enumerate() {
                if !piece.trim().is_empty() {
                    found.push((first.start() + i, piece.to_string()));
                }
            }
        }
    }
    found.sort_by_key(|(pos, _)| *pos);
    found
}

impl Extractor for ActivityExtractor {
    fn extract(&self, text: &str, _context: &RequestContext) -> Extraction {
        let mut extraction = Extraction::new();
        for (_, step) in steps(text) {
            let name = clean_phrase(&step);
            let id = slug(name);
            if id.is_empty() {
                continue;
            }
            extraction.ensure(Element::new(id, ElementKind::Action, name));
        }
        debug!(actions = extraction.elements.len(), "Extracted activity steps");
        extraction
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Activity
    }

    fn name(&self) -> &'static str {
        "activity-heuristic"
    }
}
