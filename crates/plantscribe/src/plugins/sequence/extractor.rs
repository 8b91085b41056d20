//! Sequence diagram extractor
//!
//! Messages become relations in text order: `X envía Y a Z` and
//! `X sends Y to Z` are calls, `Z responde a X` and `Z replies to X`
//! are dashed returns. Participants are declared by `participantes: ...`
//! or by taking part in a message; `actor X` declares an actor.

use tracing::debug;

use crate::core::{
    DiagramType, Element, ElementKind, Extraction, Extractor, Relation, RelationKind,
    RequestContext,
};
use crate::plugins::phrases::{clean_phrase, is_stopword, pattern, split_list};

pattern!(PARTICIPANTS, r"(?i)\b(?:participantes|participants)\s*:?\s+([^.;\n]+)");
pattern!(ACTOR, r"(?i)\bactor\s+(\w+)");
pattern!(
    SEND,
    r"(?i)\b(\w+)\s+(?:envía|envia|manda|sends)\s+([^.;\n]+?)\s+(?:al|a|to)\s+(?:la\s+|el\s+|the\s+)?(\w+)"
);
pattern!(CALL, r"(?i)\b(\w+)\s+(?:llama\s+al?|calls)\s+(\w+)");
pattern!(
    REPLY,
    r"(?i)\b(\w+)\s+(?:responde|contesta|replies|responds)\s+(?:al|a|to)\s+(?:la\s+|el\s+|the\s+)?(\w+)(?:\s+(?:con|with)\s+([^.;\n]+))?"
);

/// One message in text order
struct Message {
    pos: usize,
    from: String,
    to: String,
    label: Option<String>,
    kind: RelationKind,
}

/// Heuristic extractor for sequence diagrams
pub struct SequenceExtractor;

impl SequenceExtractor {
    pub fn new() -> Self {
        Self
    }

    fn messages(&self, text: &str) -> Vec<Message> {
        let mut messages = Vec::new();

        for caps in SEND.captures_iter(text) {
            let (Some(from), Some(label), Some(to)) = (caps.get(1), caps.get(2), caps.get(3)) else {
                continue;
            };
            messages.push(Message {
                pos: from.start(),
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
                label: Some(clean_phrase(label.as_str()).to_string()),
                kind: RelationKind::Association,
            });
        }
        for caps in CALL.captures_iter(text) {
            let (Some(from), Some(to)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            messages.push(Message {
                pos: from.start(),
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
                label: None,
                kind: RelationKind::Association,
            });
        }
        for caps in REPLY.captures_iter(text) {
            let (Some(from), Some(to)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            messages.push(Message {
                pos: from.start(),
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
                label: caps
                    .get(3)
                    .map(|m| clean_phrase(m.as_str()).to_string())
                    .filter(|l| !l.is_empty()),
                kind: RelationKind::Dependency,
            });
        }

        messages.retain(|m| !is_stopword(&m.from) && !is_stopword(&m.to));
        messages.sort_by_key(|m| m.pos);
        messages
    }
}

impl Default for SequenceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First spelling wins, later mentions match case-insensitively
fn canonical(extraction: &Extraction, name: &str) -> String {
    extraction
        .elements
        .iter()
        .find(|e| e.id.to_lowercase() == name.to_lowercase())
        .map(|e| e.id.clone())
        .unwrap_or_else(|| name.to_string())
}

impl Extractor for SequenceExtractor {
    fn extract(&self, text: &str, _context: &RequestContext) -> Extraction {
        let mut extraction = Extraction::new();

        let mut declared: Vec<(usize, String, ElementKind)> = Vec::new();
        for caps in PARTICIPANTS.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                for (i, name) in split_list(m.as_str()).into_iter().enumerate() {
                    declared.push((m.start() + i, name, ElementKind::Participant));
                }
            }
        }
        for caps in ACTOR.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                declared.push((m.start(), m.as_str().to_string(), ElementKind::Actor));
            }
        }

        let messages = self.messages(text);
        for message in &messages {
            declared.push((message.pos, message.from.clone(), ElementKind::Participant));
            declared.push((message.pos + 1, message.to.clone(), ElementKind::Participant));
        }
        declared.sort_by_key(|(pos, _, _)| *pos);

        for (_, name, kind) in declared {
            if is_stopword(&name) || name.contains(char::is_whitespace) {
                continue;
            }
            let id = canonical(&extraction, &name);
            extraction.ensure(Element::new(id.clone(), kind, id));
        }

        for message in messages {
            let mut relation = Relation::new(
                canonical(&extraction, &message.from),
                canonical(&extraction, &message.to),
                message.kind,
            );
            relation.label = message.label;
            extraction.push_relation(relation);
        }

        debug!(
            participants = extraction.elements.len(),
            messages = extraction.relations.len(),
            "Extracted sequence entities"
        );
        extraction
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Sequence
    }

    fn name(&self) -> &'static str {
        "sequence-heuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Extraction {
        SequenceExtractor::new().extract(text, &RequestContext::new())
    }

    #[test]
    fn test_send_and_reply() {
        let extraction = extract(
            "El Cliente envía una petición de login al Servidor. \
             El servidor responde al cliente con un token",
        );
        let ids: Vec<_> = extraction.elements.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["Cliente", "Servidor"]);

        assert_eq!(extraction.relations.len(), 2);
        let call = &extraction.relations[0];
        assert_eq!((call.from_id.as_str(), call.to_id.as_str()), ("Cliente", "Servidor"));
        assert_eq!(call.kind, RelationKind::Association);
        assert_eq!(call.label.as_deref(), Some("una petición de login"));

        let reply = &extraction.relations[1];
        assert_eq!((reply.from_id.as_str(), reply.to_id.as_str()), ("Servidor", "Cliente"));
        assert_eq!(reply.kind, RelationKind::Dependency);
        assert_eq!(reply.label.as_deref(), Some("un token"));
    }

    #[test]
    fn test_declared_participants_and_actor() {
        let extraction = extract("actor Usuario. participantes: Web, Api y Db. Web calls Api");
        assert_eq!(extraction.elements[0].kind, ElementKind::Actor);
        let ids: Vec<_> = extraction.elements.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["Usuario", "Web", "Api", "Db"]);
        assert_eq!(extraction.relations.len(), 1);
        assert_eq!(extraction.relations[0].label, None);
    }

    #[test]
    fn test_english_send() {
        let extraction = extract("Browser sends the form to Server");
        assert_eq!(extraction.relations[0].label.as_deref(), Some("the form"));
    }
}
