//! Component diagram extractor
//!
//! `componentes Web, Api y Db`, `interfaz Pagos`, `X depende de Y`,
//! `X implementa Y`, `X se conecta con Y` and English equivalents.
//! Capitalised relation endpoints count as component mentions.

use tracing::debug;

use crate::core::{
    DiagramType, Element, ElementKind, Extraction, Extractor, Relation, RelationKind,
    RequestContext,
};
use crate::plugins::phrases::{is_stopword, pattern, split_list};

pattern!(
    COMPONENTS,
    r"(?i)\b(?:componentes?|components?|módulos?|modules?|microservicios?|microservices?)\s*:?\s+(\w+(?:\s*,\s*\w+|\s+(?:y|and)\s+\w+)*)"
);
pattern!(INTERFACE, r"(?i)\b(?:interfaz|interface)\s+(\w+)");
pattern!(
    DEPENDS,
    r"(?i)\b(\w+)\s+(?:depende\s+de|depends\s+on|usa|uses)\s+(?:la\s+|el\s+|the\s+)?(\w+)"
);
pattern!(
    REALIZES,
    r"(?i)\b(\w+)\s+(?:implementa|provee|expone|implements|provides|exposes)\s+(?:la\s+|el\s+|the\s+)?(\w+)"
);
pattern!(
    CONNECTS,
    r"(?i)\b(\w+)\s+(?:se\s+conecta\s+con|se\s+comunica\s+con|connects\s+to|talks\s+to)\s+(?:la\s+|el\s+|the\s+)?(\w+)"
);

/// Heuristic extractor for component diagrams
pub struct ComponentExtractor;

impl ComponentExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ComponentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn is_proper_name(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase) && !is_stopword(word)
}

fn canonical(extraction: &Extraction, name: &str) -> String {
    extraction
        .elements
        .iter()
        .find(|e| e.id.to_lowercase() == name.to_lowercase())
        .map(|e| e.id.clone())
        .unwrap_or_else(|| name.to_string())
}

impl Extractor for ComponentExtractor {
    fn extract(&self, text: &str, _context: &RequestContext) -> Extraction {
        let mut declared: Vec<(usize, String, ElementKind)> = Vec::new();
        for caps in COMPONENTS.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                for (i, name) in split_list(m.as_str()).into_iter().enumerate() {
                    declared.push((m.start() + i, name, ElementKind::Component));
                }
            }
        }
        for caps in INTERFACE.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                declared.push((m.start(), m.as_str().to_string(), ElementKind::Interface));
            }
        }

        let mut links: Vec<(usize, String, String, RelationKind)> = Vec::new();
        let kinds = [
            (&*DEPENDS, RelationKind::Dependency),
            (&*REALIZES, RelationKind::Realization),
            (&*CONNECTS, RelationKind::Association),
        ];
        for (re, kind) in kinds {
            for caps in re.captures_iter(text) {
                let (Some(from), Some(to)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                for endpoint in [from, to] {
                    if is_proper_name(endpoint.as_str()) {
                        declared.push((
                            endpoint.start(),
                            endpoint.as_str().to_string(),
                            ElementKind::Component,
                        ));
                    }
                }
                links.push((
                    from.start(),
                    from.as_str().to_string(),
                    to.as_str().to_string(),
                    kind,
                ));
            }
        }
        declared.sort_by_key(|(pos, _, _)| *pos);

        let mut extraction = Extraction::new();
        for (_, name, kind) in declared {
            if is_stopword(&name) {
                continue;
            }
            let id = canonical(&extraction, &name);
            extraction.ensure(Element::new(id.clone(), kind, id));
        }

        links.sort_by_key(|(pos, _, _, _)| *pos);
        for (_, from, to, kind) in links {
            if is_stopword(&from) || is_stopword(&to) {
                continue;
            }
            let relation = Relation::new(
                canonical(&extraction, &from),
                canonical(&extraction, &to),
                kind,
            );
            if !extraction.relations.contains(&relation) {
                extraction.push_relation(relation);
            }
        }

        debug!(
            components = extraction.elements.len(),
            relations = extraction.relations.len(),
            "Extracted component entities"
        );
        extraction
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Component
    }

    fn name(&self) -> &'static str {
        "component-heuristic"
    }
}
