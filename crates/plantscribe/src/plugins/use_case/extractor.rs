//! Use case diagram extractor
//!
//! Recognises `actor X` / `actores A y B`, `caso de uso X` /
//! `use case X`, `X puede Y` / `X can Y` (actor to use case association),
//! `A incluye B`, `A extiende B` and `X es un tipo de Y`. Ids are the
//! lowercased, underscore-joined names.
//!
//! `paquete Ventas contiene comprar y pagar` / `package Sales: ...` groups
//! elements into a package, and `actor de negocio X` / `business actor X`
//! and `business use case Y` mark business elements.

use tracing::debug;

use crate::core::{
    DiagramType, Element, ElementKind, Extraction, Extractor, Relation, RelationKind,
    RequestContext,
};
use crate::plugins::phrases::{clean_phrase, is_stopword, pattern, slug, split_list};

pattern!(
    ACTOR_LIST,
    r"(?i)\bactor(?:es|s)\s+(\w+(?:\s*,\s*\w+|\s+(?:y|and)\s+\w+)*)"
);
pattern!(ACTOR, r"(?i)\bactor\s+(\w+)");
pattern!(
    BUSINESS_ACTOR,
    r"(?i)\b(?:actor(?:es)?\s+de\s+negocio|business\s+actors?)\s+(\w+(?:\s*,\s*\w+|\s+(?:y|and)\s+\w+)*)"
);
pattern!(
    BUSINESS_USE_CASE,
    r"(?i)\b(?:casos?\s+de\s+uso\s+de\s+negocio|business\s+use\s+cases?)\s*:?\s+([^.;\n]+)"
);
pattern!(
    PACKAGE,
    r"(?i)\b(?:paquete|package)\s+(\w+)\s*(?::|\b(?:contiene|contains|agrupa|groups)\b)\s*([^.;\n]+)"
);
pattern!(USE_CASE, r"(?i)\b(?:casos?\s+de\s+uso|use\s+cases?)\s*:?\s+([^.;\n]+)");
pattern!(CAN, r"(?i)\b(\w+)\s+(?:puede|pueden|can)\s+([^.;\n]+)");
pattern!(INCLUDES, r"(?i)\b(\w+)\s+(?:incluye|includes)\s+(\w+)");
pattern!(EXTENDS, r"(?i)\b(\w+)\s+(?:extiende|extends)\s+(\w+)");
pattern!(
    SPECIALIZES,
    r"(?i)\b(\w+)\s+(?:es\s+un\s+tipo\s+de|is\s+a\s+kind\s+of)\s+(\w+)"
);

/// Heuristic extractor for use case diagrams
pub struct UseCaseExtractor;

impl UseCaseExtractor {
    pub fn new() -> Self {
        Self
    }

    fn actors(&self, text: &str) -> Vec<(usize, String)> {
        let mut found = Vec::new();
        for caps in ACTOR_LIST.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                for (i, name) in split_list(m.as_str()).into_iter().enumerate() {
                    found.push((m.start() + i, name));
                }
            }
        }
        for caps in ACTOR.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                found.push((m.start(), m.as_str().to_string()));
            }
        }
        found.retain(|(_, name)| !is_stopword(name));
        found
    }

    fn use_cases(&self, text: &str) -> Vec<(usize, String)> {
        let mut found = Vec::new();
        for caps in USE_CASE.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                for (i, name) in split_list(m.as_str()).into_iter().enumerate() {
                    found.push((m.start() + i, name));
                }
            }
        }
        found.retain(|(_, name)| is_use_case_phrase(name));
        found
    }

    /// Names declared with the business qualifier, as element kinds
    fn business(&self, text: &str) -> Vec<(usize, String, ElementKind)> {
        let mut found = Vec::new();
        let kinds = [
            (&*BUSINESS_ACTOR, ElementKind::Actor),
            (&*BUSINESS_USE_CASE, ElementKind::UseCase),
        ];
        for (re, kind) in kinds {
            for caps in re.captures_iter(text) {
                if let Some(m) = caps.get(1) {
                    for (i, name) in split_list(m.as_str()).into_iter().enumerate() {
                        if is_use_case_phrase(&name) {
                            found.push((m.start() + i, name, kind));
                        }
                    }
                }
            }
        }
        found
    }

    /// Package names with the names listed as their contents
    fn packages(&self, text: &str) -> Vec<(String, Vec<String>)> {
        PACKAGE
            .captures_iter(text)
            .filter_map(|caps| {
                let name = caps.get(1)?.as_str().to_string();
                if is_stopword(&name) {
                    return None;
                }
                Some((name, split_list(caps.get(2)?.as_str())))
            })
            .collect()
    }

    fn group(&self, text: &str, extraction: &mut Extraction) {
        let mut groups = Vec::new();
        for (name, contents) in self.packages(text) {
            let id = slug(&name);
            let package = extraction.ensure(Element::new(id.clone(), ElementKind::Package, name));
            // A name already taken by an actor or use case is not a package
            if package.kind == ElementKind::Package {
                groups.push((id, contents));
            }
        }

        for (package_id, contents) in &groups {
            for item in contents {
                let id = resolve(extraction, item);
                if id.is_empty() || &id == package_id {
                    continue;
                }
                match extraction.element_mut(&id) {
                    Some(element) => element.parent = Some(package_id.clone()),
                    None => extraction.push_element(
                        Element::new(id, ElementKind::UseCase, clean_phrase(item))
                            .in_package(package_id.clone()),
                    ),
                }
            }
        }

        packages_first(extraction);
    }
}

/// Move packages to the front, each after the package that holds it
fn packages_first(extraction: &mut Extraction) {
    let (mut pending, rest): (Vec<Element>, Vec<Element>) = extraction
        .elements
        .drain(..)
        .partition(|e| e.kind == ElementKind::Package);

    let mut ordered: Vec<Element> = Vec::new();
    while !pending.is_empty() {
        let ready = pending.iter().position(|p| match &p.parent {
            Some(parent) => {
                ordered.iter().any(|o| &o.id == parent) || !pending.iter().any(|q| &q.id == parent)
            }
            None => true,
        });
        match ready {
            Some(index) => ordered.push(pending.remove(index)),
            // Cyclic nesting; the builder lifts whatever cannot be placed
            None => ordered.append(&mut pending),
        }
    }
    ordered.extend(rest);
    extraction.elements = ordered;
}

impl Default for UseCaseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Phrases starting with a filler word ("para el proceso ...") are not use cases
fn is_use_case_phrase(phrase: &str) -> bool {
    match phrase.split_whitespace().next() {
        Some(first) => !is_stopword(first),
        None => false,
    }
}

/// Resolve a single word to an element: exact id, then id prefix
fn resolve(extraction: &Extraction, word: &str) -> String {
    let key = slug(word);
    let prefix = format!("{}_", key);
    extraction
        .elements
        .iter()
        .find(|e| e.id == key)
        .or_else(|| extraction.elements.iter().find(|e| e.id.starts_with(&prefix)))
        .map(|e| e.id.clone())
        .unwrap_or(key)
}

impl Extractor for UseCaseExtractor {
    fn extract(&self, text: &str, context: &RequestContext) -> Extraction {
        let mut extraction = Extraction::new();

        let mut declared: Vec<(usize, String, ElementKind)> = Vec::new();
        declared.extend(
            self.actors(text)
                .into_iter()
                .map(|(pos, name)| (pos, name, ElementKind::Actor)),
        );
        declared.extend(
            self.use_cases(text)
                .into_iter()
                .map(|(pos, name)| (pos, name, ElementKind::UseCase)),
        );
        let business = self.business(text);
        declared.extend(business.iter().cloned());

        // "X puede Y": X is an actor, each Y a use case
        let mut abilities: Vec<(usize, String, String)> = Vec::new();
        for caps in CAN.captures_iter(text) {
            let (Some(subject), Some(rest)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            if is_stopword(subject.as_str()) {
                continue;
            }
            declared.push((subject.start(), subject.as_str().to_string(), ElementKind::Actor));
            for (i, ability) in split_list(rest.as_str()).into_iter().enumerate() {
                if !is_use_case_phrase(&ability) {
                    continue;
                }
                declared.push((rest.start() + i, ability.clone(), ElementKind::UseCase));
                abilities.push((subject.start(), subject.as_str().to_string(), ability));
            }
        }

        declared.sort_by_key(|(pos, _, _)| *pos);

        let history_actors: Vec<String> = context
            .history
            .iter()
            .flat_map(|entry| ACTOR.captures_iter(&entry.text))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .filter(|name| !is_stopword(name))
            .collect();

        for (_, name, kind) in declared
            .into_iter()
            .chain(history_actors.into_iter().map(|n| (0, n, ElementKind::Actor)))
        {
            let name = clean_phrase(&name).to_string();
            let id = slug(&name);
            if id.is_empty() {
                continue;
            }
            extraction.ensure(Element::new(id, kind, name));
        }
        for (_, name, _) in &business {
            if let Some(element) = extraction.element_mut(&slug(name)) {
                element.business = true;
            }
        }
        self.group(text, &mut extraction);

        let mut relations: Vec<(usize, Relation)> = Vec::new();
        for (pos, actor, ability) in abilities {
            relations.push((
                pos,
                Relation::new(slug(&actor), slug(&ability), RelationKind::Association),
            ));
        }
        let kinds = [
            (&*INCLUDES, RelationKind::Include),
            (&*EXTENDS, RelationKind::Extend),
            (&*SPECIALIZES, RelationKind::Inheritance),
        ];
        for (re, kind) in kinds {
            for caps in re.captures_iter(text) {
                let (Some(from), Some(to)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                if is_stopword(to.as_str()) {
                    continue;
                }
                relations.push((
                    from.start(),
                    Relation::new(
                        resolve(&extraction, from.as_str()),
                        resolve(&extraction, to.as_str()),
                        kind,
                    ),
                ));
            }
        }
        relations.sort_by_key(|(pos, _)| *pos);
        for (_, relation) in relations {
            if !extraction.relations.contains(&relation) {
                extraction.push_relation(relation);
            }
        }

        debug!(
            elements = extraction.elements.len(),
            relations = extraction.relations.len(),
            "Extracted use case entities"
        );
        extraction
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::UseCase
    }

    fn name(&self) -> &'static str {
        "use-case-heuristic"
    }
}
