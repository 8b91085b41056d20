//! Class diagram extractor
//!
//! Pulls classes, members and relationships out of Spanish or English
//! prose. Recognised forms:
//!
//! - `Usuario: atributos: id, nombre; métodos: crear()` blocks
//! - `clase X`, `clases A, B y C`, `abstract class X`, `interface X`, `enum X`
//! - `X tiene atributos a y b`, `X has methods m and n`
//! - `class User. attributes: id, name. methods: create()` sections, owned
//!   by the closest class named before them
//! - `X hereda de Y`, `X implementa Y`, `X tiene un Y`, `X usa Y`
//!   and their English equivalents
//!
//! Members go through the compact member grammar, so `id:int` and
//! `+crear(nombre: String): void` keep their types.

use regex::Regex;
use tracing::{debug, trace};

use crate::core::member::{parse_member, Member};
use crate::core::{
    Attribute, BuildWarning, DiagramType, Element, ElementKind, Extraction, Extractor, Method,
    Relation, RelationKind, RequestContext,
};
use crate::plugins::phrases::{is_section_word, is_stopword, pattern, split_list};

pattern!(BLOCK, r"\b([A-ZÁÉÍÓÚÑ]\w*)\s*:\s*([^\n]+)");
pattern!(BLOCK_ATTRIBUTES, r"(?i)(?:atributos?|attributes?)\s*[:\-]?\s*([^;]+)");
pattern!(BLOCK_METHODS, r"(?i)(?:m[ée]todos?|methods?)\s*[:\-]?\s*([^;]+)");
pattern!(CLASS_NAME, r"(?i)\b(?:clase|class)\s+(\w+)");
pattern!(
    CLASS_LIST,
    r"\b(?:[Cc]lases|[Cc]lasses)\s+([A-ZÁÉÍÓÚÑ]\w*(?:\s*,\s*[A-ZÁÉÍÓÚÑ]\w*|\s+(?:y|and)\s+[A-ZÁÉÍÓÚÑ]\w*)*)"
);
pattern!(ABSTRACT_NAME, r"(?i)\b(?:clase\s+abstracta|abstract\s+class)\s+(\w+)");
pattern!(INTERFACE_NAME, r"(?i)\b(?:interfaz|interface)\s+(\w+)");
pattern!(ENUM_NAME, r"(?i)\b(?:enumeración|enum)\s+(\w+)");
pattern!(
    SECTION,
    r"(?i)(?:^|[.;\n])\s*(atributos?|attributes?|m[ée]todos?|methods?)\s*:\s*([^.;\n]+)"
);
pattern!(LONE_ATTRIBUTE, r"(?i)\b(?:atributos?|attributes?)\s+(\w+)");
pattern!(LONE_METHOD, r"(?i)\b(?:m[ée]todos?|methods?)\s+(\w+)");

pattern!(INHERITS, r"(?i)\b(\w+)\s+(?:hereda\s+de|inherits\s+from|extends)\s+(\w+)");
pattern!(REALIZES, r"(?i)\b(\w+)\s+(?:implementa|implements)\s+(\w+)");
pattern!(
    COMPOSES,
    r"(?i)\b(\w+)\s+(?:tiene\s+una?|contiene\s+una?|se\s+compone\s+de|has\s+an?|contains\s+an?)\s+(\w+)"
);
pattern!(
    AGGREGATES,
    r"(?i)\b(\w+)\s+(?:agrupa(?:\s+varios|\s+varias)?|has\s+many|groups)\s+(\w+)"
);
pattern!(DEPENDS, r"(?i)\b(\w+)\s+(?:usa|utiliza|uses)\s+(?:una?\s+|an?\s+)?(\w+)");
pattern!(
    ASSOCIATES,
    r"(?i)\b(\w+)\s+(?:se\s+asocia\s+con|está\s+asociad[oa]\s+(?:a|con)|is\s+associated\s+with)\s+(\w+)"
);

/// Heuristic extractor for class diagrams
pub struct ClassExtractor;

impl ClassExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Class names with their kind, in order of first mention
    fn declared_names(&self, text: &str, context: &RequestContext) -> Vec<(String, ElementKind)> {
        let mut found: Vec<(usize, String, ElementKind)> = Vec::new();

        let kinds = [
            (&*ABSTRACT_NAME, ElementKind::AbstractClass),
            (&*INTERFACE_NAME, ElementKind::Interface),
            (&*ENUM_NAME, ElementKind::Enum),
            (&*CLASS_NAME, ElementKind::Class),
        ];
        for (re, kind) in kinds {
            for caps in re.captures_iter(text) {
                if let Some(m) = caps.get(1) {
                    found.push((m.start(), m.as_str().to_string(), kind));
                }
            }
        }

        for caps in CLASS_LIST.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                let mut offset = m.start();
                for name in split_list(m.as_str()) {
                    found.push((offset, name, ElementKind::Class));
                    offset += 1;
                }
            }
        }

        for (name, _) in self.blocks(text) {
            if let Some(pos) = text.find(name.as_str()) {
                found.push((pos, name, ElementKind::Class));
            }
        }

        found.sort_by_key(|(pos, _, _)| *pos);

        // Names mentioned in earlier turns come after the current text
        let history = context
            .history
            .iter()
            .flat_map(|entry| CLASS_NAME.captures_iter(&entry.text))
            .filter_map(|caps| caps.get(1).map(|m| (m.as_str().to_string(), ElementKind::Class)));

        let mut names: Vec<(String, ElementKind)> = Vec::new();
        for (name, kind) in found
            .into_iter()
            .map(|(_, name, kind)| (name, kind))
            .chain(history)
        {
            if is_stopword(&name) || is_section_word(&name) {
                continue;
            }
            if !names.iter().any(|(n, _)| n == &name) {
                names.push((name, kind));
            }
        }
        names
    }

    /// `Name: atributos: ...; métodos: ...` blocks, in text order
    fn blocks(&self, text: &str) -> Vec<(String, Vec<Member>)> {
        let mut blocks = Vec::new();
        for caps in BLOCK.captures_iter(text) {
            let (Some(name), Some(rest)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let name = name.as_str();
            if is_section_word(name) || is_stopword(name) {
                continue;
            }
            let rest = rest.as_str();
            let mut members = Vec::new();

            if let Some(list) = BLOCK_ATTRIBUTES.captures(rest).and_then(|c| c.get(1)) {
                members.extend(
                    split_list(list.as_str())
                        .iter()
                        .filter_map(|item| attribute_member(item)),
                );
            }
            if let Some(list) = BLOCK_METHODS.captures(rest).and_then(|c| c.get(1)) {
                members.extend(
                    split_list(list.as_str())
                        .iter()
                        .filter_map(|item| method_member(item)),
                );
            }

            if !members.is_empty() {
                blocks.push((name.to_string(), members));
            }
        }
        blocks
    }

    /// `X tiene atributos a, b y c` and `X has methods m and n`
    fn inline_members(&self, text: &str, name: &str) -> Vec<Member> {
        let escaped = regex::escape(name);
        let mut members = Vec::new();

        let attributes = Regex::new(&format!(
            r"(?i)\b{}\b[^.,\n]*?\b(?:atributos?|attributes?)\s+([\w\s,:]+)",
            escaped
        ));
        if let Ok(re) = attributes {
            if let Some(list) = re.captures(text).and_then(|c| c.get(1)) {
                members.extend(
                    split_list(list.as_str())
                        .iter()
                        .filter_map(|item| attribute_member(item)),
                );
            }
        }

        let methods = Regex::new(&format!(
            r"(?i)\b{}\b[^.,\n]*?\b(?:m[ée]todos?|methods?)\s+([\w\s,():]+)",
            escaped
        ));
        if let Ok(re) = methods {
            if let Some(list) = re.captures(text).and_then(|c| c.get(1)) {
                members.extend(
                    split_list(list.as_str())
                        .iter()
                        .filter_map(|item| method_member(item)),
                );
            }
        }

        members
    }

    /// Sentence-level member sections with the class that owns each
    fn sections(&self, text: &str, names: &[(String, ElementKind)]) -> Vec<Section> {
        let mut sections = Vec::new();
        for caps in SECTION.captures_iter(text) {
            let (Some(header), Some(list)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let methods = header.as_str().to_lowercase().starts_with('m');
            let members: Vec<Member> = split_list(list.as_str())
                .iter()
                .filter_map(|item| {
                    if methods {
                        method_member(item)
                    } else {
                        attribute_member(item)
                    }
                })
                .collect();
            if members.is_empty() {
                continue;
            }
            let before = &text[..header.start()];
            let owner = names
                .iter()
                .filter_map(|(name, _)| last_mention(before, name).map(|pos| (pos, name)))
                .max_by_key(|(pos, _)| *pos)
                .map(|(_, name)| name.clone());
            sections.push(Section {
                owner,
                members,
                text: list.as_str().trim().to_string(),
            });
        }
        sections
    }

    fn relations(&self, text: &str, extraction: &Extraction) -> Vec<Relation> {
        let resolve = |raw: &str| -> String {
            extraction
                .elements
                .iter()
                .find(|e| e.id.to_lowercase() == raw.to_lowercase())
                .map(|e| e.id.clone())
                .unwrap_or_else(|| raw.to_string())
        };

        let mut found: Vec<(usize, Relation)> = Vec::new();
        let kinds = [
            (&*INHERITS, RelationKind::Inheritance),
            (&*REALIZES, RelationKind::Realization),
            (&*COMPOSES, RelationKind::Composition),
            (&*AGGREGATES, RelationKind::Aggregation),
            (&*DEPENDS, RelationKind::Dependency),
            (&*ASSOCIATES, RelationKind::Association),
        ];
        for (re, kind) in kinds {
            for caps in re.captures_iter(text) {
                let (Some(from), Some(to)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                if is_section_word(to.as_str()) || is_stopword(to.as_str()) {
                    continue;
                }
                let relation = Relation::new(resolve(from.as_str()), resolve(to.as_str()), kind);
                trace!(from = %relation.from_id, to = %relation.to_id, kind = %kind, "Matched relation");
                found.push((from.start(), relation));
            }
        }
        found.sort_by_key(|(pos, _)| *pos);

        let mut relations: Vec<Relation> = Vec::new();
        for (_, relation) in found {
            if !relations.contains(&relation) {
                relations.push(relation);
            }
        }
        relations
    }
}

impl Default for ClassExtractor {
    fn default() -> Self {
        Self::new()
    }
}

struct Section {
    owner: Option<String>,
    members: Vec<Member>,
    text: String,
}

/// Start of the last whole-word mention of `name`
fn last_mention(haystack: &str, name: &str) -> Option<usize> {
    let re = Regex::new(&format!(r"\b{}\b", regex::escape(name))).ok()?;
    re.find_iter(haystack).last().map(|m| m.start())
}

/// Members with spaces in their name are sentence fragments, not members
fn is_member_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(char::is_whitespace)
}

fn attribute_member(item: &str) -> Option<Member> {
    match parse_member(item).ok()? {
        Member::Attribute(a) if is_member_name(&a.name) => Some(Member::Attribute(a)),
        Member::Method(m) if is_member_name(&m.name) => Some(Member::Method(m)),
        _ => None,
    }
}

/// Items listed under "métodos" are methods even without parentheses
fn method_member(item: &str) -> Option<Member> {
    match parse_member(item).ok()? {
        Member::Attribute(a) if is_member_name(&a.name) => Some(Member::Method(
            Method::new(a.name).with_visibility(a.visibility),
        )),
        Member::Method(m) if is_member_name(&m.name) => Some(Member::Method(m)),
        _ => None,
    }
}

fn attach(element: &mut Element, member: Member) {
    match member {
        Member::Attribute(attribute) => {
            if !element.attributes.iter().any(|a| a.name == attribute.name) {
                element.attributes.push(attribute);
            }
        }
        Member::Method(method) => {
            if !element.methods.iter().any(|m| m.name == method.name) {
                element.methods.push(method);
            }
        }
    }
}

impl Extractor for ClassExtractor {
    fn extract(&self, text: &str, context: &RequestContext) -> Extraction {
        let mut extraction = Extraction::new();
        let names = self.declared_names(text, context);
        let blocks = self.blocks(text);

        for (name, kind) in &names {
            extraction.ensure(Element::new(name.clone(), *kind, name.clone()));
        }

        for (name, members) in blocks {
            if let Some(element) = extraction.element_mut(&name) {
                for member in members {
                    attach(element, member);
                }
            }
        }

        for (name, _) in &names {
            let members = self.inline_members(text, name);
            if let Some(element) = extraction.element_mut(name) {
                for member in members {
                    attach(element, member);
                }
            }
        }

        for section in self.sections(text, &names) {
            match section.owner.and_then(|name| extraction.element_mut(&name)) {
                Some(element) => {
                    for member in section.members {
                        attach(element, member);
                    }
                }
                None => extraction.warn(BuildWarning::UnreadMembers {
                    section: section.text,
                }),
            }
        }

        // A single class takes any loose "atributo x" / "método y" mentions
        if let [element] = extraction.elements.as_mut_slice() {
            if element.member_count() == 0 {
                for caps in LONE_ATTRIBUTE.captures_iter(text) {
                    if let Some(m) = caps.get(1) {
                        attach(element, Member::Attribute(Attribute::new(m.as_str(), "String")));
                    }
                }
                for caps in LONE_METHOD.captures_iter(text) {
                    if let Some(m) = caps.get(1) {
                        attach(element, Member::Method(Method::new(m.as_str())));
                    }
                }
            }
        }

        let relations = self.relations(text, &extraction);
        extraction.relations = relations;

        debug!(
            elements = extraction.elements.len(),
            relations = extraction.relations.len(),
            "Extracted class diagram entities"
        );
        extraction
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Class
    }

    fn name(&self) -> &'static str {
        "class-heuristic"
    }
}
