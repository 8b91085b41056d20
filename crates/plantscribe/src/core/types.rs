//! Shared vocabulary types
//!
//! The fixed label vocabulary ([`DiagramType`]), element and relation kinds,
//! member visibility, and the connector table that ties relation kinds to
//! PlantUML syntax.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed vocabulary of diagram kinds the classifier may output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramType {
    Class,
    UseCase,
    Sequence,
    Activity,
    Component,
}

impl DiagramType {
    /// Every diagram type, in the order used for prompts and listings
    pub fn all() -> &'static [DiagramType] {
        &[
            DiagramType::Class,
            DiagramType::UseCase,
            DiagramType::Sequence,
            DiagramType::Activity,
            DiagramType::Component,
        ]
    }

    /// Canonical label, as used in JSON and in classifier prompts
    pub fn label(self) -> &'static str {
        match self {
            DiagramType::Class => "class",
            DiagramType::UseCase => "use_case",
            DiagramType::Sequence => "sequence",
            DiagramType::Activity => "activity",
            DiagramType::Component => "component",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DiagramType::Class => "Classes with attributes, methods and relationships",
            DiagramType::UseCase => "Actors and the use cases they take part in",
            DiagramType::Sequence => "Participants exchanging messages over time",
            DiagramType::Activity => "An ordered flow of actions",
            DiagramType::Component => "Components, interfaces and their dependencies",
        }
    }

    /// Normalize a free-form label into the vocabulary
    ///
    /// Accepts canonical labels, common English spellings and the Spanish
    /// labels used by older clients (`diagrama_clases`, `diagrama_casos_uso`).
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.')
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();
        let normalized = normalized
            .strip_suffix("_diagram")
            .or_else(|| normalized.strip_prefix("diagrama_"))
            .unwrap_or(normalized.as_str());
        let normalized = normalized.strip_prefix("de_").unwrap_or(normalized);

        match normalized {
            "class" | "classes" | "clase" | "clases" | "classdiagram" => Some(DiagramType::Class),
            "use_case" | "usecase" | "use_cases" | "casos_uso" | "casos_de_uso" | "caso_de_uso"
            | "usecasediagram" => Some(DiagramType::UseCase),
            "sequence" | "secuencia" | "sequencediagram" => Some(DiagramType::Sequence),
            "activity" | "actividad" | "actividades" | "activitydiagram" => {
                Some(DiagramType::Activity)
            }
            "component" | "components" | "componente" | "componentes" | "componentdiagram" => {
                Some(DiagramType::Component)
            }
            _ => None,
        }
    }

    /// Whether elements of `kind` may appear in this diagram type
    pub fn allows_element(self, kind: ElementKind) -> bool {
        use ElementKind::*;
        match self {
            DiagramType::Class => matches!(kind, Class | AbstractClass | Interface | Enum),
            DiagramType::UseCase => matches!(kind, Actor | UseCase | Package),
            DiagramType::Sequence => matches!(kind, Participant | Actor),
            DiagramType::Component => matches!(kind, Component | Interface),
            DiagramType::Activity => matches!(kind, Action),
        }
    }

    /// Look up the connector for `kind` in this diagram type
    ///
    /// `None` means the relation kind is not legal here.
    pub fn connector(self, kind: RelationKind) -> Option<Connector> {
        CONNECTORS
            .iter()
            .find(|c| c.diagram_type == self && c.kind == kind)
            .copied()
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DiagramType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiagramType::from_label(s).ok_or_else(|| format!("Unknown diagram type: {}", s))
    }
}

/// What an element is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Class,
    AbstractClass,
    Interface,
    Enum,
    Actor,
    UseCase,
    Participant,
    Component,
    Action,
    Package,
}

impl ElementKind {
    /// PlantUML declaration keyword
    pub fn keyword(self) -> &'static str {
        match self {
            ElementKind::Class => "class",
            ElementKind::AbstractClass => "abstract class",
            ElementKind::Interface => "interface",
            ElementKind::Enum => "enum",
            ElementKind::Actor => "actor",
            ElementKind::UseCase => "usecase",
            ElementKind::Participant => "participant",
            ElementKind::Component => "component",
            ElementKind::Action => "action",
            ElementKind::Package => "package",
        }
    }

    /// Kinds PlantUML can draw in the business variant (`actor/`, `usecase/`)
    pub fn has_business_form(self) -> bool {
        matches!(self, ElementKind::Actor | ElementKind::UseCase)
    }

    /// Whether attributes and methods may be attached
    pub fn holds_members(self) -> bool {
        matches!(
            self,
            ElementKind::Class | ElementKind::AbstractClass | ElementKind::Interface | ElementKind::Enum
        )
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for ElementKind {
    type Err = String;

    /// Accepts the JSON label (`use_case`) or the PlantUML keyword (`usecase`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        let kind = match normalized.as_str() {
            "class" => ElementKind::Class,
            "abstract_class" | "abstract" => ElementKind::AbstractClass,
            "interface" => ElementKind::Interface,
            "enum" => ElementKind::Enum,
            "actor" => ElementKind::Actor,
            "use_case" | "usecase" => ElementKind::UseCase,
            "participant" => ElementKind::Participant,
            "component" => ElementKind::Component,
            "action" => ElementKind::Action,
            "package" => ElementKind::Package,
            _ => return Err(format!("Unknown element kind: {}", s)),
        };
        Ok(kind)
    }
}

/// Relationship type between elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Association,
    Inheritance,
    Realization,
    Aggregation,
    Composition,
    Dependency,
    Include,
    Extend,
}

impl RelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Association => "association",
            RelationKind::Inheritance => "inheritance",
            RelationKind::Realization => "realization",
            RelationKind::Aggregation => "aggregation",
            RelationKind::Composition => "composition",
            RelationKind::Dependency => "dependency",
            RelationKind::Include => "include",
            RelationKind::Extend => "extend",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        [
            RelationKind::Association,
            RelationKind::Inheritance,
            RelationKind::Realization,
            RelationKind::Aggregation,
            RelationKind::Composition,
            RelationKind::Dependency,
            RelationKind::Include,
            RelationKind::Extend,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == normalized)
        .ok_or_else(|| format!("Unknown relation kind: {}", s))
    }
}

/// Visibility modifier for class members
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    #[serde(alias = "+")]
    Public, // +
    #[serde(alias = "-")]
    Private, // -
    #[serde(alias = "#")]
    Protected, // #
    #[serde(alias = "~", alias = "package private", alias = "package_private")]
    Package, // ~
}

impl Visibility {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Visibility::Public),
            '-' => Some(Visibility::Private),
            '#' => Some(Visibility::Protected),
            '~' => Some(Visibility::Package),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Private => '-',
            Visibility::Protected => '#',
            Visibility::Package => '~',
        }
    }
}

/// Member modifier (static or abstract)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Static,
    Abstract,
}

impl Modifier {
    /// Suffix characters used in compact member notation
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '$' => Some(Modifier::Static),
            '*' => Some(Modifier::Abstract),
            _ => None,
        }
    }

    /// PlantUML member modifier
    pub fn tag(self) -> &'static str {
        match self {
            Modifier::Static => "{static}",
            Modifier::Abstract => "{abstract}",
        }
    }
}

/// One row of the relation connector table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub diagram_type: DiagramType,
    pub kind: RelationKind,
    /// Arrow text placed between the two endpoints
    pub arrow: &'static str,
    /// Stereotype label forced by the relation kind
    pub stereotype: Option<&'static str>,
}

const fn row(
    diagram_type: DiagramType,
    kind: RelationKind,
    arrow: &'static str,
    stereotype: Option<&'static str>,
) -> Connector {
    Connector {
        diagram_type,
        kind,
        arrow,
        stereotype,
    }
}

/// Relation kind to PlantUML connector, per diagram type
///
/// Endpoints are always written `from <arrow> to`.
pub const CONNECTORS: &[Connector] = &[
    row(DiagramType::Class, RelationKind::Association, "-->", None),
    row(DiagramType::Class, RelationKind::Inheritance, "--|>", None),
    row(DiagramType::Class, RelationKind::Realization, "..|>", None),
    row(DiagramType::Class, RelationKind::Aggregation, "o--", None),
    row(DiagramType::Class, RelationKind::Composition, "*--", None),
    row(DiagramType::Class, RelationKind::Dependency, "..>", None),
    row(DiagramType::UseCase, RelationKind::Association, "-->", None),
    row(DiagramType::UseCase, RelationKind::Inheritance, "--|>", None),
    row(DiagramType::UseCase, RelationKind::Include, "..>", Some("<<include>>")),
    row(DiagramType::UseCase, RelationKind::Extend, "..>", Some("<<extend>>")),
    row(DiagramType::Component, RelationKind::Association, "--", None),
    row(DiagramType::Component, RelationKind::Dependency, "..>", None),
    row(DiagramType::Component, RelationKind::Realization, "..|>", None),
    row(DiagramType::Sequence, RelationKind::Association, "->", None),
    row(DiagramType::Sequence, RelationKind::Dependency, "-->", None),
];
