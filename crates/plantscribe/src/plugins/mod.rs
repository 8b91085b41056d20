//! Plugin implementations for the supported UML diagram types
//!
//! Each plugin pairs a keyword [`Detector`], a heuristic [`Extractor`] and
//! a PlantUML [`Emitter`] for one [`DiagramType`]. The orchestrator ties
//! them to the classifier, builder and compiler.

pub mod activity;
pub mod class;
pub mod component;
pub mod orchestrator;
pub mod phrases;
pub mod sequence;
pub mod use_case;

pub use activity::*;
pub use class::*;
pub use component::*;
pub use orchestrator::*;
pub use sequence::*;
pub use use_case::*;

use crate::core::{DiagramType, Detector, Emitter, Extractor};

/// One keyword detector per diagram type, in [`DiagramType::all`] order
pub fn detectors() -> Vec<Box<dyn Detector>> {
    DiagramType::all().iter().map(|t| detector_for(*t)).collect()
}

pub fn detector_for(diagram_type: DiagramType) -> Box<dyn Detector> {
    match diagram_type {
        DiagramType::Class => Box::new(ClassDetector::new()),
        DiagramType::UseCase => Box::new(UseCaseDetector::new()),
        DiagramType::Sequence => Box::new(SequenceDetector::new()),
        DiagramType::Activity => Box::new(ActivityDetector::new()),
        DiagramType::Component => Box::new(ComponentDetector::new()),
    }
}

pub fn extractor_for(diagram_type: DiagramType) -> Box<dyn Extractor> {
    match diagram_type {
        DiagramType::Class => Box::new(ClassExtractor::new()),
        DiagramType::UseCase => Box::new(UseCaseExtractor::new()),
        DiagramType::Sequence => Box::new(SequenceExtractor::new()),
        DiagramType::Activity => Box::new(ActivityExtractor::new()),
        DiagramType::Component => Box::new(ComponentExtractor::new()),
    }
}

pub fn emitter_for(diagram_type: DiagramType) -> Box<dyn Emitter> {
    match diagram_type {
        DiagramType::Class => Box::new(ClassEmitter::new()),
        DiagramType::UseCase => Box::new(UseCaseEmitter::new()),
        DiagramType::Sequence => Box::new(SequenceEmitter::new()),
        DiagramType::Activity => Box::new(ActivityEmitter::new()),
        DiagramType::Component => Box::new(ComponentEmitter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_type() {
        for diagram_type in DiagramType::all() {
            assert_eq!(detector_for(*diagram_type).diagram_type(), *diagram_type);
            assert_eq!(extractor_for(*diagram_type).diagram_type(), *diagram_type);
            assert_eq!(emitter_for(*diagram_type).diagram_type(), *diagram_type);
        }
        assert_eq!(detectors().len(), DiagramType::all().len());
    }
}
