//! Classifier Core - Data Model for Node Classification
//!
//! Defines the inputs of the classification engine: fact trees and fact
//! paths, rule operators and expected values, node groups with their
//! pin lists and payloads, and the node itself. Everything here is plain
//! data; evaluation lives in `classifier-engine`.

pub mod error;
pub mod facts;
pub mod group;
pub mod rule;
pub mod value;

pub use error::ModelError;
pub use facts::{number_of, text_of, FactPath, PathSegment};
pub use group::{GroupId, Node, NodeGroup, RuleMatchType};
pub use rule::{ClassificationRule, Operator};
pub use value::{RuleValue, Scalar};

/// Environment assigned to nodes that do not report one.
pub const DEFAULT_ENVIRONMENT: &str = "production";
