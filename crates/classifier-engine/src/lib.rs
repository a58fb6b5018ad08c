//! Classifier Engine - Deterministic Node Classification
//!
//! Answers, for a node and a snapshot of group definitions: which groups
//! apply, and what is the node's merged effective configuration. The
//! engine is stateless and side-effect-free; the only shared resource is
//! the immutable group snapshot held by [`Classifier`], so many nodes
//! can be classified concurrently without synchronization.
//!
//! Structural defects in a group set (cycles, dangling parents) refuse
//! the whole snapshot; per-rule defects (bad regex, non-numeric
//! comparison) degrade to diagnostics on the affected rule only.

pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod matcher;
pub mod merge;
pub mod result;
pub mod rules;

pub use engine::{classify, Classifier, ClassifierConfig, CompiledGroup};
pub use error::StructuralError;
pub use hierarchy::{validate_hierarchy, DepthMap};
pub use matcher::{match_group, GroupMatch};
pub use result::{
    ConflictScope, EvalErrorKind, ParameterConflict, ResolvedConfiguration, RuleEvaluationError,
};
pub use rules::{CompiledRule, EvaluationFailure};
