//! Highlight decision logic.

pub mod evaluator;
pub mod rules;

pub use evaluator::{Evaluation, HighlightAttempt, HighlightEvaluator, Outcome};
pub use rules::{ActivationRule, SkipReason};
