//! Redaction of detected entities and built-in PII patterns

pub mod redactor;
pub mod rules;

pub use redactor::{RedactionInfo, Redactor};
pub use rules::{PatternRule, PatternRuleSpec, builtin_rules};
