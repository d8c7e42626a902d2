//! Domain services - Pure detection and rule-building logic

pub mod reference_scanner;
pub mod validation_rules;

pub use reference_scanner::{collect_candidate_patterns, count_occurrences, scan_entity, CandidatePattern};
pub use validation_rules::generate_validation_rules;
