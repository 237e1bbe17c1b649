//! Person Extractor & Matcher
//!
//! Collects every natural person an export mentions ([`PersonExtractor`]) and
//! ranks existing registry entries that may be the same person
//! ([`MatchCandidate`]). Unmatched people simply get no candidates; deciding
//! to create them is the caller's job.

pub mod error;
pub mod extractor;
pub mod scoring;

pub use error::MatchError;
pub use extractor::{ExtractedPerson, MatchOptions, PersonExtractor, PersonRoleTag};
pub use scoring::{rank, score, MatchCandidate, MatchType};
