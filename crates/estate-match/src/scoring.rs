//! Match candidates and confidence scoring
//!
//! The first decisive factor wins: SSN, then name with email, then name with
//! date of birth, then name alone. Candidates matching on none of these are
//! not candidates.

use crate::extractor::ExtractedPerson;
use chrono::NaiveDate;
use estate_model::names::names_match;
use estate_model::{Person, PersonId};
use serde::{Deserialize, Serialize};

/// How a candidate matched, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Last four SSN digits agree
    Ssn,
    /// Name and email agree
    NameEmail,
    /// Name and date of birth agree
    NameDob,
    /// Name agrees
    Name,
}

impl MatchType {
    /// Confidence score (0-100)
    #[must_use]
    pub fn confidence(self) -> u8 {
        match self {
            MatchType::Ssn => 100,
            MatchType::NameEmail => 90,
            MatchType::NameDob => 75,
            MatchType::Name => 60,
        }
    }
}

/// Scored suggestion that an extracted person is an existing one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Registry id of the existing person
    pub person_id: PersonId,
    /// Existing person's full name
    pub display_name: String,
    /// Existing email
    pub email: Option<String>,
    /// Existing date of birth
    pub date_of_birth: Option<NaiveDate>,
    /// Strongest factor that agreed
    pub match_type: MatchType,
    /// Score for `match_type` (0-100)
    pub confidence: u8,
    /// Attributes that agreed (`ssn`, `name`, `email`, `date_of_birth`)
    pub matched_fields: Vec<String>,
}

/// Score an existing person against an extracted one
#[must_use]
pub fn score(extracted: &ExtractedPerson, existing: &Person) -> Option<MatchCandidate> {
    let display_name = existing.full_name();

    let ssn = matches!(
        (&extracted.ssn_last4, &existing.ssn_last4),
        (Some(a), Some(b)) if a == b
    );
    let name = names_match(&extracted.name, &display_name);
    let email = matches!(
        (&extracted.email, &existing.email),
        (Some(a), Some(b)) if a.trim().eq_ignore_ascii_case(b.trim())
    );
    let dob = matches!(
        (extracted.date_of_birth, existing.date_of_birth),
        (Some(a), Some(b)) if a == b
    );

    let match_type = if ssn {
        MatchType::Ssn
    } else if name && email {
        MatchType::NameEmail
    } else if name && dob {
        MatchType::NameDob
    } else if name {
        MatchType::Name
    } else {
        return None;
    };

    let matched_fields = [(ssn, "ssn"), (name, "name"), (email, "email"), (dob, "date_of_birth")]
        .into_iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, field)| field.to_string())
        .collect();

    Some(MatchCandidate {
        person_id: existing.id,
        display_name,
        email: existing.email.clone(),
        date_of_birth: existing.date_of_birth,
        match_type,
        confidence: match_type.confidence(),
        matched_fields,
    })
}

/// Order by descending confidence (name breaks ties), keep at most `limit`
pub fn rank(candidates: &mut Vec<MatchCandidate>, limit: usize) {
    candidates.sort_by(|a, b| {
        b.confidence
            .cmp(&a.confidence)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    candidates.truncate(limit);
}
