use serde::{Deserialize, Serialize};

use crate::model::{common::Position, db::candidate::Candidate, mongodb::Id};

/// The public view of a candidate, as returned on a composed ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDescription {
    pub id: Id,
    pub name: String,
    pub position: Position,
    pub is_write_in: bool,
}

impl From<Candidate> for CandidateDescription {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.candidate.name,
            position: candidate.candidate.position,
            is_write_in: candidate.candidate.is_write_in,
        }
    }
}
