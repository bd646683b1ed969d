use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::{common::Position, mongodb::Id};

/// Core candidate data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCore {
    /// The election this candidate is standing in.
    pub election_id: Id,
    /// Candidate name.
    pub name: String,
    /// The position being contested.
    pub position: Position,
    /// Was this candidate written in by a voter rather than nominated?
    #[serde(default)]
    pub is_write_in: bool,
}

impl CandidateCore {
    /// A nominated candidate.
    pub fn new(election_id: Id, name: String, position: Position) -> Self {
        Self {
            election_id,
            name,
            position,
            is_write_in: false,
        }
    }

    /// A voter-supplied write-in candidate.
    pub fn write_in(election_id: Id, name: String, position: Position) -> Self {
        Self {
            election_id,
            name,
            position,
            is_write_in: true,
        }
    }
}

/// A candidate without an ID, ready for insertion.
pub type NewCandidate = CandidateCore;

/// A candidate from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}
