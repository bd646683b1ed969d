use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::{common::Position, mongodb::Id};

/// A single anonymous ranked ballot for one position, as stored in the
/// database.
///
/// Deliberately carries no voter identifier: once cast, a ballot cannot be
/// traced to its author. The flip side is that there is no per-voter audit
/// trail and no way to spoil-and-recast; that trade-off is intentional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCore {
    /// The election this ballot was cast in.
    pub election_id: Id,
    /// The position this ballot ranks candidates for.
    pub position: Position,
    /// Candidate IDs, most preferred first.
    pub ranking: Vec<Id>,
}

impl VoteCore {
    pub fn new(election_id: Id, position: Position, ranking: Vec<Id>) -> Self {
        Self {
            election_id,
            position,
            ranking,
        }
    }
}

/// A ballot without an ID, ready for insertion.
pub type NewVote = VoteCore;

/// A ballot from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub vote: VoteCore,
}

impl Deref for Vote {
    type Target = VoteCore;

    fn deref(&self) -> &Self::Target {
        &self.vote
    }
}

impl DerefMut for Vote {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.vote
    }
}
