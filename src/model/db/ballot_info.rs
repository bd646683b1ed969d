use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::{common::Campus, mongodb::Id};

/// A voter's registration in a single election, as stored in the database.
///
/// This is the only place a voter's identity is linked to election
/// participation; it never stores ballot content. Uniqueness per
/// (election, email) is enforced by a compound index, and `has_voted` only
/// ever transitions false to true, via the vote recorder's conditional
/// update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentBallotInfoCore {
    /// The election this registration is for.
    pub election_id: Id,
    /// The voter's verified email address, lowercased.
    pub email: String,
    /// Which campus representative race the voter takes part in.
    pub campus_rep: Campus,
    /// The voter's class year (1-4).
    pub year: u8,
    /// Whether the voter has cast their ballot.
    pub has_voted: bool,
}

impl StudentBallotInfoCore {
    pub fn new(election_id: Id, email: &str, campus_rep: Campus, year: u8) -> Self {
        Self {
            election_id,
            email: email.to_lowercase(),
            campus_rep,
            year,
            has_voted: false,
        }
    }
}

/// A registration without an ID, ready for insertion.
pub type NewStudentBallotInfo = StudentBallotInfoCore;

/// A registration from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentBallotInfo {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub info: StudentBallotInfoCore,
}

impl Deref for StudentBallotInfo {
    type Target = StudentBallotInfoCore;

    fn deref(&self) -> &Self::Target {
        &self.info
    }
}

impl DerefMut for StudentBallotInfo {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.info
    }
}
