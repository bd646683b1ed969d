use serde::{Deserialize, Serialize};

use crate::model::common::{Campus, Position};

/// A voter's full submission: one ranked ballot per position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSubmission {
    pub votes: Vec<BallotSpec>,
}

/// One ranked ballot that the voter wishes to cast for a single position.
/// Candidate IDs arrive as raw strings; the validator checks them before
/// anything touches storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotSpec {
    pub position: Position,
    /// Candidate IDs, most preferred first.
    pub ranking: Vec<String>,
}

/// Request body for creating a write-in candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteInSpec {
    pub first_name: String,
    pub last_name: String,
    pub position: Position,
}

/// One voter registration, as supplied by the admin bulk-registration
/// endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentBallotInfoSpec {
    pub email: String,
    pub campus_rep: Campus,
    pub year: u8,
}

/// Response body reporting whether the voter has already cast their ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HasVotedResponse {
    pub has_voted: bool,
}
