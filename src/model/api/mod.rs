mod ballot;
mod candidate;
mod election;

pub use ballot::{BallotSpec, HasVotedResponse, StudentBallotInfoSpec, VoteSubmission, WriteInSpec};
pub use candidate::CandidateDescription;
pub use election::ElectionDescription;
