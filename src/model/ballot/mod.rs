pub mod composer;
pub mod recorder;
pub mod validator;

pub use composer::compose_ballot;
pub use recorder::{record_votes, UNABLE_TO_SUBMIT};
pub use validator::{check_structure, validate_votes, BallotError, ValidBallot};
