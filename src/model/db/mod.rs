pub mod ballot_info;
pub mod candidate;
pub mod election;
pub mod vote;
