use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{db::election::Election, mongodb::Id};

/// The public view of an election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionDescription {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl From<Election> for ElectionDescription {
    fn from(election: Election) -> Self {
        Self {
            id: election.id,
            name: election.election.name,
            description: election.election.description,
            start_date: election.election.start_date,
            end_date: election.election.end_date,
        }
    }
}
