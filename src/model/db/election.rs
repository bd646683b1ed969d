use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core election data, as stored in the database.
///
/// An election becomes immutable the moment voting opens: nothing in this
/// subsystem updates it, and deletion is refused once `start_date` has
/// passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionCore {
    /// Election name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// When voting opens.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub start_date: DateTime<Utc>,
    /// When voting closes.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub end_date: DateTime<Utc>,
}

impl ElectionCore {
    pub fn new(
        name: String,
        description: String,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            description,
            start_date,
            end_date,
        }
    }

    /// Has voting opened?
    pub fn has_started(&self) -> bool {
        Utc::now() >= self.start_date
    }
}

/// An election without an ID, ready for insertion.
pub type NewElection = ElectionCore;

/// An election from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub election: ElectionCore,
}

impl Deref for Election {
    type Target = ElectionCore;

    fn deref(&self) -> &Self::Target {
        &self.election
    }
}

impl DerefMut for Election {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.election
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use chrono::Duration;

    use super::*;

    impl ElectionCore {
        /// An election currently accepting votes.
        pub fn current_example() -> Self {
            Self::new(
                "Spring Senate Election".to_string(),
                "Annual student senate election".to_string(),
                Utc::now() - Duration::days(1),
                Utc::now() + Duration::days(1),
            )
        }

        /// An election that has not yet opened.
        pub fn future_example() -> Self {
            Self::new(
                "Fall Senate Election".to_string(),
                String::new(),
                Utc::now() + Duration::days(30),
                Utc::now() + Duration::days(32),
            )
        }
    }
}
