use std::fmt::{Display, Formatter};

use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

/// Which half of campus a voter's housing falls in.
/// Determines which campus representative race appears on their ballot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Campus {
    North,
    South,
}

impl Campus {
    /// The campus representative position this voter is eligible for.
    pub const fn rep_position(self) -> Position {
        match self {
            Campus::North => Position::NorthCampusRepresentative,
            Campus::South => Position::SouthCampusRepresentative,
        }
    }
}

/// A position being contested in an election: one of the enumerated senate
/// roles, or a free-text position for ad-hoc races.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    President,
    VpFinance,
    VpStudentAffairs,
    VpAcademicAffairs,
    CommissionerAthletics,
    CommissionerCampusEvents,
    CommissionerEquityInclusion,
    CommissionerFacilitiesEnvironment,
    CommissionerWelfare,
    SeniorClassPresident,
    JuniorClassPresident,
    SophomoreClassPresident,
    FirstYearClassPresident,
    NorthCampusRepresentative,
    SouthCampusRepresentative,
    TrusteeRepresentativeFinance,
    TrusteeRepresentativeStudentAffairs,
    TrusteeRepresentativeEducationalQuality,
    CommencementSpeaker,
    ClassName,
    #[serde(untagged)]
    Other(String),
}

impl Position {
    /// The wire/database name of this position.
    pub fn as_str(&self) -> &str {
        match self {
            Self::President => "president",
            Self::VpFinance => "vp_finance",
            Self::VpStudentAffairs => "vp_student_affairs",
            Self::VpAcademicAffairs => "vp_academic_affairs",
            Self::CommissionerAthletics => "commissioner_athletics",
            Self::CommissionerCampusEvents => "commissioner_campus_events",
            Self::CommissionerEquityInclusion => "commissioner_equity_inclusion",
            Self::CommissionerFacilitiesEnvironment => "commissioner_facilities_environment",
            Self::CommissionerWelfare => "commissioner_welfare",
            Self::SeniorClassPresident => "senior_class_president",
            Self::JuniorClassPresident => "junior_class_president",
            Self::SophomoreClassPresident => "sophomore_class_president",
            Self::FirstYearClassPresident => "first_year_class_president",
            Self::NorthCampusRepresentative => "north_campus_representative",
            Self::SouthCampusRepresentative => "south_campus_representative",
            Self::TrusteeRepresentativeFinance => "trustee_representative_finance",
            Self::TrusteeRepresentativeStudentAffairs => "trustee_representative_student_affairs",
            Self::TrusteeRepresentativeEducationalQuality => {
                "trustee_representative_educational_quality"
            }
            Self::CommencementSpeaker => "commencement_speaker",
            Self::ClassName => "class_name",
            Self::Other(s) => s,
        }
    }

    /// The positions a voter ranks on the strength of their class year.
    ///
    /// Years 1-3 vote one class ahead of their literal year: the race they
    /// are choosing is who will represent their class next year. Graduating
    /// seniors instead get the two senior-specific races. Anything else is
    /// not a recognised class year and gets no class races at all.
    pub fn class_ballot(year: u8) -> Vec<Position> {
        match year {
            1 => vec![Position::SophomoreClassPresident],
            2 => vec![Position::JuniorClassPresident],
            3 => vec![Position::SeniorClassPresident],
            4 => vec![Position::CommencementSpeaker, Position::ClassName],
            _ => vec![],
        }
    }

    /// The positions that are gated on voter eligibility attributes.
    /// Everything else is at-large and appears on every ballot.
    pub fn restricted() -> [Position; 8] {
        [
            Position::FirstYearClassPresident,
            Position::SophomoreClassPresident,
            Position::JuniorClassPresident,
            Position::SeniorClassPresident,
            Position::NorthCampusRepresentative,
            Position::SouthCampusRepresentative,
            Position::CommencementSpeaker,
            Position::ClassName,
        ]
    }

    /// Whether this position is gated on eligibility attributes.
    pub fn is_restricted(&self) -> bool {
        Self::restricted().contains(self)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&Position> for Bson {
    fn from(position: &Position) -> Self {
        to_bson(position).expect("Serialisation is infallible")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rocket::serde::json::serde_json;

    use super::*;

    #[test]
    fn class_ballot_mapping() {
        assert_eq!(
            Position::class_ballot(1),
            vec![Position::SophomoreClassPresident]
        );
        assert_eq!(
            Position::class_ballot(2),
            vec![Position::JuniorClassPresident]
        );
        assert_eq!(
            Position::class_ballot(3),
            vec![Position::SeniorClassPresident]
        );
        assert_eq!(
            Position::class_ballot(4),
            vec![Position::CommencementSpeaker, Position::ClassName]
        );
        assert!(Position::class_ballot(0).is_empty());
        assert!(Position::class_ballot(5).is_empty());
    }

    #[test]
    fn eligibility_subsets_are_disjoint() {
        // For every eligibility combination, the campus-rep and class-rep
        // subsets must be disjoint from each other and contained in the
        // restricted set, so they can never overlap the at-large subset.
        for campus in [Campus::North, Campus::South] {
            for year in 0..=6 {
                let campus_positions = HashSet::from([campus.rep_position()]);
                let class_positions: HashSet<_> =
                    Position::class_ballot(year).into_iter().collect();

                assert!(campus_positions.is_disjoint(&class_positions));
                assert!(campus_positions.iter().all(Position::is_restricted));
                assert!(class_positions.iter().all(Position::is_restricted));
            }
        }
    }

    #[test]
    fn free_text_positions_are_at_large() {
        let position = Position::Other("student_union_delegate".to_string());
        assert!(!position.is_restricted());
        assert_eq!(position.as_str(), "student_union_delegate");
    }

    #[test]
    fn wire_names_round_trip() {
        let json = serde_json::to_string(&Position::VpFinance).unwrap();
        assert_eq!(json, "\"vp_finance\"");
        let parsed: Position = serde_json::from_str("\"commencement_speaker\"").unwrap();
        assert_eq!(parsed, Position::CommencementSpeaker);
        let custom: Position = serde_json::from_str("\"head_gardener\"").unwrap();
        assert_eq!(custom, Position::Other("head_gardener".to_string()));
    }
}
