//! Tournament manager models: tournaments, teams, the points table and
//! match results.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Most wickets a side can lose in an innings.
pub const MAX_WICKETS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub tournament_id: i64,
    pub tournament_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub team_id: i64,
    pub team_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsTableRow {
    pub team_name: String,
    #[serde(default)]
    pub played: u32,
    #[serde(default)]
    pub won: u32,
    #[serde(default)]
    pub lost: u32,
    #[serde(default)]
    pub tied: u32,
    #[serde(default)]
    pub no_result: u32,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub net_match_rate: f64,
}

impl PointsTableRow {
    /// Standings order: points, then net run rate, then name.
    fn standings_cmp(&self, other: &Self) -> Ordering {
        other
            .points
            .cmp(&self.points)
            .then_with(|| {
                other
                    .net_match_rate
                    .partial_cmp(&self.net_match_rate)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| self.team_name.cmp(&other.team_name))
    }
}

/// Points table for one tournament.
///
/// The manager answers either with a bare row list or with
/// `{ tournamentId, pointsTable }`; both decode into this.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "PointsTableWire")]
pub struct PointsTable {
    pub tournament_id: Option<i64>,
    pub rows: Vec<PointsTableRow>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PointsTableWire {
    Rows(Vec<PointsTableRow>),
    #[serde(rename_all = "camelCase")]
    Wrapped {
        tournament_id: Option<i64>,
        #[serde(default)]
        points_table: Vec<PointsTableRow>,
    },
}

impl From<PointsTableWire> for PointsTable {
    fn from(wire: PointsTableWire) -> Self {
        match wire {
            PointsTableWire::Rows(rows) => Self {
                tournament_id: None,
                rows,
            },
            PointsTableWire::Wrapped {
                tournament_id,
                points_table,
            } => Self {
                tournament_id,
                rows: points_table,
            },
        }
    }
}

impl PointsTable {
    /// Rows sorted into standings order.
    pub fn standings(&self) -> Vec<&PointsTableRow> {
        let mut rows: Vec<&PointsTableRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| a.standings_cmp(b));
        rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchResultStatus {
    Completed,
    Tied,
    NoResult,
}

impl MatchResultStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "COMPLETED" => Some(Self::Completed),
            "TIED" => Some(Self::Tied),
            "NO_RESULT" => Some(Self::NoResult),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "COMPLETED",
            Self::Tied => "TIED",
            Self::NoResult => "NO_RESULT",
        }
    }
}

impl fmt::Display for MatchResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum MatchResultError {
    #[error("Match number should be greater than or equal to 1")]
    MatchNumber,

    #[error("Team one and team two must be different teams")]
    SameTeams,

    #[error("Winner and loser are required for a completed match")]
    MissingOutcome,

    #[error("Winner and loser must be the two teams that played")]
    OutcomeNotPlayed,

    #[error("A {0} match has no winner or loser")]
    UnexpectedOutcome(MatchResultStatus),

    #[error("Wickets should be between 0 and 10")]
    Wickets,

    #[error("Overs played should be greater than or equal to 0")]
    Overs,
}

/// Body of the add-match-result endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMatchResultRequest {
    pub match_number: u32,
    pub tournament_id: i64,
    pub winner_team_id: Option<i64>,
    pub loser_team_id: Option<i64>,
    pub team_one_id: i64,
    pub team_two_id: i64,
    pub team_one_score: u32,
    pub team_two_score: u32,
    pub team_one_wickets: u32,
    pub team_two_wickets: u32,
    pub team_one_overs_played: f64,
    pub team_two_overs_played: f64,
    pub match_result_status: MatchResultStatus,
}

impl AddMatchResultRequest {
    /// Check the result before it is sent. Mirrors the manager's own
    /// request validation plus the winner/loser consistency rules.
    pub fn validate(&self) -> Result<(), MatchResultError> {
        if self.match_number < 1 {
            return Err(MatchResultError::MatchNumber);
        }
        if self.team_one_id == self.team_two_id {
            return Err(MatchResultError::SameTeams);
        }
        if self.team_one_wickets > MAX_WICKETS || self.team_two_wickets > MAX_WICKETS {
            return Err(MatchResultError::Wickets);
        }
        if !(self.team_one_overs_played >= 0.0 && self.team_two_overs_played >= 0.0) {
            return Err(MatchResultError::Overs);
        }

        match self.match_result_status {
            MatchResultStatus::Completed => {
                let (Some(winner), Some(loser)) = (self.winner_team_id, self.loser_team_id) else {
                    return Err(MatchResultError::MissingOutcome);
                };
                let played = [self.team_one_id, self.team_two_id];
                if winner == loser || !played.contains(&winner) || !played.contains(&loser) {
                    return Err(MatchResultError::OutcomeNotPlayed);
                }
            }
            status @ (MatchResultStatus::Tied | MatchResultStatus::NoResult) => {
                if self.winner_team_id.is_some() || self.loser_team_id.is_some() {
                    return Err(MatchResultError::UnexpectedOutcome(status));
                }
            }
        }
        Ok(())
    }
}
