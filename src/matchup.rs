//! A single match played on one court during one round.

use std::{collections::HashSet, fmt};

use uuid::Uuid;

use crate::{
    error::ScheduleError,
    player::{Player, PlayerId},
};

/// Opaque, unique identifier of a [`Match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchId(Uuid);

impl MatchId {
    /// Wraps an already generated identifier.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which end of the court team A starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Players assigned together to a court.
///
/// The first half of `players` is team A, the second half team B. For a 3-player match
/// team A is the single player facing the other two.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "UncheckedMatch"))]
pub struct Match {
    id: MatchId,
    players: Vec<Player>,
    court: u32,
    side: Side,
}

/// Wire form of a [`Match`], validated by [`Match::new`] on the way in.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct UncheckedMatch {
    id: MatchId,
    players: Vec<Player>,
    court: u32,
    side: Side,
}

#[cfg(feature = "serde")]
impl TryFrom<UncheckedMatch> for Match {
    type Error = ScheduleError;

    fn try_from(m: UncheckedMatch) -> Result<Self, Self::Error> {
        Match::new(m.id, m.players, m.court, m.side)
    }
}

impl Match {
    /// Builds a match, checking it holds 2 to 4 distinct players on a positive court number.
    pub fn new(
        id: MatchId,
        players: Vec<Player>,
        court: u32,
        side: Side,
    ) -> Result<Match, ScheduleError> {
        if !(2..=4).contains(&players.len()) {
            return Err(ScheduleError::InvalidMatch {
                reason: format!("a match holds 2 to 4 players, got {}", players.len()),
            });
        }
        if court == 0 {
            return Err(ScheduleError::InvalidMatch {
                reason: "courts are numbered from 1".to_string(),
            });
        }
        let mut seen = HashSet::with_capacity(players.len());
        if let Some(dup) = players.iter().find(|p| !seen.insert(p.id)) {
            return Err(ScheduleError::InvalidMatch {
                reason: format!("{} is listed twice", dup.name),
            });
        }
        Ok(Match {
            id,
            players,
            court,
            side,
        })
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn court(&self) -> u32 {
        self.court
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// True for a 2 vs 2 match.
    pub fn is_doubles(&self) -> bool {
        self.players.len() == 4
    }

    pub fn team_a(&self) -> &[Player] {
        &self.players[..self.players.len() / 2]
    }

    pub fn team_b(&self) -> &[Player] {
        &self.players[self.players.len() / 2..]
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    /// Every unordered pair of players on the same team.
    pub fn teammate_pairs(&self) -> Vec<(PlayerId, PlayerId)> {
        let mut pairs = Vec::new();
        for team in [self.team_a(), self.team_b()] {
            for (i, a) in team.iter().enumerate() {
                for b in &team[i + 1..] {
                    pairs.push((a.id, b.id));
                }
            }
        }
        pairs
    }

    /// Every pair made of one player from each team.
    pub fn opponent_pairs(&self) -> Vec<(PlayerId, PlayerId)> {
        let mut pairs = Vec::new();
        for a in self.team_a() {
            for b in self.team_b() {
                pairs.push((a.id, b.id));
            }
        }
        pairs
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |team: &[Player]| {
            team.iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(" & ")
        };
        write!(
            f,
            "court {} ({}): {} vs {}",
            self.court,
            self.side,
            names(self.team_a()),
            names(self.team_b())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{IdGenerator, SequentialIds};

    fn players(names: &[&str]) -> Vec<Player> {
        let mut ids = SequentialIds::default();
        names.iter().map(|n| ids.player(n)).collect()
    }

    fn match_id() -> MatchId {
        MatchId::from_uuid(Uuid::from_u128(1_000))
    }

    #[test]
    fn doubles_teams_and_pairs() {
        let m = Match::new(match_id(), players(&["A", "B", "C", "D"]), 1, Side::Left).unwrap();
        assert!(m.is_doubles());
        assert_eq!(m.teammate_pairs().len(), 2);
        assert_eq!(m.opponent_pairs().len(), 4);
        assert_eq!(m.to_string(), "court 1 (left): A & B vs C & D");
    }

    #[test]
    fn three_player_match_has_single_player_team_a() {
        let m = Match::new(match_id(), players(&["A", "B", "C"]), 2, Side::Right).unwrap();
        assert_eq!(m.team_a().len(), 1);
        assert_eq!(m.team_b().len(), 2);
        assert_eq!(m.teammate_pairs().len(), 1);
        assert_eq!(m.opponent_pairs().len(), 2);
        assert_eq!(m.to_string(), "court 2 (right): A vs B & C");
    }

    #[test]
    fn rejects_invalid_matches() {
        assert!(Match::new(match_id(), players(&["A"]), 1, Side::Left).is_err());
        assert!(Match::new(match_id(), players(&["A", "B", "C", "D", "E"]), 1, Side::Left).is_err());
        assert!(Match::new(match_id(), players(&["A", "B"]), 0, Side::Left).is_err());

        let mut dup = players(&["A", "B", "C"]);
        dup.push(dup[0].clone());
        assert!(Match::new(match_id(), dup, 1, Side::Left).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializing_validates_the_match() {
        let p = players(&["A", "B", "C", "D"]);
        let m = Match::new(match_id(), p.clone(), 1, Side::Left).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(serde_json::from_str::<Match>(&json).unwrap(), m);

        let on_court_zero = json.replace("\"court\":1", "\"court\":0");
        let err = serde_json::from_str::<Match>(&on_court_zero).unwrap_err();
        assert!(err.to_string().contains("courts are numbered from 1"), "{err}");

        let a = serde_json::to_value(&p[0]).unwrap();
        let b = serde_json::to_value(&p[1]).unwrap();
        let repeated = serde_json::json!({
            "id": match_id(),
            "players": [a.clone(), a, b],
            "court": 1,
            "side": "Left",
        });
        let err = serde_json::from_value::<Match>(repeated).unwrap_err();
        assert!(err.to_string().contains("A is listed twice"), "{err}");
    }
}
