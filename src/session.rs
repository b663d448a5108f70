//! Session lifecycle: building the first round and advancing to the next ones.
//!
//! [`SessionBuilder`] validates the roster and schedules round 1. It returns the
//! [`Session`] (what the caller displays) together with a [`RoundAdvancer`], which owns the
//! [`ParticipationLedger`] and the round counter of that session and nothing else: two sessions
//! never share state.
//!
//! The caller is expected to serialize interactions: mark the matches of the current round
//! complete, then call [`RoundAdvancer::advance_round`] once with all of them, and append the
//! returned matches to the session.
//!
//! ```
//! use court_rotation::prelude::*;
//!
//! let players: Vec<Player> = ["Ana", "Ben", "Cleo", "Dev", "Eli"]
//!     .into_iter()
//!     .map(Player::with_random_id)
//!     .collect();
//!
//! let config = Configuration::new().with_seed(7);
//! let (mut session, mut advancer) = SessionBuilder::new(config).build(players, 1)?;
//! assert_eq!(session.matches().len(), 1);
//!
//! let completed = session.matches().to_vec();
//! let round_two = advancer.advance_round(&completed)?;
//! assert_eq!(advancer.current_round_number(), 2);
//! session.append_round(&round_two);
//! # Ok::<(), court_rotation::error::ScheduleError>(())
//! ```

use std::collections::HashSet;

use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, instrument, trace, warn};

use crate::configuration::Configuration;
use crate::error::ScheduleError;
use crate::ids::{IdGenerator, RandomIds};
use crate::ledger::ParticipationLedger;
use crate::logger::init_logger;
use crate::matchup::Match;
use crate::player::{Player, PlayerId};
use crate::round_scheduler::RoundScheduler;
use crate::scheduling_policy::PLAYERS_PER_COURT;

/// Smallest roster a session accepts.
pub const MIN_PLAYERS: usize = PLAYERS_PER_COURT;

/// Roster, court count and every match generated so far.
///
/// Round numbers are not stored here; the caller tags matches with
/// [`RoundAdvancer::current_round_number`] when appending them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Session {
    players: Vec<Player>,
    number_of_courts: usize,
    matches: Vec<Match>,
}

impl Session {
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn number_of_courts(&self) -> usize {
        self.number_of_courts
    }

    /// All matches of all rounds, in scheduling order.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn append_round(&mut self, round: &[Match]) {
        self.matches.extend_from_slice(round);
    }
}

/// Validates a roster and schedules the first round of a session.
pub struct SessionBuilder {
    config: Configuration,
    ids: Box<dyn IdGenerator>,
}

impl SessionBuilder {
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            ids: Box::new(RandomIds),
        }
    }

    /// Use `ids` for match ids instead of random UUIDs.
    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Builds a session and schedules round 1.
    ///
    /// # Errors
    /// Returns a validation error if the roster has fewer than 4 players, contains the same
    /// player twice, exceeds the policy or configured limit, or if the court count is not
    /// supported.
    #[instrument(skip_all, fields(players = players.len(), courts = number_of_courts))]
    pub fn build(
        self,
        players: Vec<Player>,
        number_of_courts: usize,
    ) -> Result<(Session, RoundAdvancer), ScheduleError> {
        if self.config.log {
            if let Err(err) = init_logger() {
                warn!("file logging disabled: {err:#}");
            }
        }
        trace!(config = ?self.config);

        let policy = self.config.policy.build();
        validate_roster(&players, self.config.max_players, policy.max_players(), policy.name())?;
        if number_of_courts == 0 {
            return Err(ScheduleError::InvalidCourtCount {
                got: 0,
                reason: "at least one court is required",
            });
        }
        if policy.max_courts().is_some_and(|max| number_of_courts > max) {
            return Err(ScheduleError::InvalidCourtCount {
                got: number_of_courts,
                reason: "the fixed-case policy uses at most 2 courts",
            });
        }

        let seed = self.config.seed.unwrap_or_else(|| {
            let seed = rand::random();
            info!(seed, "no seed configured, drawn one at random");
            seed
        });
        let scheduler = RoundScheduler::new(policy, StdRng::seed_from_u64(seed), self.ids);

        let mut advancer = RoundAdvancer {
            ledger: ParticipationLedger::new(&players),
            roster: players.clone(),
            number_of_courts,
            scheduler,
            round: 1,
            sitting_out: HashSet::new(),
        };
        let first_round = advancer.schedule()?;
        info!(
            policy = advancer.scheduler.policy().name(),
            matches = first_round.len(),
            "session started"
        );

        let session = Session {
            players,
            number_of_courts,
            matches: first_round,
        };
        Ok((session, advancer))
    }
}

fn validate_roster(
    players: &[Player],
    configured_max: Option<usize>,
    policy_max: Option<usize>,
    policy_name: &'static str,
) -> Result<(), ScheduleError> {
    if players.len() < MIN_PLAYERS {
        return Err(ScheduleError::RosterTooSmall {
            min: MIN_PLAYERS,
            got: players.len(),
        });
    }
    if let Some(max) = policy_max.filter(|&max| players.len() > max) {
        return Err(ScheduleError::RosterTooLarge {
            limited_by: policy_name,
            max,
            got: players.len(),
        });
    }
    if let Some(max) = configured_max.filter(|&max| players.len() > max) {
        return Err(ScheduleError::RosterTooLarge {
            limited_by: "configuration",
            max,
            got: players.len(),
        });
    }
    let mut seen = HashSet::with_capacity(players.len());
    if let Some(dup) = players.iter().find(|p| !seen.insert(p.id)) {
        return Err(ScheduleError::DuplicatePlayer { id: dup.id });
    }
    Ok(())
}

/// Owns the ledger and round counter of one session and schedules its following rounds.
pub struct RoundAdvancer {
    roster: Vec<Player>,
    number_of_courts: usize,
    ledger: ParticipationLedger,
    scheduler: RoundScheduler,
    round: u32,
    sitting_out: HashSet<PlayerId>,
}

impl RoundAdvancer {
    /// Number of the round whose matches were returned last (round 1 right after building).
    pub fn current_round_number(&self) -> u32 {
        self.round
    }

    pub fn ledger(&self) -> &ParticipationLedger {
        &self.ledger
    }

    /// Folds the completed matches of the current round into the ledger and schedules the
    /// next round. An empty result means no court can be filled with the available players.
    ///
    /// # Errors
    /// Fails, without recording anything, if a match contains a player outside the roster.
    #[instrument(skip_all, fields(round = self.round, completed = completed.len()))]
    pub fn advance_round(&mut self, completed: &[Match]) -> Result<Vec<Match>, ScheduleError> {
        for m in completed {
            if let Some(p) = m.players().iter().find(|p| !self.roster.contains(p)) {
                return Err(ScheduleError::UnknownPlayer { id: p.id });
            }
        }
        for m in completed {
            self.ledger.record(m)?;
        }

        self.round += 1;
        let next = self.schedule()?;
        if next.is_empty() {
            warn!(round = self.round, "not enough available players for a single court");
        }
        Ok(next)
    }

    /// Reverts a match previously folded in by [`advance_round`](Self::advance_round).
    ///
    /// # Errors
    /// [`ScheduleError::LedgerInconsistency`] if the match was not recorded (or already undone).
    pub fn undo(&mut self, m: &Match) -> Result<(), ScheduleError> {
        info!(match_id = %m.id(), "undo {m}");
        self.ledger.unrecord(m)
    }

    /// Leaves `id` out of the following rounds until [`rejoin`](Self::rejoin) is called.
    pub fn sit_out(&mut self, id: PlayerId) -> Result<(), ScheduleError> {
        if !self.roster.iter().any(|p| p.id == id) {
            return Err(ScheduleError::UnknownPlayer { id });
        }
        self.sitting_out.insert(id);
        Ok(())
    }

    /// Makes `id` available again. Returns false if the player was not sitting out.
    pub fn rejoin(&mut self, id: PlayerId) -> bool {
        self.sitting_out.remove(&id)
    }

    fn schedule(&mut self) -> Result<Vec<Match>, ScheduleError> {
        let available: Vec<Player> = self
            .roster
            .iter()
            .filter(|p| !self.sitting_out.contains(&p.id))
            .cloned()
            .collect();
        self.scheduler
            .next_round(&available, self.number_of_courts, &self.ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::scheduling_policy::PolicyKind;

    fn roster(n: usize) -> Vec<Player> {
        let mut ids = SequentialIds::default();
        (0..n).map(|i| ids.player(&format!("P{i}"))).collect()
    }

    fn builder(policy: PolicyKind) -> SessionBuilder {
        SessionBuilder::new(Configuration::new().with_policy(policy).with_seed(11))
            .with_id_generator(Box::new(SequentialIds::starting_after(1_000)))
    }

    #[test]
    fn rejects_small_roster() {
        let err = builder(PolicyKind::RoundRobin)
            .build(roster(3), 1)
            .err()
            .unwrap();
        assert_eq!(err, ScheduleError::RosterTooSmall { min: 4, got: 3 });
    }

    #[test]
    fn rejects_duplicates_and_bad_courts() {
        let mut players = roster(4);
        players.push(players[0].clone());
        assert!(matches!(
            builder(PolicyKind::RoundRobin).build(players, 1),
            Err(ScheduleError::DuplicatePlayer { .. })
        ));
        assert!(matches!(
            builder(PolicyKind::RoundRobin).build(roster(4), 0),
            Err(ScheduleError::InvalidCourtCount { got: 0, .. })
        ));
        assert!(matches!(
            builder(PolicyKind::FixedCase).build(roster(8), 3),
            Err(ScheduleError::InvalidCourtCount { got: 3, .. })
        ));
    }

    #[test]
    fn roster_limits() {
        assert!(matches!(
            builder(PolicyKind::FixedCase).build(roster(9), 2),
            Err(ScheduleError::RosterTooLarge { max: 8, got: 9, .. })
        ));
        assert!(builder(PolicyKind::RoundRobin).build(roster(12), 3).is_ok());

        let limited = SessionBuilder::new(Configuration::new().with_seed(1).with_max_players(5));
        assert!(matches!(
            limited.build(roster(6), 1),
            Err(ScheduleError::RosterTooLarge {
                limited_by: "configuration",
                ..
            })
        ));
    }

    #[test]
    fn advancing_records_and_counts_rounds() {
        let (session, mut advancer) = builder(PolicyKind::RoundRobin).build(roster(5), 1).unwrap();
        assert_eq!(advancer.current_round_number(), 1);

        let first = session.matches().to_vec();
        advancer.advance_round(&first).unwrap();
        assert_eq!(advancer.current_round_number(), 2);
        for p in first[0].players() {
            assert_eq!(advancer.ledger().doubles_played(p.id), 1);
        }
    }

    #[test]
    fn undo_reverts_and_double_undo_fails() {
        let (session, mut advancer) = builder(PolicyKind::FixedCase).build(roster(4), 1).unwrap();
        let first = session.matches().to_vec();
        advancer.advance_round(&first).unwrap();

        advancer.undo(&first[0]).unwrap();
        assert_eq!(advancer.ledger(), &ParticipationLedger::new(session.players()));
        assert!(matches!(
            advancer.undo(&first[0]),
            Err(ScheduleError::LedgerInconsistency { .. })
        ));
    }

    #[test]
    fn sitting_out_players_are_not_scheduled() {
        let players = roster(5);
        let resting = players[0].id;
        let (_, mut advancer) = builder(PolicyKind::RoundRobin).build(players, 1).unwrap();

        advancer.sit_out(resting).unwrap();
        for _ in 0..3 {
            let round = advancer.advance_round(&[]).unwrap();
            assert!(round.iter().all(|m| !m.contains(resting)));
        }
        assert!(advancer.rejoin(resting));
        assert!(!advancer.rejoin(resting));
    }

    #[test]
    fn empty_round_when_too_many_sit_out() {
        let players = roster(4);
        let resting = players[3].id;
        let (_, mut advancer) = builder(PolicyKind::RoundRobin).build(players, 1).unwrap();
        advancer.sit_out(resting).unwrap();
        assert!(advancer.advance_round(&[]).unwrap().is_empty());
        assert_eq!(advancer.current_round_number(), 2);
    }

    #[test]
    fn completed_match_from_another_session_is_rejected() {
        let (other, _) = builder(PolicyKind::RoundRobin)
            .with_id_generator(Box::new(SequentialIds::default()))
            .build(
                {
                    let mut ids = SequentialIds::starting_after(500);
                    (0..4).map(|i| ids.player(&format!("Q{i}"))).collect()
                },
                1,
            )
            .unwrap();
        let (_, mut advancer) = builder(PolicyKind::RoundRobin).build(roster(4), 1).unwrap();
        assert!(matches!(
            advancer.advance_round(other.matches()),
            Err(ScheduleError::UnknownPlayer { .. })
        ));
        assert_eq!(advancer.current_round_number(), 1);
    }
}
