//! Per-session bookkeeping of who played, with whom and against whom.
//!
//! The [`ParticipationLedger`] is the only mutable state the scheduler reads. It is changed
//! exclusively through [`record`](ParticipationLedger::record) and
//! [`unrecord`](ParticipationLedger::unrecord), which are exact inverses of each other.
//!
//! Pair frequencies are stored as a single *interaction count*: being teammates and being
//! opponents both count as one occurrence. The teammate/opponent distinction is kept per
//! player in [`ParticipationRecord`].

use std::collections::{HashMap, HashSet};

use time::OffsetDateTime;
use tracing::trace;

use crate::{
    error::ScheduleError,
    matchup::{Match, MatchId},
    player::{Player, PlayerId},
};

/// Unordered pair of players, used as key of the pair frequency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerPair(PlayerId, PlayerId);

impl PlayerPair {
    pub fn new(a: PlayerId, b: PlayerId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// Everything the ledger knows about one player.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipationRecord {
    player: Player,
    doubles_played: u32,
    singles_played: u32,
    // one entry per recorded match, so that unrecording restores the previous timestamp
    played_at: Vec<(MatchId, OffsetDateTime)>,
    partners: HashMap<PlayerId, u32>,
    opponents: HashMap<PlayerId, u32>,
}

impl ParticipationRecord {
    fn new(player: Player) -> Self {
        Self {
            player,
            doubles_played: 0,
            singles_played: 0,
            played_at: vec![],
            partners: HashMap::new(),
            opponents: HashMap::new(),
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn doubles_played(&self) -> u32 {
        self.doubles_played
    }

    pub fn singles_played(&self) -> u32 {
        self.singles_played
    }

    pub fn total_matches(&self) -> u32 {
        self.doubles_played + self.singles_played
    }

    /// When the player last played, `None` if never.
    pub fn last_played_at(&self) -> Option<OffsetDateTime> {
        self.played_at.iter().map(|(_, at)| *at).max()
    }

    /// Everyone who has been on this player's team at least once.
    pub fn partners(&self) -> HashSet<PlayerId> {
        self.partners.keys().copied().collect()
    }

    /// Everyone who has been on the opposite team at least once.
    pub fn opponents(&self) -> HashSet<PlayerId> {
        self.opponents.keys().copied().collect()
    }
}

/// Participation history of one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipationLedger {
    records: HashMap<PlayerId, ParticipationRecord>,
    roster_order: Vec<PlayerId>,
    pair_frequency: HashMap<PlayerPair, u32>,
}

fn increment(map: &mut HashMap<PlayerId, u32>, id: PlayerId) {
    *map.entry(id).or_default() += 1;
}

// callers check the count is positive beforehand
fn decrement(map: &mut HashMap<PlayerId, u32>, id: PlayerId) {
    if let Some(count) = map.get_mut(&id) {
        *count -= 1;
        if *count == 0 {
            map.remove(&id);
        }
    }
}

impl ParticipationLedger {
    /// Creates a ledger with a zeroed record for every player, in roster order.
    pub fn new(players: &[Player]) -> Self {
        let mut ledger = Self::default();
        for player in players {
            ledger.register(player.clone());
        }
        ledger
    }

    /// Adds a player with an empty record. Registering an already known player does nothing.
    pub fn register(&mut self, player: Player) {
        if self.records.contains_key(&player.id) {
            return;
        }
        self.roster_order.push(player.id);
        self.records
            .insert(player.id, ParticipationRecord::new(player));
    }

    /// Records `m` as played now.
    pub fn record(&mut self, m: &Match) -> Result<(), ScheduleError> {
        self.record_at(m, OffsetDateTime::now_utc())
    }

    /// Records `m` as played at `at`.
    ///
    /// # Errors
    /// Fails without touching the ledger if a player of `m` is unknown.
    pub fn record_at(&mut self, m: &Match, at: OffsetDateTime) -> Result<(), ScheduleError> {
        self.check_known(m)?;
        trace!(match_id = %m.id(), "recording {m}");

        for player in m.players() {
            let record = self.record_mut(player.id)?;
            if m.is_doubles() {
                record.doubles_played += 1;
            } else {
                record.singles_played += 1;
            }
            record.played_at.push((m.id(), at));
        }
        for (a, b) in m.teammate_pairs() {
            increment(&mut self.record_mut(a)?.partners, b);
            increment(&mut self.record_mut(b)?.partners, a);
            *self.pair_frequency.entry(PlayerPair::new(a, b)).or_default() += 1;
        }
        for (a, b) in m.opponent_pairs() {
            increment(&mut self.record_mut(a)?.opponents, b);
            increment(&mut self.record_mut(b)?.opponents, a);
            *self.pair_frequency.entry(PlayerPair::new(a, b)).or_default() += 1;
        }
        Ok(())
    }

    /// Reverts a previous [`record`](Self::record) of `m`.
    ///
    /// # Errors
    /// Returns [`ScheduleError::LedgerInconsistency`] if `m` was never recorded (any counter
    /// would go below zero). The ledger is left untouched in that case.
    pub fn unrecord(&mut self, m: &Match) -> Result<(), ScheduleError> {
        self.check_known(m)?;
        self.check_recorded(m)?;
        trace!(match_id = %m.id(), "unrecording {m}");

        for player in m.players() {
            let record = self.record_mut(player.id)?;
            if m.is_doubles() {
                record.doubles_played -= 1;
            } else {
                record.singles_played -= 1;
            }
            if let Some(pos) = record.played_at.iter().position(|(id, _)| *id == m.id()) {
                record.played_at.remove(pos);
            }
        }
        for (a, b) in m.teammate_pairs() {
            decrement(&mut self.record_mut(a)?.partners, b);
            decrement(&mut self.record_mut(b)?.partners, a);
            self.decrement_pair(a, b);
        }
        for (a, b) in m.opponent_pairs() {
            decrement(&mut self.record_mut(a)?.opponents, b);
            decrement(&mut self.record_mut(b)?.opponents, a);
            self.decrement_pair(a, b);
        }
        Ok(())
    }

    fn decrement_pair(&mut self, a: PlayerId, b: PlayerId) {
        let key = PlayerPair::new(a, b);
        if let Some(count) = self.pair_frequency.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.pair_frequency.remove(&key);
            }
        }
    }

    fn check_known(&self, m: &Match) -> Result<(), ScheduleError> {
        match m.players().iter().find(|p| !self.records.contains_key(&p.id)) {
            Some(p) => Err(ScheduleError::UnknownPlayer { id: p.id }),
            None => Ok(()),
        }
    }

    fn check_recorded(&self, m: &Match) -> Result<(), ScheduleError> {
        let inconsistency = |id: PlayerId, reason: String| ScheduleError::LedgerInconsistency {
            id,
            reason,
        };

        for player in m.players() {
            let record = &self.records[&player.id];
            let played = if m.is_doubles() {
                record.doubles_played
            } else {
                record.singles_played
            };
            if played == 0 {
                return Err(inconsistency(
                    player.id,
                    format!("{} has no recorded match to remove", player.name),
                ));
            }
            if !record.played_at.iter().any(|(id, _)| *id == m.id()) {
                return Err(inconsistency(
                    player.id,
                    format!("match {} was never recorded for {}", m.id(), player.name),
                ));
            }
        }
        let pairs = m.teammate_pairs().into_iter().map(|p| (p, true));
        let pairs = pairs.chain(m.opponent_pairs().into_iter().map(|p| (p, false)));
        for ((a, b), teammates) in pairs {
            let relation = if teammates {
                &self.records[&a].partners
            } else {
                &self.records[&a].opponents
            };
            if !relation.contains_key(&b) || self.pair_frequency(a, b) == 0 {
                return Err(inconsistency(a, format!("pair with {b} was never recorded")));
            }
        }
        Ok(())
    }

    fn record_mut(&mut self, id: PlayerId) -> Result<&mut ParticipationRecord, ScheduleError> {
        self.records
            .get_mut(&id)
            .ok_or(ScheduleError::UnknownPlayer { id })
    }

    /// The record of `id`, if the player is part of this ledger.
    pub fn get(&self, id: PlayerId) -> Option<&ParticipationRecord> {
        self.records.get(&id)
    }

    pub fn total_matches(&self, id: PlayerId) -> u32 {
        self.get(id).map_or(0, ParticipationRecord::total_matches)
    }

    pub fn doubles_played(&self, id: PlayerId) -> u32 {
        self.get(id).map_or(0, ParticipationRecord::doubles_played)
    }

    pub fn singles_played(&self, id: PlayerId) -> u32 {
        self.get(id).map_or(0, ParticipationRecord::singles_played)
    }

    pub fn last_played_at(&self, id: PlayerId) -> Option<OffsetDateTime> {
        self.get(id).and_then(ParticipationRecord::last_played_at)
    }

    /// Number of matches `a` and `b` shared, as teammates or opponents. Order independent.
    pub fn pair_frequency(&self, a: PlayerId, b: PlayerId) -> u32 {
        self.pair_frequency
            .get(&PlayerPair::new(a, b))
            .copied()
            .unwrap_or(0)
    }

    pub fn partners_of(&self, id: PlayerId) -> HashSet<PlayerId> {
        self.get(id).map(ParticipationRecord::partners).unwrap_or_default()
    }

    pub fn opponents_of(&self, id: PlayerId) -> HashSet<PlayerId> {
        self.get(id).map(ParticipationRecord::opponents).unwrap_or_default()
    }

    /// True if `a` and `b` have been on the same team at least once.
    pub fn have_partnered(&self, a: PlayerId, b: PlayerId) -> bool {
        self.get(a).is_some_and(|r| r.partners.contains_key(&b))
    }

    /// Position of `id` in the order players were registered.
    pub(crate) fn roster_position(&self, id: PlayerId) -> usize {
        self.roster_order
            .iter()
            .position(|p| *p == id)
            .unwrap_or(usize::MAX)
    }

    /// All records, least played first, then by name.
    pub fn standings(&self) -> Vec<&ParticipationRecord> {
        let mut standings: Vec<_> = self
            .roster_order
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect();
        standings.sort_by(|a, b| {
            a.total_matches()
                .cmp(&b.total_matches())
                .then_with(|| a.player.name.cmp(&b.player.name))
        });
        standings
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use time::macros::datetime;
    use uuid::Uuid;

    use super::*;
    use crate::{
        ids::{IdGenerator, SequentialIds},
        matchup::Side,
    };

    fn roster(n: usize) -> Vec<Player> {
        let mut ids = SequentialIds::default();
        (0..n)
            .map(|i| ids.player(&((b'A' + i as u8) as char).to_string()))
            .collect()
    }

    fn match_of(players: &[Player], id: u128) -> Match {
        Match::new(
            MatchId::from_uuid(Uuid::from_u128(id)),
            players.to_vec(),
            1,
            Side::Left,
        )
        .unwrap()
    }

    #[test]
    fn record_counts_doubles_and_relations() {
        let p = roster(4);
        let mut ledger = ParticipationLedger::new(&p);
        ledger.record(&match_of(&p, 100)).unwrap();

        for player in &p {
            assert_eq!(ledger.doubles_played(player.id), 1);
            assert_eq!(ledger.singles_played(player.id), 0);
            assert!(ledger.last_played_at(player.id).is_some());
        }
        assert_eq!(ledger.partners_of(p[0].id), HashSet::from([p[1].id]));
        assert_eq!(ledger.opponents_of(p[0].id), HashSet::from([p[2].id, p[3].id]));
        assert!(ledger.have_partnered(p[2].id, p[3].id));
        assert!(!ledger.have_partnered(p[0].id, p[2].id));
    }

    #[test]
    fn pair_frequency_counts_every_shared_pair_once() {
        let p = roster(6);
        let mut ledger = ParticipationLedger::new(&p);
        ledger.record(&match_of(&p[..4], 100)).unwrap();

        for (i, a) in p.iter().enumerate() {
            for b in &p[i + 1..] {
                let both_played = i < 4 && p[..4].contains(b);
                assert_eq!(ledger.pair_frequency(a.id, b.id), u32::from(both_played));
                assert_eq!(ledger.pair_frequency(b.id, a.id), u32::from(both_played));
            }
        }
    }

    #[test]
    fn singles_and_three_player_matches() {
        let p = roster(3);
        let mut ledger = ParticipationLedger::new(&p);
        ledger.record(&match_of(&p, 100)).unwrap();

        assert_eq!(ledger.singles_played(p[0].id), 1);
        assert_eq!(ledger.doubles_played(p[0].id), 0);
        assert!(ledger.partners_of(p[0].id).is_empty());
        assert_eq!(ledger.partners_of(p[1].id), HashSet::from([p[2].id]));
        assert_eq!(ledger.pair_frequency(p[0].id, p[1].id), 1);
    }

    #[test]
    fn unrecord_is_exact_inverse() {
        let p = roster(5);
        let mut ledger = ParticipationLedger::new(&p);
        ledger
            .record_at(&match_of(&p[..4], 100), datetime!(2024-05-01 10:00 UTC))
            .unwrap();
        let before = ledger.clone();

        let m = match_of(&[p[0].clone(), p[4].clone(), p[1].clone(), p[2].clone()], 101);
        ledger.record_at(&m, datetime!(2024-05-01 10:30 UTC)).unwrap();
        assert_eq!(
            ledger.last_played_at(p[0].id),
            Some(datetime!(2024-05-01 10:30 UTC))
        );
        ledger.unrecord(&m).unwrap();

        assert_eq!(ledger, before);
        assert_eq!(
            ledger.last_played_at(p[0].id),
            Some(datetime!(2024-05-01 10:00 UTC))
        );
    }

    #[test]
    fn repeated_partnership_survives_one_unrecord() {
        let p = roster(4);
        let mut ledger = ParticipationLedger::new(&p);
        let first = match_of(&p, 100);
        let second = match_of(&p, 101);
        ledger.record(&first).unwrap();
        ledger.record(&second).unwrap();
        ledger.unrecord(&first).unwrap();

        assert!(ledger.have_partnered(p[0].id, p[1].id));
        assert_eq!(ledger.pair_frequency(p[0].id, p[1].id), 1);
    }

    #[test]
    fn unrecording_unknown_match_is_reported() {
        let p = roster(4);
        let mut ledger = ParticipationLedger::new(&p);
        let before = ledger.clone();

        let err = ledger.unrecord(&match_of(&p, 100)).unwrap_err();
        assert!(matches!(err, ScheduleError::LedgerInconsistency { .. }));
        assert_eq!(ledger, before);

        // double undo
        ledger.record(&match_of(&p, 100)).unwrap();
        ledger.unrecord(&match_of(&p, 100)).unwrap();
        assert!(ledger.unrecord(&match_of(&p, 100)).is_err());
    }

    #[test]
    fn recording_unknown_player_fails() {
        let p = roster(4);
        let mut ledger = ParticipationLedger::new(&p[..3]);
        let err = ledger.record(&match_of(&p, 100)).unwrap_err();
        assert_eq!(err, ScheduleError::UnknownPlayer { id: p[3].id });
        assert_eq!(ledger.total_matches(p[0].id), 0);
    }

    #[test]
    fn standings_are_sorted_by_play_count() {
        let p = roster(5);
        let mut ledger = ParticipationLedger::new(&p);
        ledger.record(&match_of(&p[1..], 100)).unwrap();

        let standings = ledger.standings();
        assert_eq!(standings[0].player().name, "A");
        assert_eq!(standings[1].player().name, "B");
        assert_eq!(standings[4].total_matches(), 1);
    }
}
