//! Policies deciding who plays where in the next round.
//!
//! This module defines the [`SchedulingPolicy`] trait and the two built-in policies:
//! - [`RoundRobinPolicy`]: least-played players are spread over every court, then each court's
//!   teams are picked by a bounded random search avoiding repeated partnerships. Works for any
//!   roster size and court count. This is the default policy.
//! - [`FixedCasePolicy`]: a lookup table for 4 to 8 players on one or two courts, filling the
//!   second court with singles or a 2 vs 1 match when doubles do not fit evenly.
//!
//! Policies only decide groupings. Ids are attached by the
//! [`RoundScheduler`](crate::round_scheduler::RoundScheduler).

use std::fmt;

use rand::{seq::SliceRandom, Rng, RngCore};
use tracing::{debug, trace, warn};

use crate::{
    ledger::ParticipationLedger, matchup::Side, pair_scorer::pair_score, player::Player,
};

/// Players in a doubles match.
pub const PLAYERS_PER_COURT: usize = 4;

/// Upper bound of random team arrangements tried per court by [`arrange_teams`].
pub const MAX_ARRANGEMENT_ATTEMPTS: usize = 100;

/// Players assigned to one court, before they receive a match id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourtAssignment {
    /// Team A first, team B second (see [`Match`](crate::matchup::Match)).
    pub players: Vec<Player>,
    pub court: u32,
    pub side: Side,
}

/// A trait defining how available players are grouped into the matches of a round.
///
/// Implementations must never assign a player twice in the same round, and must only use
/// players from `available`. Returning fewer matches than courts (or none) means the round
/// cannot be fully formed, which is not an error.
pub trait SchedulingPolicy {
    /// Name used in logs and validation errors.
    fn name(&self) -> &'static str;

    /// Largest roster this policy handles, `None` if unbounded.
    fn max_players(&self) -> Option<usize>;

    /// Largest number of courts this policy handles, `None` if unbounded.
    fn max_courts(&self) -> Option<usize>;

    /// Groups `available` (in roster order) into the matches of the next round.
    fn plan_round(
        &self,
        available: &[Player],
        courts: usize,
        ledger: &ParticipationLedger,
        rng: &mut dyn RngCore,
    ) -> Vec<CourtAssignment>;
}

/// Which built-in policy a session uses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    #[default]
    RoundRobin,
    FixedCase,
}

impl PolicyKind {
    /// Instantiates the policy.
    pub fn build(self) -> Box<dyn SchedulingPolicy> {
        match self {
            PolicyKind::RoundRobin => Box::new(RoundRobinPolicy),
            PolicyKind::FixedCase => Box::new(FixedCasePolicy),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::RoundRobin => f.write_str("round-robin"),
            PolicyKind::FixedCase => f.write_str("fixed-case"),
        }
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "round-robin" | "round_robin" | "roundrobin" => Ok(PolicyKind::RoundRobin),
            "fixed-case" | "fixed_case" | "fixed" => Ok(PolicyKind::FixedCase),
            other => Err(format!("unknown scheduling policy '{other}'")),
        }
    }
}

/// `players` sorted by ascending total matches. Ties keep roster order.
fn least_played(players: &[Player], ledger: &ParticipationLedger) -> Vec<Player> {
    let mut ranked = players.to_vec();
    ranked.sort_by_key(|p| (ledger.total_matches(p.id), ledger.roster_position(p.id)));
    ranked
}

/// Number of same-team pairs in `players` (team A then team B) who already partnered.
pub fn partnership_violations(players: &[Player], ledger: &ParticipationLedger) -> usize {
    let half = players.len() / 2;
    [&players[..half], &players[half..]]
        .into_iter()
        .map(|team| {
            let mut count = 0usize;
            for (i, a) in team.iter().enumerate() {
                for b in &team[i + 1..] {
                    if ledger.have_partnered(a.id, b.id) {
                        count += 1;
                    }
                }
            }
            count
        })
        .sum()
}

/// Result of [`arrange_teams`].
#[derive(Debug, Clone)]
pub struct Arrangement {
    /// Best order found, team A then team B.
    pub players: Vec<Player>,
    pub violations: usize,
    /// Shuffles performed, at most [`MAX_ARRANGEMENT_ATTEMPTS`].
    pub attempts: usize,
}

/// Bounded random search for a team split without repeated partnerships.
///
/// Shuffles `group` up to [`MAX_ARRANGEMENT_ATTEMPTS`] times, keeps the arrangement with the
/// fewest [`partnership_violations`] and stops at the first one without any.
pub fn arrange_teams<R: Rng + ?Sized>(
    group: &[Player],
    ledger: &ParticipationLedger,
    rng: &mut R,
) -> Arrangement {
    let mut candidate = group.to_vec();
    let mut best = Arrangement {
        players: candidate.clone(),
        violations: usize::MAX,
        attempts: 0,
    };

    for attempt in 1..=MAX_ARRANGEMENT_ATTEMPTS {
        candidate.shuffle(rng);
        let violations = partnership_violations(&candidate, ledger);
        best.attempts = attempt;
        if violations < best.violations {
            best.players.clone_from(&candidate);
            best.violations = violations;
        }
        if violations == 0 {
            break;
        }
    }
    trace!(
        attempts = best.attempts,
        violations = best.violations,
        "team arrangement search done"
    );
    best
}

/// Least-played players spread over every court, teams chosen by [`arrange_teams`].
///
/// Only full doubles courts are scheduled: with 10 players and 3 courts, two matches are
/// returned and 2 players sit out.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoundRobinPolicy;

impl SchedulingPolicy for RoundRobinPolicy {
    fn name(&self) -> &'static str {
        "round-robin"
    }

    fn max_players(&self) -> Option<usize> {
        None
    }

    fn max_courts(&self) -> Option<usize> {
        None
    }

    fn plan_round(
        &self,
        available: &[Player],
        courts: usize,
        ledger: &ParticipationLedger,
        rng: &mut dyn RngCore,
    ) -> Vec<CourtAssignment> {
        let full_courts = courts.min(available.len() / PLAYERS_PER_COURT);
        if full_courts < courts {
            debug!(
                available = available.len(),
                courts, full_courts, "not enough players to fill every court"
            );
        }

        let mut selected = least_played(available, ledger);
        selected.truncate(full_courts * PLAYERS_PER_COURT);
        selected.shuffle(rng);

        selected
            .chunks(PLAYERS_PER_COURT)
            .zip(1..)
            .map(|(group, court)| {
                let arrangement = arrange_teams(group, ledger, &mut *rng);
                if arrangement.violations > 0 {
                    debug!(
                        court,
                        violations = arrangement.violations,
                        "no arrangement without repeated partners"
                    );
                }
                let side = if rng.random_bool(0.5) {
                    Side::Left
                } else {
                    Side::Right
                };
                CourtAssignment {
                    players: arrangement.players,
                    court,
                    side,
                }
            })
            .collect()
    }
}

/// Case table for 4 to 8 players on one or two courts.
///
/// | players | courts | round |
/// |---------|--------|-------|
/// | 4 | any | one doubles match in roster order |
/// | 5 | any | 4 least played play doubles, 1 sits out |
/// | 6 | 1 | 4 least played play doubles, 2 sit out |
/// | 6 | 2 | doubles on court 1, the other 2 play singles on court 2 |
/// | 7 | 1 | 4 least played play doubles, 3 sit out |
/// | 7 | 2 | doubles on court 1, the other 3 play 1 vs 2 on court 2 |
/// | 8 | any | two doubles matches picked by pair scoring |
///
/// Odd courts start on the left side, even courts on the right.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedCasePolicy;

fn fixed_side(court: u32) -> Side {
    if court % 2 == 1 {
        Side::Left
    } else {
        Side::Right
    }
}

fn assignment(players: Vec<Player>, court: u32) -> CourtAssignment {
    CourtAssignment {
        players,
        court,
        side: fixed_side(court),
    }
}

impl SchedulingPolicy for FixedCasePolicy {
    fn name(&self) -> &'static str {
        "fixed-case"
    }

    fn max_players(&self) -> Option<usize> {
        Some(8)
    }

    fn max_courts(&self) -> Option<usize> {
        Some(2)
    }

    fn plan_round(
        &self,
        available: &[Player],
        courts: usize,
        ledger: &ParticipationLedger,
        rng: &mut dyn RngCore,
    ) -> Vec<CourtAssignment> {
        if available.len() < PLAYERS_PER_COURT || courts == 0 {
            debug!(available = available.len(), courts, "round cannot be formed");
            return vec![];
        }

        let ranked = least_played(available, ledger);
        match (available.len(), courts) {
            (4, _) => vec![assignment(available.to_vec(), 1)],
            (5, _) | (6, 1) | (7, 1) => vec![assignment(ranked[..4].to_vec(), 1)],
            (6, _) => vec![
                assignment(ranked[..4].to_vec(), 1),
                assignment(ranked[4..].to_vec(), 2),
            ],
            (7, _) => {
                let mut rest = ranked[4..].to_vec();
                rest.sort_by_key(|p| ledger.singles_played(p.id));
                vec![assignment(ranked[..4].to_vec(), 1), assignment(rest, 2)]
            }
            (n, _) => {
                if n > 8 {
                    warn!(
                        available = n,
                        "fixed-case policy handles 8 players at most, the least played 8 are scheduled"
                    );
                }
                optimize_eight(&ranked[..8], ledger, rng)
            }
        }
    }
}

/// Two doubles matches for exactly 8 players, minimizing repeated pairings.
fn optimize_eight(
    players: &[Player],
    ledger: &ParticipationLedger,
    rng: &mut dyn RngCore,
) -> Vec<CourtAssignment> {
    let pairs = pick_disjoint_pairs(players, ledger, rng);

    // the three ways to put four pairs against each other on two courts
    static GROUPINGS: [[usize; 4]; 3] = [[0, 1, 2, 3], [0, 2, 1, 3], [0, 3, 1, 2]];
    let cross_score = |x: (usize, usize), y: (usize, usize)| -> u32 {
        [x.0, x.1]
            .iter()
            .flat_map(|&a| [y.0, y.1].map(|b| pair_score(players[a].id, players[b].id, ledger)))
            .sum()
    };
    let best = GROUPINGS
        .iter()
        .min_by_key(|g| {
            cross_score(pairs[g[0]], pairs[g[1]]) + cross_score(pairs[g[2]], pairs[g[3]])
        })
        .unwrap_or(&GROUPINGS[0]);
    trace!(?pairs, grouping = ?best, "eight player grouping");

    let team = |p: (usize, usize)| [players[p.0].clone(), players[p.1].clone()];
    vec![
        assignment([team(pairs[best[0]]), team(pairs[best[1]])].concat(), 1),
        assignment([team(pairs[best[2]]), team(pairs[best[3]])].concat(), 2),
    ]
}

/// Four disjoint pairs of indices into `players`, lowest [`pair_score`] first.
fn pick_disjoint_pairs(
    players: &[Player],
    ledger: &ParticipationLedger,
    rng: &mut dyn RngCore,
) -> Vec<(usize, usize)> {
    let n = players.len();
    let mut candidates = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            candidates.push((pair_score(players[i].id, players[j].id, ledger), i, j));
        }
    }
    // stable: equal scores keep enumeration order
    candidates.sort_by_key(|c| c.0);

    let mut used = vec![false; n];
    let mut pairs = Vec::with_capacity(n / 2);
    for (_score, i, j) in candidates {
        if pairs.len() == n / 2 {
            break;
        }
        if !used[i] && !used[j] {
            used[i] = true;
            used[j] = true;
            pairs.push((i, j));
        }
    }

    if pairs.len() < n / 2 {
        warn!("greedy pairing incomplete, pairing the remaining players at random");
        let mut unused: Vec<usize> = (0..n).filter(|&i| !used[i]).collect();
        unused.shuffle(rng);
        pairs.extend(unused.chunks_exact(2).map(|c| (c[0], c[1])));
    }
    if pairs.len() < n / 2 {
        warn!("random pairing failed, shuffling the whole group");
        let mut all: Vec<usize> = (0..n).collect();
        all.shuffle(rng);
        pairs = all.chunks_exact(2).map(|c| (c[0], c[1])).collect();
    }
    pairs
}
