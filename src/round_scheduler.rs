//! One round at a time: policy output turned into validated, identified matches.

use std::collections::HashSet;

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, trace};

use crate::{
    error::ScheduleError,
    ids::{IdGenerator, RandomIds},
    ledger::ParticipationLedger,
    matchup::{Match, MatchId},
    player::Player,
    scheduling_policy::SchedulingPolicy,
};

/// Turns a pool of available players into the concrete matches of one round.
///
/// Owns the scheduling policy, the random source and the match id generator, so that two
/// schedulers built with the same seed and id generator produce identical rounds.
pub struct RoundScheduler {
    policy: Box<dyn SchedulingPolicy>,
    rng: StdRng,
    ids: Box<dyn IdGenerator>,
}

impl RoundScheduler {
    pub fn new(policy: Box<dyn SchedulingPolicy>, rng: StdRng, ids: Box<dyn IdGenerator>) -> Self {
        RoundScheduler { policy, rng, ids }
    }

    /// Seeded scheduler with random match ids.
    pub fn with_seed(policy: Box<dyn SchedulingPolicy>, seed: u64) -> Self {
        Self::new(policy, StdRng::seed_from_u64(seed), Box::new(RandomIds))
    }

    pub fn policy(&self) -> &dyn SchedulingPolicy {
        self.policy.as_ref()
    }

    /// Matches of the next round, court 1 first.
    ///
    /// An empty list means not even one court can be filled with `available`.
    ///
    /// # Errors
    /// Only if the policy breaks its contract (a player scheduled twice or an invalid match).
    pub fn next_round(
        &mut self,
        available: &[Player],
        courts: usize,
        ledger: &ParticipationLedger,
    ) -> Result<Vec<Match>, ScheduleError> {
        trace!(
            policy = self.policy.name(),
            available = available.len(),
            courts,
            "next round"
        );
        let assignments = self
            .policy
            .plan_round(available, courts, ledger, &mut self.rng);

        let mut scheduled = HashSet::new();
        let mut matches = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            if let Some(twice) = assignment.players.iter().find(|p| !scheduled.insert(p.id)) {
                return Err(ScheduleError::InvalidMatch {
                    reason: format!("{} scheduled twice in the same round", twice.name),
                });
            }
            let id = MatchId::from_uuid(self.ids.next_id());
            let m = Match::new(id, assignment.players, assignment.court, assignment.side)?;
            debug!("{m}");
            matches.push(m);
        }
        Ok(matches)
    }
}
