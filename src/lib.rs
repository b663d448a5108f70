//! # Court Rotation
//!
//! Fair match scheduling for racquet-sport sessions played on one or more courts.
//!
//! Given a roster and the history of the session, it decides who plays the next round, on
//! which court, with whom and against whom. It tries to:
//! - give everyone a similar number of matches (least-played players are picked first)
//! - avoid playing with the same partner twice
//! - vary opponents
//!
//! It provides:
//! - Session construction and round advancement ([`SessionBuilder`](crate::session::SessionBuilder),
//!   [`RoundAdvancer`](crate::session::RoundAdvancer))
//! - Scheduling policies via the [`SchedulingPolicy`](crate::scheduling_policy::SchedulingPolicy)
//!   trait, with the built-in `RoundRobinPolicy` (default) and `FixedCasePolicy`
//! - A [`ParticipationLedger`](crate::ledger::ParticipationLedger) recording who played with
//!   and against whom, and the [`pair_score`](crate::pair_scorer::pair_score) fairness score
//!
//! Everything is synchronous and in-memory. Randomness comes from a seedable generator owned
//! by each session: the same seed and the same completed matches always produce the same rounds.
//!
//! # Usage Example
//!
//! ```
//! use court_rotation::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let players: Vec<Player> = ["Ana", "Ben", "Cleo", "Dev", "Eli", "Fay", "Gus", "Hana"]
//!         .into_iter()
//!         .map(Player::with_random_id)
//!         .collect();
//!
//!     let config = Configuration::new().with_seed(2024);
//!     let (mut session, mut advancer) = SessionBuilder::new(config).build(players, 2)?;
//!
//!     let mut current = session.matches().to_vec();
//!     for _ in 0..3 {
//!         for m in &current {
//!             println!("round {}: {m}", advancer.current_round_number());
//!         }
//!         // every match of the round is played before advancing
//!         current = advancer.advance_round(&current)?;
//!         session.append_round(&current);
//!     }
//!
//!     for record in advancer.ledger().standings() {
//!         println!("{}: {} matches", record.player(), record.total_matches());
//!     }
//!     Ok(())
//! }
//! ```

pub use anyhow;
pub mod configuration;
pub mod error;
pub mod ids;
pub mod ledger;
mod logger;
pub mod matchup;
pub mod pair_scorer;
pub mod player;
pub mod round_scheduler;
pub mod scheduling_policy;
pub mod session;

/// Commonly used types and traits for quick access.
///
/// ```rust
/// use court_rotation::prelude::*;
/// ```
pub mod prelude {
    pub use crate::configuration::Configuration;
    pub use crate::error::ScheduleError;
    pub use crate::ids::{IdGenerator, RandomIds, SequentialIds};
    pub use crate::ledger::ParticipationLedger;
    pub use crate::matchup::{Match, MatchId, Side};
    pub use crate::pair_scorer::pair_score;
    pub use crate::player::{Player, PlayerId};
    pub use crate::round_scheduler::RoundScheduler;
    pub use crate::scheduling_policy::{
        FixedCasePolicy, PolicyKind, RoundRobinPolicy, SchedulingPolicy,
    };
    pub use crate::session::{RoundAdvancer, Session, SessionBuilder};
}
