//! Fairness score of putting two players together.

use crate::{ledger::ParticipationLedger, player::PlayerId};

/// Weight of one previous shared match in [`pair_score`].
pub const REPEAT_PAIRING_WEIGHT: u32 = 10;

/// Lower is fairer: `10 × pair_frequency(a, b) + total_matches(a) + total_matches(b)`.
///
/// Repeated pairings dominate the score, overall play count only breaks ties. The same score
/// is used to choose teammates and opponents.
pub fn pair_score(a: PlayerId, b: PlayerId, ledger: &ParticipationLedger) -> u32 {
    REPEAT_PAIRING_WEIGHT * ledger.pair_frequency(a, b)
        + ledger.total_matches(a)
        + ledger.total_matches(b)
}
