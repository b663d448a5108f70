//! Unique id generation for players and matches.
//!
//! The scheduler does not care how ids look like, only that they never collide within a
//! session. [`RandomIds`] is used by default; [`SequentialIds`] gives reproducible ids in tests.

use uuid::Uuid;

use crate::player::{Player, PlayerId};

/// Source of fresh, collision-resistant identifiers.
pub trait IdGenerator {
    /// Returns an id that was never returned before by this generator.
    fn next_id(&mut self) -> Uuid;

    /// Convenience helper creating a [`Player`] with a fresh id.
    fn player(&mut self, name: &str) -> Player {
        Player::new(PlayerId::from_uuid(self.next_id()), name)
    }
}

/// Random version 4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Monotonic ids `1, 2, 3, ...` encoded as UUIDs.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    last: u128,
}

impl SequentialIds {
    /// Starts after `offset`, so that two generators can share a session without colliding.
    pub fn starting_after(offset: u128) -> Self {
        Self { last: offset }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Uuid {
        self.last += 1;
        Uuid::from_u128(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_distinct() {
        let mut ids = SequentialIds::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(b, Uuid::from_u128(2));
    }

    #[test]
    fn offset_generators_do_not_collide() {
        let mut first = SequentialIds::default();
        let mut second = SequentialIds::starting_after(1_000);
        let from_first: Vec<_> = (0..10).map(|_| first.next_id()).collect();
        assert!((0..10).all(|_| !from_first.contains(&second.next_id())));
    }
}
