//! Roster entries.

use std::{fmt, hash::Hash};

use uuid::Uuid;

/// Opaque, unique identifier of a [`Player`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Wraps an already generated identifier.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying identifier.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A participant of the session.
///
/// Created once when the roster is entered and never modified by the scheduler.
/// Two players are equal when their ids are equal, regardless of their names.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Player {}

impl Hash for Player {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Player {
    /// Creates a player with an explicit id.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Player {
        Player {
            id,
            name: name.into(),
        }
    }

    /// Creates a player with a fresh random id.
    pub fn with_random_id(name: impl Into<String>) -> Player {
        Player::new(PlayerId::from_uuid(Uuid::new_v4()), name)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_name() {
        let id = PlayerId::from_uuid(Uuid::from_u128(7));
        assert_eq!(Player::new(id, "Ana"), Player::new(id, "Anna"));
        assert_ne!(Player::with_random_id("Ana"), Player::with_random_id("Ana"));
    }
}
