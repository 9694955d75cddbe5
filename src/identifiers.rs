use std::{fmt, hash::Hash, marker::PhantomData, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::{matches::Match, player::Player, tournament::Tournament};

/// A generic type-checked wrapper around a `Uuid`, used so player ids, match ids, and tournament
/// ids can't be mixed up at the type level even though they're all just opaque uuids underneath.
#[derive(Debug)]
pub struct TypeId<T>(Uuid, PhantomData<T>);

/// A type-checked id for players
pub type PlayerId = TypeId<Player>;
/// A type-checked id for matches
pub type MatchId = TypeId<Match>;
/// A type-checked id for tournaments
pub type TournamentId = TypeId<Tournament>;

impl<T> TypeId<T> {
    /// Wraps a raw uuid in a typed id
    pub fn new(id: Uuid) -> Self {
        Self(id, PhantomData)
    }
}

impl<T> Default for TypeId<T> {
    fn default() -> Self {
        Self(Uuid::nil(), PhantomData)
    }
}

impl<T> Clone for TypeId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypeId<T> {}

impl<T> Hash for TypeId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<T> PartialEq for TypeId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for TypeId<T> {}

impl<T> From<TypeId<T>> for Uuid {
    fn from(other: TypeId<T>) -> Uuid {
        other.0
    }
}

impl<T> From<Uuid> for TypeId<T> {
    fn from(other: Uuid) -> TypeId<T> {
        TypeId(other, PhantomData)
    }
}

impl<'de, T> Deserialize<'de> for TypeId<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Uuid::deserialize(deserializer).map(Into::into)
    }
}

impl<T> Serialize for TypeId<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> FromStr for TypeId<T> {
    type Err = <Uuid as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Into::into)
    }
}

impl<T> fmt::Display for TypeId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mints fresh, unique opaque ids. The tournament is the only thing responsible for handing out
/// ids and detecting collisions; this trait exists so the source of randomness can be swapped out
/// (e.g. for deterministic ids in tests) without touching the registries that consume them.
pub trait IdSource<T> {
    /// Returns a new id. Implementations are not required to guarantee uniqueness on their own;
    /// callers regenerate on collision.
    fn next_id(&mut self) -> TypeId<T>;
}

/// The default id source, backed by random v4 uuids.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UuidSource;

impl<T> IdSource<T> for UuidSource {
    fn next_id(&mut self) -> TypeId<T> {
        TypeId::new(Uuid::new_v4())
    }
}
