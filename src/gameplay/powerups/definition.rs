use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Applies (`activating == true`) or reverses a gameplay modifier on the subject.
///
/// Calling with `true` then `false` must leave the subject as it was.
pub trait PowerupEffect<S>: Send + Sync {
    fn apply(&self, subject: &mut S, activating: bool);
}

impl<S, F> PowerupEffect<S> for F
where
    F: Fn(&mut S, bool) + Send + Sync,
{
    fn apply(&self, subject: &mut S, activating: bool) {
        self(subject, activating)
    }
}

pub struct PowerupDefinition<S> {
    pub kind: String,
    pub sprite_key: String,
    pub duration_ms: u64,
    pub effect: Arc<dyn PowerupEffect<S>>,
}

impl<S> PowerupDefinition<S> {
    pub fn new(
        kind: impl Into<String>,
        sprite_key: impl Into<String>,
        duration_ms: u64,
        effect: impl PowerupEffect<S> + 'static,
    ) -> Self {
        Self {
            kind: kind.into(),
            sprite_key: sprite_key.into(),
            duration_ms,
            effect: Arc::new(effect),
        }
    }

    /// Metadata stamped onto a spawned representation.
    pub fn tag(&self) -> PickupTag<S> {
        PickupTag {
            kind: self.kind.clone(),
            sprite_key: self.sprite_key.clone(),
            duration_ms: self.duration_ms,
            effect: Arc::clone(&self.effect),
        }
    }
}

impl<S> Clone for PowerupDefinition<S> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            sprite_key: self.sprite_key.clone(),
            duration_ms: self.duration_ms,
            effect: Arc::clone(&self.effect),
        }
    }
}

impl<S> fmt::Debug for PowerupDefinition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PowerupDefinition")
            .field("kind", &self.kind)
            .field("sprite_key", &self.sprite_key)
            .field("duration_ms", &self.duration_ms)
            .finish_non_exhaustive()
    }
}

/// `(kind, duration, effect)` carried by a spawned-but-not-collected representation.
pub struct PickupTag<S> {
    pub kind: String,
    pub sprite_key: String,
    pub duration_ms: u64,
    pub effect: Arc<dyn PowerupEffect<S>>,
}

impl<S> Clone for PickupTag<S> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            sprite_key: self.sprite_key.clone(),
            duration_ms: self.duration_ms,
            effect: Arc::clone(&self.effect),
        }
    }
}

impl<S> fmt::Debug for PickupTag<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickupTag")
            .field("kind", &self.kind)
            .field("duration_ms", &self.duration_ms)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("powerup kind must not be empty")]
    EmptyKind,
    #[error("powerup kind '{0}' defined more than once")]
    Duplicate(String),
}

/// Immutable kind -> definition mapping handed to the manager at construction.
pub struct DefinitionTable<S> {
    by_kind: HashMap<String, PowerupDefinition<S>>,
}

impl<S> Default for DefinitionTable<S> {
    fn default() -> Self {
        Self {
            by_kind: HashMap::new(),
        }
    }
}

impl<S> Clone for DefinitionTable<S> {
    fn clone(&self) -> Self {
        Self {
            by_kind: self.by_kind.clone(),
        }
    }
}

impl<S> fmt::Debug for DefinitionTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.by_kind.iter()).finish()
    }
}

impl<S> DefinitionTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_from_definitions<I>(defs: I) -> Result<Self, DefinitionError>
    where
        I: IntoIterator<Item = PowerupDefinition<S>>,
    {
        let mut table = Self::new();
        for def in defs {
            table.insert(def)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, def: PowerupDefinition<S>) -> Result<(), DefinitionError> {
        if def.kind.trim().is_empty() {
            return Err(DefinitionError::EmptyKind);
        }
        if self.by_kind.contains_key(&def.kind) {
            return Err(DefinitionError::Duplicate(def.kind));
        }
        self.by_kind.insert(def.kind.clone(), def);
        Ok(())
    }

    /// Builder-style insert for tests and hand-built tables.
    pub fn with(mut self, def: PowerupDefinition<S>) -> Result<Self, DefinitionError> {
        self.insert(def)?;
        Ok(self)
    }

    pub fn get(&self, kind: &str) -> Option<&PowerupDefinition<S>> {
        self.by_kind.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.by_kind.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }

    /// Kinds sorted by name, so random picks are reproducible for a given seed.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.by_kind.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut u32, _: bool) {}

    #[test]
    fn rejects_duplicate_kind() {
        let err = DefinitionTable::new()
            .with(PowerupDefinition::new("speed", "a.png", 100, noop))
            .and_then(|t| t.with(PowerupDefinition::new("speed", "b.png", 200, noop)))
            .unwrap_err();
        assert_eq!(err, DefinitionError::Duplicate("speed".into()));
    }

    #[test]
    fn rejects_blank_kind() {
        let mut table = DefinitionTable::<u32>::new();
        assert_eq!(
            table.insert(PowerupDefinition::new("  ", "a.png", 100, noop)),
            Err(DefinitionError::EmptyKind)
        );
    }

    #[test]
    fn tag_copies_definition_fields() {
        let def = PowerupDefinition::new("shield", "shield.png", 750, |s: &mut u32, on: bool| {
            if on {
                *s += 1
            } else {
                *s -= 1
            }
        });
        let tag = def.tag();
        assert_eq!(tag.kind, "shield");
        assert_eq!(tag.duration_ms, 750);
        let mut subject = 0;
        tag.effect.apply(&mut subject, true);
        assert_eq!(subject, 1);
        tag.effect.apply(&mut subject, false);
        assert_eq!(subject, 0);
    }

    #[test]
    fn kinds_are_sorted() {
        let table = DefinitionTable::try_from_definitions([
            PowerupDefinition::new("speed", "", 1, noop),
            PowerupDefinition::new("grow", "", 1, noop),
            PowerupDefinition::new("shield", "", 1, noop),
        ])
        .unwrap();
        assert_eq!(table.kinds(), vec!["grow", "shield", "speed"]);
    }
}
