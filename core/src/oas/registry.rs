#![deny(missing_docs)]

//! # Definition Registry
//!
//! Per-run table of named, reusable schemas (`definitions`).
//!
//! Names are stable for a given design type: the first request for a type reserves a
//! name, later requests (including recursive ones made while the type is still being
//! built) get the same name back. Distinct schemas competing for one name are
//! disambiguated with a numeric suffix (`Name`, `Name2`, `Name3`, ...); structurally
//! identical schemas registered under one name share the entry.
//!
//! A registry is owned by exactly one generation run and passed by reference into the
//! builders; it is never shared between runs.

use crate::error::{AppError, AppResult};
use crate::oas::models::Schema;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Identity of a design type projection: the type name plus the non-default view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeKey {
    /// User type name.
    pub type_name: String,
    /// View name; `None` for the default view.
    pub view: Option<String>,
}

impl TypeKey {
    /// Creates a key.
    pub fn new(type_name: impl Into<String>, view: Option<&str>) -> Self {
        Self {
            type_name: type_name.into(),
            view: view.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone)]
enum Slot {
    /// Name reserved for a type still being built.
    Pending,
    Ready(Schema),
}

/// The `definitions` table of one generation run.
#[derive(Debug, Clone)]
pub struct DefinitionRegistry {
    slots: BTreeMap<String, Slot>,
    identities: HashMap<TypeKey, String>,
    max_suffix: usize,
}

impl Default for DefinitionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionRegistry {
    /// Creates an empty registry with the default suffix limit.
    pub fn new() -> Self {
        Self::with_max_suffix(1000)
    }

    /// Creates an empty registry trying suffixes up to `max_suffix`.
    pub fn with_max_suffix(max_suffix: usize) -> Self {
        Self {
            slots: BTreeMap::new(),
            identities: HashMap::new(),
            max_suffix,
        }
    }

    /// Number of names in use (including pending reservations).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no name is in use.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `name` is in use.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Returns the completed schema registered as `name`.
    pub fn lookup(&self, name: &str) -> Option<&Schema> {
        match self.slots.get(name) {
            Some(Slot::Ready(schema)) => Some(schema),
            _ => None,
        }
    }

    /// Name previously reserved for a design type projection.
    pub fn name_of(&self, key: &TypeKey) -> Option<&str> {
        self.identities.get(key).map(String::as_str)
    }

    /// Registers an anonymous schema under `name`, returning the final name.
    ///
    /// An unused name is taken as-is. A name holding a structurally identical schema
    /// is reused. Otherwise suffixed candidates are tried in order with the same rules.
    pub fn register(&mut self, name: &str, schema: Schema) -> AppResult<String> {
        for candidate in self.candidates(name) {
            match self.slots.get(&candidate) {
                None => {
                    if candidate != name {
                        debug!(
                            requested = %name,
                            assigned = %candidate,
                            "definition name disambiguated"
                        );
                    }
                    self.slots.insert(candidate.clone(), Slot::Ready(schema));
                    return Ok(candidate);
                }
                Some(Slot::Ready(existing)) if *existing == schema => return Ok(candidate),
                Some(_) => continue,
            }
        }
        Err(AppError::NameExhausted(name.to_string()))
    }

    /// Reserves a unique name for a design type projection before building it.
    ///
    /// Returns the already assigned name when the key was reserved before.
    pub fn reserve(&mut self, key: TypeKey, name: &str) -> AppResult<String> {
        if let Some(existing) = self.identities.get(&key) {
            return Ok(existing.clone());
        }
        let candidate = self
            .candidates(name)
            .find(|c| !self.slots.contains_key(c))
            .ok_or_else(|| AppError::NameExhausted(name.to_string()))?;
        if candidate != name {
            debug!(requested = %name, assigned = %candidate, "definition name disambiguated");
        }
        self.slots.insert(candidate.clone(), Slot::Pending);
        self.identities.insert(key, candidate.clone());
        Ok(candidate)
    }

    /// Stores the finished schema of a reserved name.
    pub fn complete(&mut self, name: &str, schema: Schema) {
        self.slots.insert(name.to_string(), Slot::Ready(schema));
    }

    /// Freezes the registry into the `definitions` table.
    ///
    /// Fails if a reservation was never completed.
    pub fn into_definitions(self) -> AppResult<BTreeMap<String, Schema>> {
        self.slots
            .into_iter()
            .map(|(name, slot)| match slot {
                Slot::Ready(schema) => Ok((name, schema)),
                Slot::Pending => Err(AppError::design(
                    &name,
                    "definition was reserved but never completed",
                )),
            })
            .collect()
    }

    fn candidates<'a>(&self, name: &'a str) -> impl Iterator<Item = String> + 'a {
        std::iter::once(name.to_string())
            .chain((2..=self.max_suffix).map(move |n| format!("{}{}", name, n)))
    }
}
