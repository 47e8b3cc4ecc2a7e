//! Technology and specialty mappings loaded from YAML
//!
//! The technology mapping relates a docs folder (technology key) to one or
//! more specialties, a priority and a description. The specialty mapping
//! declares the known specialties with their own priority and description.

use crate::error::{Result, SyncError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Technology key -> technology entry
pub type TechnologyMapping = BTreeMap<String, TechnologyEntry>;

/// Specialty name -> specialty entry
pub type SpecialtyMapping = BTreeMap<String, SpecialtyEntry>;

/// Specialty reference in a technology entry: a name, a comma-joined list of
/// names, or a YAML list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecialtyRef {
    One(String),
    Many(Vec<String>),
}

impl SpecialtyRef {
    /// The specialty a document in this technology belongs to
    pub fn primary(&self) -> Option<String> {
        match self {
            SpecialtyRef::One(name) if name.contains(',') => {
                name.split(',').next().map(|s| s.trim().to_string())
            }
            SpecialtyRef::One(name) => Some(name.clone()),
            SpecialtyRef::Many(names) => names.first().cloned(),
        }
    }

    /// Every specialty this technology is associated with
    pub fn names(&self) -> Vec<String> {
        match self {
            SpecialtyRef::One(name) if name.contains(',') => {
                name.split(',').map(|s| s.trim().to_string()).collect()
            }
            SpecialtyRef::One(name) => vec![name.clone()],
            SpecialtyRef::Many(names) => names.clone(),
        }
    }
}

/// One entry of the technology mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyEntry {
    #[serde(default)]
    pub specialty: Option<SpecialtyRef>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl TechnologyEntry {
    pub fn new(specialty: SpecialtyRef, priority: i64, description: &str) -> Self {
        Self {
            specialty: Some(specialty),
            priority: Some(priority),
            description: Some(description.to_string()),
        }
    }

    pub fn priority(&self) -> i64 {
        self.priority.unwrap_or(0)
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn primary_specialty(&self) -> Option<String> {
        self.specialty.as_ref().and_then(SpecialtyRef::primary)
    }

    pub fn specialty_names(&self) -> Vec<String> {
        self.specialty
            .as_ref()
            .map(SpecialtyRef::names)
            .unwrap_or_default()
    }
}

/// One entry of the specialty mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialtyEntry {
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl SpecialtyEntry {
    pub fn new(priority: i64, description: &str) -> Self {
        Self {
            priority: Some(priority),
            description: Some(description.to_string()),
        }
    }

    pub fn priority(&self) -> i64 {
        self.priority.unwrap_or(0)
    }
}

/// Load the technology mapping, or an empty one if the file is unusable
pub fn load_technology_mapping(path: &Path) -> TechnologyMapping {
    load_or_empty(path)
}

/// Load the specialty mapping, or an empty one if the file is unusable
pub fn load_specialty_mapping(path: &Path) -> SpecialtyMapping {
    load_or_empty(path)
}

fn load_or_empty<T>(path: &Path) -> BTreeMap<String, T>
where
    T: DeserializeOwned + Default,
{
    match read_mapping(path) {
        Ok(mapping) => {
            debug!("Loaded {} entries from {:?}", mapping.len(), path);
            mapping
        }
        Err(e) => {
            warn!("Mapping file {:?} not usable, using an empty mapping: {}", path, e);
            BTreeMap::new()
        }
    }
}

/// Read and parse a YAML mapping file.
///
/// An empty document is an empty mapping; an entry with no value gets the
/// entry defaults.
pub fn read_mapping<T>(path: &Path) -> Result<BTreeMap<String, T>>
where
    T: DeserializeOwned + Default,
{
    let content = std::fs::read_to_string(path)?;
    parse_mapping(&content)
}

/// Parse YAML text into a mapping.
///
/// Entries are converted one at a time; an entry that does not fit `T` is
/// logged and dropped, the rest are kept.
pub fn parse_mapping<T>(content: &str) -> Result<BTreeMap<String, T>>
where
    T: DeserializeOwned + Default,
{
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let value: Value = serde_yaml::from_str(content)?;
    let entries = match value {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Mapping(entries) => entries,
        _ => {
            return Err(SyncError::Mapping(
                "top level is not a key/value mapping".to_string(),
            ))
        }
    };

    let mut mapping = BTreeMap::new();
    for (key, entry) in entries {
        let Some(name) = key_to_string(&key) else {
            warn!("Skipping mapping entry with non-scalar key {:?}", key);
            continue;
        };

        if entry.is_null() {
            mapping.insert(name, T::default());
            continue;
        }

        match serde_yaml::from_value::<T>(entry) {
            Ok(parsed) => {
                mapping.insert(name, parsed);
            }
            Err(e) => warn!("Skipping mapping entry {:?}: {}", name, e),
        }
    }

    Ok(mapping)
}

fn key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
