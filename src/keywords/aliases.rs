//! Alias table configuration: canonical keyword -> synonymous raw keywords.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors raised while loading or validating an alias table.
#[derive(Debug, Error)]
pub enum AliasError {
    /// The alias file could not be read.
    #[error("cannot read alias table '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The alias file is not a JSON object of string arrays.
    #[error("invalid alias table '{}': {source}\n  Suggestion: use {{\"canonical\": [\"alias\", ...]}}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// One alias is listed under two canonical keywords.
    #[error("alias '{alias}' is listed under both '{first}' and '{second}'")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },

    /// Two canonical keywords differ only by case.
    #[error("canonical keywords '{first}' and '{second}' differ only by case")]
    DuplicateCanonical { first: String, second: String },

    /// A canonical keyword or alias is blank.
    #[error("blank keyword in alias table entry '{canonical}'")]
    Blank { canonical: String },

    /// A lowercase canonical keyword is missing from its own alias list, so
    /// a bibliography keyword spelled the same way would never fold into it.
    #[error(
        "canonical keyword '{canonical}' is not listed among its own aliases\n  Suggestion: add \"{canonical}\" to its alias list"
    )]
    CanonicalNotAliased { canonical: String },
}

/// Mapping from canonical keyword to the set of aliases that collapse into it.
///
/// Aliases are stored lowercased; canonical keywords keep their configured
/// spelling (e.g. `LES`) because that is what gets displayed. Iteration is in
/// canonical keyword order, which keeps consolidation deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl AliasTable {
    /// Creates an empty table: every raw keyword stays its own canonical form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in table for wind energy and atmospheric flow literature.
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert("LES", [
            "les",
            "large eddy simulation",
            "large-eddy simulation",
            "large-eddy simulation (les)",
        ]);
        table.insert("WRF", [
            "wrf",
            "weather research and forecasting model",
            "weather research and forecasting",
        ]);
        table.insert("ALM", [
            "alm",
            "actuator line (al) model",
            "actuator line model",
            "actuator line modeling",
        ]);
        table.insert("ADM", [
            "adm",
            "actuator disk model",
            "generalized actuator disk model",
        ]);
        table.insert("CFD", [
            "cfd",
            "cfd simulation",
            "computational fluid dynamics",
        ]);
        table.insert("wind turbines", ["wind turbines", "wind turbine"]);
        table.insert("wind farms", [
            "wind farms",
            "wind farm",
            "wind plants",
            "wind plant",
        ]);
        table.insert("wakes", [
            "wakes",
            "turbine wake",
            "wind turbine wake",
            "wind turbine wakes",
            "wind-turbine wake",
            "wind-turbine wakes",
        ]);
        table.insert("wake modeling", [
            "wake modeling",
            "wake model",
            "analytical wake model",
        ]);
        table.insert("wind tunnel experiment", [
            "wind tunnel experiment",
            "wind tunnels",
            "wind-tunnel experiment",
        ]);
        table.insert("shear", ["shear", "wind shear", "inflow shear"]);
        table.insert("blade loading", ["blade loading", "blade loads"]);
        table.insert("boundary layer", [
            "boundary layer",
            "turbulent boundary layer",
            "planetary boundary layer",
            "atmospheric boundary layer",
            "convective boundary layer",
            "stable boundary layer",
        ]);
        table
    }

    /// Adds aliases under a canonical keyword, merging with existing ones.
    ///
    /// No validation happens here; call [`AliasTable::validate`] before
    /// handing a hand-built table to the normalizer.
    pub fn insert<I, S>(&mut self, canonical: impl Into<String>, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = self.entries.entry(canonical.into()).or_default();
        set.extend(aliases.into_iter().map(|a| a.as_ref().trim().to_lowercase()));
    }

    /// Parses a JSON object (`{"canonical": ["alias", ...]}`) and validates it.
    ///
    /// # Errors
    /// Returns [`AliasError::Json`] on malformed JSON and a validation error
    /// for inconsistent tables.
    pub fn from_json_str(raw: &str, origin: &Path) -> Result<Self, AliasError> {
        let parsed: BTreeMap<String, Vec<String>> =
            serde_json::from_str(raw).map_err(|source| AliasError::Json {
                path: origin.to_path_buf(),
                source,
            })?;

        let mut table = Self::new();
        for (canonical, aliases) in parsed {
            table.insert(canonical, aliases);
        }
        table.validate()?;
        Ok(table)
    }

    /// Loads and validates an alias table from a JSON file.
    ///
    /// # Errors
    /// Returns [`AliasError::Io`] if the file cannot be read, otherwise as
    /// [`AliasTable::from_json_str`].
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, AliasError> {
        let raw = std::fs::read_to_string(path).map_err(|source| AliasError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json_str(&raw, path)?;
        debug!(canonical = table.len(), "Loaded alias table");
        Ok(table)
    }

    /// Serializes the table as pretty-printed JSON.
    ///
    /// # Errors
    /// Propagates `serde_json` serialization failures.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Checks that no alias maps to two canonical keywords, that canonical
    /// keywords are distinct ignoring case, and that an all-lowercase
    /// canonical keyword lists itself as an alias.
    ///
    /// # Errors
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), AliasError> {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        let mut canonical_seen: HashMap<String, &str> = HashMap::new();

        for (canonical, aliases) in &self.entries {
            if canonical.trim().is_empty() || aliases.iter().any(|a| a.is_empty()) {
                return Err(AliasError::Blank {
                    canonical: canonical.clone(),
                });
            }
            if let Some(first) = canonical_seen.insert(canonical.to_lowercase(), canonical.as_str()) {
                return Err(AliasError::DuplicateCanonical {
                    first: first.to_string(),
                    second: canonical.clone(),
                });
            }
            for alias in aliases {
                if let Some(first) = owners.insert(alias.as_str(), canonical.as_str()) {
                    return Err(AliasError::DuplicateAlias {
                        alias: alias.clone(),
                        first: first.to_string(),
                        second: canonical.clone(),
                    });
                }
            }
        }
        // Raw keywords are lowercased, so only lowercase canonicals can collide.
        for (canonical, aliases) in &self.entries {
            if *canonical == canonical.to_lowercase() && !aliases.contains(canonical) {
                return Err(AliasError::CanonicalNotAliased {
                    canonical: canonical.clone(),
                });
            }
        }
        Ok(())
    }

    /// Iterates `(canonical, aliases)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the aliases configured for `canonical` (exact spelling).
    #[must_use]
    pub fn aliases_of(&self, canonical: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(canonical)
    }

    /// Number of canonical keywords.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
