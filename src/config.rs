//! Runtime configuration: which source to read and how its columns are named.

use anyhow::{Context, Result, bail};
use chrono::FixedOffset;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::source::{AirtableCredentials, AirtableSource, ColumnMapping, CsvSource, DataSource, Field};

pub const AIRTABLE_TOKEN_VAR: &str = "AIRTABLE_API_TOKEN";
pub const AIRTABLE_BASE_VAR: &str = "AIRTABLE_BASE_ID";
pub const AIRTABLE_TABLE_VAR: &str = "AIRTABLE_TABLE_ID";

/// Column-name overrides read from a JSON file.
///
/// Keys are canonical field keys, values are the source's column names:
/// ```json
/// {
///   "item_name": "Food",
///   "protein": "Protein"
/// }
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ColumnOverrides {
    entries: HashMap<Field, String>,
}

impl ColumnOverrides {
    /// Loads the overrides from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading column overrides from '{}'", path.display()))?;
        Self::parse(&content).with_context(|| format!("in '{}'", path.display()))
    }

    /// Parses overrides from JSON text, rejecting unknown field keys.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(content)?;
        let mut entries = HashMap::new();
        for (key, column) in raw {
            let Some(field) = Field::from_key(&key) else {
                bail!("unknown field '{key}' in column overrides");
            };
            entries.insert(field, column);
        }
        Ok(Self { entries })
    }

    /// Applies the overrides on top of `mapping`.
    pub fn apply(&self, mapping: ColumnMapping) -> ColumnMapping {
        mapping.with_overrides(&self.entries)
    }
}

/// Where the nutrition table is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Csv { path: PathBuf },
    Airtable(AirtableCredentials),
}

impl SourceConfig {
    /// Reads Airtable credentials from the environment.
    pub fn airtable_from_env() -> Result<Self> {
        Self::airtable_from_lookup(|name| std::env::var(name).ok())
    }

    fn airtable_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{name} must be set to read from Airtable"))
        };

        Ok(SourceConfig::Airtable(AirtableCredentials {
            token: var(AIRTABLE_TOKEN_VAR)?,
            base_id: var(AIRTABLE_BASE_VAR)?,
            table_id: var(AIRTABLE_TABLE_VAR)?,
        }))
    }

    /// The default column mapping for this kind of source.
    pub fn default_mapping(&self) -> ColumnMapping {
        match self {
            SourceConfig::Csv { .. } => ColumnMapping::csv(),
            SourceConfig::Airtable(_) => ColumnMapping::airtable(),
        }
    }

    /// Instantiates the adapter.
    pub fn build(
        &self,
        overrides: &ColumnOverrides,
        zone: FixedOffset,
    ) -> Result<Box<dyn DataSource>> {
        let mapping = overrides.apply(self.default_mapping());
        let source: Box<dyn DataSource> = match self {
            SourceConfig::Csv { path } => Box::new(CsvSource::new(path.clone(), mapping, zone)),
            SourceConfig::Airtable(credentials) => {
                Box::new(AirtableSource::connect(credentials, mapping, zone)?)
            }
        };
        Ok(source)
    }
}
