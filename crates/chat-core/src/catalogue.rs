use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod builtin;

/// One culture the service can answer questions about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CultureEntry {
    /// Stable lowercase identifier, unique across the catalogue.
    pub key: String,
    pub display_name: String,
    /// Traditional language of the culture; only used to pick a translation code.
    pub source_language: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub traditions: Vec<String>,
}

impl CultureEntry {
    pub fn new(
        key: impl Into<String>,
        display_name: impl Into<String>,
        source_language: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            source_language: source_language.into(),
            steps: Vec::new(),
            traditions: Vec::new(),
        }
    }

    pub fn with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps = steps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_traditions<I, S>(mut self, traditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.traditions = traditions.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("culture entry #{index} has an empty key")]
    EmptyKey { index: usize },
    #[error("culture key `{key}` must be lowercase")]
    KeyNotLowercase { key: String },
    #[error("duplicate culture key `{key}`")]
    DuplicateKey { key: String },
    #[error("culture `{key}` has an empty display name")]
    EmptyDisplayName { key: String },
    #[error("failed to read catalogue {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalogue {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

/// Read-only set of culture entries, kept in definition order.
///
/// Built once at startup and shared by reference; nothing mutates it after
/// construction, so concurrent requests read it without locking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalogue {
    entries: Vec<CultureEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogueDocument {
    #[serde(default)]
    cultures: Vec<CultureEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Toml,
    Json,
}

impl DocumentFormat {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

impl Catalogue {
    pub fn new(entries: Vec<CultureEntry>) -> Result<Self, CatalogueError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.key.trim().is_empty() {
                return Err(CatalogueError::EmptyKey { index });
            }
            if entry.key != entry.key.to_lowercase() {
                return Err(CatalogueError::KeyNotLowercase {
                    key: entry.key.clone(),
                });
            }
            if !seen.insert(entry.key.to_lowercase()) {
                return Err(CatalogueError::DuplicateKey {
                    key: entry.key.clone(),
                });
            }
            if entry.display_name.trim().is_empty() {
                return Err(CatalogueError::EmptyDisplayName {
                    key: entry.key.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// The four Cameroonian cultures the service ships with.
    pub fn builtin() -> Self {
        Self {
            entries: builtin::entries(),
        }
    }

    /// Load a catalogue document; `.json` files are read as JSON, anything else as TOML.
    pub fn from_path(path: &Path) -> Result<Self, CatalogueError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogueError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document: CatalogueDocument = match DocumentFormat::for_path(path) {
            DocumentFormat::Json => {
                serde_json::from_str(&contents).map_err(|err| CatalogueError::Parse {
                    path: path.to_path_buf(),
                    message: err.to_string(),
                })?
            }
            DocumentFormat::Toml => toml::from_str(&contents).map_err(|err| CatalogueError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?,
        };
        Self::new(document.cultures)
    }

    pub fn entries(&self) -> &[CultureEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CultureEntry> {
        self.entries.iter()
    }

    pub fn get(&self, key: &str) -> Option<&CultureEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn display_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.display_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalogue {
    type Item = &'a CultureEntry;
    type IntoIter = std::slice::Iter<'a, CultureEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_catalogue_passes_validation() {
        let builtin = Catalogue::builtin();
        let validated = Catalogue::new(builtin.entries().to_vec()).expect("valid builtin");
        assert_eq!(validated, builtin);
        assert_eq!(
            builtin.display_names().collect::<Vec<_>>(),
            ["Bamileke", "Bassa", "Bakweri", "Fulani"]
        );
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = Catalogue::new(vec![
            CultureEntry::new("bassa", "Bassa", "Bassa"),
            CultureEntry::new("bassa", "Bassa again", "Bassa"),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogueError::DuplicateKey { key } if key == "bassa"));
    }

    #[test]
    fn rejects_uppercase_and_empty_keys() {
        let err = Catalogue::new(vec![CultureEntry::new("Bassa", "Bassa", "Bassa")]).unwrap_err();
        assert!(matches!(err, CatalogueError::KeyNotLowercase { .. }));

        let err = Catalogue::new(vec![CultureEntry::new("  ", "Bassa", "Bassa")]).unwrap_err();
        assert!(matches!(err, CatalogueError::EmptyKey { index: 0 }));
    }

    #[test]
    fn rejects_blank_display_name() {
        let err = Catalogue::new(vec![CultureEntry::new("duala", " ", "Duala")]).unwrap_err();
        assert!(matches!(err, CatalogueError::EmptyDisplayName { key } if key == "duala"));
    }

    #[test]
    fn loads_toml_document() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[[cultures]]
key = "duala"
display_name = "Duala"
source_language = "Duala"
steps = ["Knocking", "Dowry"]

[[cultures]]
key = "ewondo"
display_name = "Ewondo"
source_language = "Ewondo"
"#
        )
        .unwrap();
        let catalogue = Catalogue::from_path(file.path()).unwrap();
        assert_eq!(catalogue.len(), 2);
        let duala = catalogue.get("duala").unwrap();
        assert_eq!(duala.steps, ["Knocking", "Dowry"]);
        assert!(duala.traditions.is_empty());
        assert!(catalogue.get("ewondo").unwrap().steps.is_empty());
    }

    #[test]
    fn loads_json_document_and_validates_it() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"cultures": [
                {{"key": "duala", "display_name": "Duala", "source_language": "Duala"}},
                {{"key": "DUALA", "display_name": "Duala", "source_language": "Duala"}}
            ]}}"#
        )
        .unwrap();
        let err = Catalogue::from_path(file.path()).unwrap_err();
        assert!(matches!(err, CatalogueError::KeyNotLowercase { .. }));
    }

    #[test]
    fn reports_parse_and_read_failures() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            Catalogue::from_path(file.path()),
            Err(CatalogueError::Parse { .. })
        ));
        assert!(matches!(
            Catalogue::from_path(Path::new("/definitely/missing/catalogue.toml")),
            Err(CatalogueError::Read { .. })
        ));
    }
}
