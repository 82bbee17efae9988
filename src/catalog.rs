use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One catalog entry per distinct base filename. Optional fields are
/// omitted from the persisted JSON when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoEntry {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_genre",
        skip_serializing_if = "Option::is_none"
    )]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,
}

impl VideoEntry {
    pub fn new(base_name: &str) -> Self {
        Self {
            filename: base_name.to_string(),
            video_filename: None,
            artist: None,
            title: None,
            genre: None,
            cover_filename: None,
            duration_seconds: None,
            processed_at: None,
        }
    }

    /// An entry counts as metadata-complete once both artist and title are set.
    pub fn has_metadata(&self) -> bool {
        self.artist.is_some() && self.title.is_some()
    }
}

/// Older catalogs stored the genre as a list; the canonical schema keeps a
/// single value, so list-valued entries migrate by taking the first element.
fn deserialize_genre<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum GenreField {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<GenreField>::deserialize(deserializer)? {
        Some(GenreField::One(genre)) => Some(genre),
        Some(GenreField::Many(genres)) => genres.into_iter().next(),
        None => None,
    })
}

/// Ordered collection of entries, indexed by base name.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<VideoEntry>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog from persisted entries. Duplicate base names mean
    /// the persisted state is malformed.
    pub fn from_entries(entries: Vec<VideoEntry>) -> Result<Self> {
        let mut catalog = Self::default();
        for entry in entries {
            anyhow::ensure!(
                !catalog.index.contains_key(&entry.filename),
                "catalog contains duplicate entries for '{}'",
                entry.filename
            );
            catalog.insert(entry);
        }
        Ok(catalog)
    }

    pub fn get(&self, base_name: &str) -> Option<&VideoEntry> {
        self.index.get(base_name).map(|&i| &self.entries[i])
    }

    /// Returns the entry for the base name, creating a blank one if absent.
    pub fn get_or_insert(&mut self, base_name: &str) -> &mut VideoEntry {
        let index = match self.index.get(base_name) {
            Some(&i) => i,
            None => {
                let i = self.entries.len();
                self.index.insert(base_name.to_string(), i);
                self.entries.push(VideoEntry::new(base_name));
                i
            }
        };
        &mut self.entries[index]
    }

    /// Appends a new entry. Replaces in place if the base name already exists.
    pub fn insert(&mut self, entry: VideoEntry) {
        match self.index.get(&entry.filename) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(entry.filename.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn entries(&self) -> &[VideoEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Raw provider responses, keyed by base name and archived verbatim.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataArchive(BTreeMap<String, Value>);

impl MetadataArchive {
    pub fn get(&self, base_name: &str) -> Option<&Value> {
        self.0.get(base_name)
    }

    pub fn insert(&mut self, base_name: String, record: Value) {
        self.0.insert(base_name, record);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
