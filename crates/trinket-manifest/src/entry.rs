//! Trinket Entry
//!
//! One record of the `trinkets.json` manifest.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ID: &str = "id";
const NAME: &str = "name";
const APP_URL: &str = "appUrl";
const ICON_URL: &str = "iconUrl";
const ENTRY_FILE: &str = "entryFile";
const HASH: &str = "hash";
const REF: &str = "ref";

/// Manifest entry as stored on disk.
///
/// The record is kept as the JSON object it was read from, key order
/// included, so rewriting the manifest only changes what the updater sets.
/// Display fields may be absent or `null`; only `id` has to be a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct TrinketEntry {
    fields: Map<String, Value>,
}

impl TrinketEntry {
    /// Create the entry for a newly discovered content folder.
    ///
    /// `hosting_base` must not end with a slash.
    pub fn discovered(id: &str, hosting_base: &str, hash: &str, reference: &str) -> Self {
        let root = format!("{}/{}", hosting_base, id);
        let mut fields = Map::new();
        fields.insert(ID.into(), id.into());
        fields.insert(NAME.into(), display_name(id).into());
        fields.insert(APP_URL.into(), format!("{}/", root).into());
        fields.insert(ICON_URL.into(), format!("{}/icon.png", root).into());
        fields.insert(ENTRY_FILE.into(), format!("{}/index.html", root).into());
        fields.insert(HASH.into(), hash.into());
        fields.insert(REF.into(), reference.into());
        Self { fields }
    }

    pub fn id(&self) -> &str {
        self.text(ID).unwrap_or_default()
    }

    pub fn name(&self) -> Option<&str> {
        self.text(NAME)
    }

    pub fn app_url(&self) -> Option<&str> {
        self.text(APP_URL)
    }

    pub fn icon_url(&self) -> Option<&str> {
        self.text(ICON_URL)
    }

    pub fn entry_file(&self) -> Option<&str> {
        self.text(ENTRY_FILE)
    }

    pub fn hash(&self) -> Option<&str> {
        self.text(HASH)
    }

    pub fn reference(&self) -> Option<&str> {
        self.text(REF)
    }

    /// Raw value of any field, including ones the updater does not model.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Name for log lines, falling back to the id.
    pub fn label(&self) -> &str {
        self.name().unwrap_or_else(|| self.id())
    }

    /// Point the entry at a new archive digest and ref. Existing keys keep
    /// their position, missing ones are appended.
    pub fn set_source(&mut self, hash: &str, reference: &str) {
        self.fields.insert(HASH.into(), hash.into());
        self.fields.insert(REF.into(), reference.into());
    }

    /// Whether this entry is served from `repo` (an `owner/repo` identifier).
    pub fn is_sourced_from(&self, repo: &str) -> bool {
        self.app_url().is_some_and(|url| url.contains(repo))
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

impl TryFrom<Map<String, Value>> for TrinketEntry {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        match fields.get(ID) {
            Some(Value::String(_)) => Ok(Self { fields }),
            Some(other) => Err(format!("trinket id must be a string, found {}", other)),
            None => Err("trinket entry has no id".to_string()),
        }
    }
}

impl From<TrinketEntry> for Map<String, Value> {
    fn from(entry: TrinketEntry) -> Self {
        entry.fields
    }
}

/// Human readable name for a folder id: separators become spaces and each
/// word is title-cased, so `pixel-pet_v2` becomes `Pixel Pet V2`.
pub fn display_name(id: &str) -> String {
    id.replace(['-', '_'], " ")
        .split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
