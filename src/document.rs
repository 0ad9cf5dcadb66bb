use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Document {
    pub nodes: Vec<NodeRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationships: Vec<RelationshipRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub position: Position,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipRecord {
    pub from_id: String,
    pub to_id: String,
    #[serde(default, rename = "type")]
    pub rel_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Map<String, Value>,
}

// Exporters write `null` for absent collections.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn parse_document(input: &str) -> Result<Document> {
    Ok(serde_json::from_str(input)?)
}

pub fn load_document(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content)
}
