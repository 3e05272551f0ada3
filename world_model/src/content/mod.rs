//! Data-driven content loading - entity records authored as TOML or JSON.
//!
//! Authors describe entities as plain data; attaching behavior modules and
//! handler overrides requires no code. Only the authoring format lives
//! here - persistence of live world state is a separate concern and not
//! part of this crate.

use serde::Deserialize;
use thiserror::Error;

use crate::entities::Entity;

/// Errors raised while parsing authored entity records.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("invalid TOML entity records: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON entity records: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct EntityRecords {
    #[serde(default)]
    entities: Vec<Entity>,
}

/// Parse entity records from a TOML document with an `[[entities]]` array.
pub fn entities_from_toml(input: &str) -> Result<Vec<Entity>, ContentError> {
    let records: EntityRecords = toml::from_str(input)?;
    Ok(records.entities)
}

/// Parse entity records from a JSON array.
pub fn entities_from_json(input: &str) -> Result<Vec<Entity>, ContentError> {
    Ok(serde_json::from_str(input)?)
}
