//! Model persistence.
//!
//! Models are stored as versioned JSON documents (see [`schema`]). Floats are
//! written with round-trip precision, so a reloaded model predicts exactly
//! like the original.
//!
//! # Example
//!
//! ```ignore
//! model.save_json("model.rfb.json")?;
//! let loaded = RfBoostModel::load_json("model.rfb.json")?;
//! ```

mod convert;
mod error;
pub mod schema;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub use error::{ReadError, WriteError};
pub use schema::{RfBoostModelSchema, SCHEMA_VERSION};

use crate::model::RfBoostModel;

impl RfBoostModel {
    /// Serialize to a compact JSON string.
    pub fn to_json_string(&self) -> Result<String, WriteError> {
        Ok(serde_json::to_string(&RfBoostModelSchema::from(self))?)
    }

    /// Serialize to an indented JSON string.
    pub fn to_json_string_pretty(&self) -> Result<String, WriteError> {
        Ok(serde_json::to_string_pretty(&RfBoostModelSchema::from(self))?)
    }

    /// Write JSON to `writer`.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), WriteError> {
        serde_json::to_writer(writer, &RfBoostModelSchema::from(self))?;
        Ok(())
    }

    /// Write JSON to a file, replacing it if it exists.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), WriteError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Parse and validate a model from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ReadError> {
        let schema: RfBoostModelSchema = serde_json::from_str(json)?;
        Self::try_from(schema)
    }

    /// Parse and validate a model from `reader`.
    pub fn read_json<R: Read>(reader: R) -> Result<Self, ReadError> {
        let schema: RfBoostModelSchema = serde_json::from_reader(reader)?;
        Self::try_from(schema)
    }

    /// Load and validate a model from a file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        Self::read_json(BufReader::new(File::open(path)?))
    }
}
