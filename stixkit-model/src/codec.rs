//! Text codecs for canonical mappings.
//!
//! The core only deals in canonical mappings; a [`Codec`] turns them into
//! text and back. [`JsonCodec`] is the built-in one. Other bindings (XML)
//! plug in by implementing the same trait.

use crate::ModelResult;
use serde::Serialize;
use serde::ser::Error as _;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value as Json};

pub trait Codec: Send + Sync {
    /// Renders a canonical mapping. Key order is preserved as given.
    fn encode(&self, mapping: &Map<String, Json>, pretty: bool) -> ModelResult<String>;

    /// Decodes text into a JSON value.
    fn decode(&self, text: &str) -> ModelResult<Json>;
}

/// JSON text, compact or indented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonCodec {
    indent: usize,
}

impl JsonCodec {
    pub const DEFAULT_INDENT: usize = 4;

    #[must_use]
    pub const fn with_indent(indent: usize) -> Self {
        Self { indent }
    }

    #[must_use]
    pub const fn indent(&self) -> usize {
        self.indent
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::with_indent(Self::DEFAULT_INDENT)
    }
}

impl Codec for JsonCodec {
    fn encode(&self, mapping: &Map<String, Json>, pretty: bool) -> ModelResult<String> {
        if !pretty {
            return Ok(serde_json::to_string(mapping)?);
        }
        let indent = vec![b' '; self.indent];
        let mut buf = Vec::new();
        {
            let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(&indent));
            mapping.serialize(&mut ser)?;
        }
        String::from_utf8(buf).map_err(|e| serde_json::Error::custom(e).into())
    }

    fn decode(&self, text: &str) -> ModelResult<Json> {
        Ok(serde_json::from_str(text)?)
    }
}
