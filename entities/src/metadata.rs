use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Token metadata document as served by a gateway.
///
/// Only `image` is mandatory, the rest of the document is kept as is.
/// Some minters use `imageReference` instead of the conventional `image` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMetadata {
    #[serde(alias = "imageReference")]
    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<JsonValue>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Metadata snapshot with the image reference already resolved into a fetchable URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub image_url: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub attributes: Option<JsonValue>,
    pub extra: Map<String, JsonValue>,
}

impl MetadataRecord {
    pub fn from_raw(raw: RawMetadata, image_url: String) -> Self {
        Self {
            image_url,
            name: raw.name,
            description: raw.description,
            attributes: raw.attributes,
            extra: raw.extra,
        }
    }
}
