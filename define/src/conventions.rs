//! Document-wide generation conventions.

use serde::Deserialize;
use serde_yaml::Value;
use strum::{Display, EnumString};

use crate::schema::StringOrList;

/// Where a discriminator parameter is attached to its path segment.
///
/// Controls the separator used when rendering `items;{id}`-style query-path
/// segments into the output path string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SelectorLocation {
    /// The parameter becomes its own path segment: `items/{id}`.
    #[serde(rename = "path-segment")]
    PathSegment,
    /// The parameter is a matrix-style parameter on the segment:
    /// `items;{id}`.
    #[serde(rename = "path-parameter")]
    PathParameter,
}

impl SelectorLocation {
    /// The separator character joining a segment to its parameter.
    pub fn separator(&self) -> char {
        match self {
            SelectorLocation::PathSegment => '/',
            SelectorLocation::PathParameter => ';',
        }
    }
}

/// Recognized members of the top-level `conventions` map.
///
/// Unknown members are ignored by the generator; the validator reports them.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Conventions {
    /// Discriminator placement; defaults to [`SelectorLocation::PathParameter`].
    pub selector_location: Option<SelectorLocation>,
    /// Media types accepted by generated PATCH operations.
    pub patch_consumes: Option<StringOrList>,
    /// Schema injected into the output as `definitions.ErrorResponse` and
    /// referenced from every standard error response.
    pub error_response: Option<Value>,
}

impl Conventions {
    /// The effective discriminator separator.
    pub fn discriminator_separator(&self) -> char {
        self.selector_location
            .map_or(';', |location| location.separator())
    }

    /// The effective PATCH media types.
    pub fn patch_consumes(&self) -> Vec<String> {
        self.patch_consumes.as_ref().map_or_else(
            || {
                vec![
                    "application/merge-patch+json".to_string(),
                    "application/json-patch+json".to_string(),
                ]
            },
            StringOrList::items,
        )
    }
}
