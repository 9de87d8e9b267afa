//! Run configuration: the user-facing [`Options`] and its normalized form.
//!
//! Options are usually read from JSON:
//!
//! ```json
//! [
//!   { "baseURL": "https://example.com/", "rebuild": { "tagName": "nuxt-img" } },
//!   { "command": "embed", "embed": { "embedTo": "block", "pickAttrs": ["class"] } }
//! ]
//! ```
//!
//! Each entry is one full pass over the document, in order.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::attrs::{PropertyMap, decode_attrs};
use crate::error::{AttrOrigin, Result};

/// Which transformation a pass runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Apply embedded attributes to images and strip the markup.
    #[default]
    Rebuild,
    /// Mirror live image attributes into alt text or a block.
    Embed,
}

/// Where `embed` writes attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedTo {
    #[default]
    Alt,
    Block,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RebuildOptions {
    pub tag_name: Option<String>,
    #[serde(rename = "keepBaseURL")]
    pub keep_base_url: Option<bool>,
    pub base_attrs: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbedOptions {
    pub embed_to: Option<EmbedTo>,
    pub pick_attrs: Option<Vec<String>>,
}

/// One pass as written by the user; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub command: Option<Command>,
    #[serde(rename = "baseURL")]
    pub base_url: Option<String>,
    pub rebuild: Option<RebuildOptions>,
    pub embed: Option<EmbedOptions>,
}

/// A single configuration or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionsInput {
    Many(Vec<Options>),
    One(Options),
}

impl Default for OptionsInput {
    fn default() -> Self {
        OptionsInput::One(Options::default())
    }
}

impl From<Options> for OptionsInput {
    fn from(opts: Options) -> Self {
        OptionsInput::One(opts)
    }
}

impl From<Vec<Options>> for OptionsInput {
    fn from(opts: Vec<Options>) -> Self {
        OptionsInput::Many(opts)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRebuild {
    /// Tag of the rebuilt element.
    pub tag_name: String,
    pub keep_base_url: bool,
    pub base_attrs: String,
    /// `base_attrs` decoded once.
    pub base_properties: PropertyMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEmbed {
    pub embed_to: EmbedTo,
    pub pick_attrs: Vec<String>,
}

/// A pass with every default filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedOptions {
    pub command: Command,
    pub base_url: String,
    pub rebuild: NormalizedRebuild,
    pub embed: NormalizedEmbed,
}

pub const DEFAULT_TAG_NAME: &str = "img";

/// Attributes mirrored by `embed` when none are configured.
pub fn default_pick_attrs() -> Vec<String> {
    vec!["width".to_string(), "height".to_string()]
}

impl Default for NormalizedOptions {
    fn default() -> Self {
        NormalizedOptions {
            command: Command::default(),
            base_url: String::new(),
            rebuild: NormalizedRebuild {
                tag_name: DEFAULT_TAG_NAME.to_string(),
                keep_base_url: false,
                base_attrs: String::new(),
                base_properties: PropertyMap::new(),
            },
            embed: NormalizedEmbed {
                embed_to: EmbedTo::default(),
                pick_attrs: default_pick_attrs(),
            },
        }
    }
}

impl Options {
    /// Fill defaults and decode `baseAttrs`.
    pub fn normalize(&self) -> Result<NormalizedOptions> {
        let rebuild = self.rebuild.clone().unwrap_or_default();
        let embed = self.embed.clone().unwrap_or_default();

        let tag_name = rebuild
            .tag_name
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TAG_NAME.to_string());
        let base_attrs = rebuild.base_attrs.unwrap_or_default();
        let base_properties = if base_attrs.is_empty() {
            PropertyMap::new()
        } else {
            decode_attrs(&base_attrs).map_err(|e| e.with_origin(AttrOrigin::BaseAttrs))?
        };

        Ok(NormalizedOptions {
            command: self.command.unwrap_or_default(),
            base_url: self.base_url.clone().unwrap_or_default(),
            rebuild: NormalizedRebuild {
                tag_name,
                keep_base_url: rebuild.keep_base_url.unwrap_or(false),
                base_attrs,
                base_properties,
            },
            embed: NormalizedEmbed {
                embed_to: embed.embed_to.unwrap_or_default(),
                pick_attrs: embed.pick_attrs.unwrap_or_else(default_pick_attrs),
            },
        })
    }
}

/// Normalize one or many configurations, keeping their order.
pub fn normalize_opts(input: &OptionsInput) -> Result<Vec<NormalizedOptions>> {
    match input {
        OptionsInput::One(opts) => Ok(vec![opts.normalize()?]),
        OptionsInput::Many(list) => list.iter().map(Options::normalize).collect(),
    }
}

/// Parse configuration JSON.
pub fn parse_options(json: &str) -> Result<OptionsInput> {
    Ok(serde_json::from_str(json)?)
}

/// Load configuration JSON from a file.
pub fn load_options(path: impl AsRef<Path>) -> Result<OptionsInput> {
    let json = fs::read_to_string(path)?;
    parse_options(&json)
}
