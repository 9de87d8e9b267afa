//! Attributes embedded in `alt` text as `text{attrs}text`.

use memchr::{memchr, memrchr};

use crate::error::{AttrOrigin, Result};

use super::{PropertyMap, decode_attrs, encode_attrs};

/// An `alt` value split around its `{...}` fragment.
///
/// When `extracted` is false, `start`, `attrs` and `end` are empty and
/// `source` holds the whole alt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AltExtraction {
    pub source: String,
    pub extracted: bool,
    pub start: String,
    pub attrs: String,
    pub end: String,
}

impl AltExtraction {
    /// The visible alt with the fragment removed.
    pub fn residual(&self) -> String {
        if self.extracted {
            format!("{}{}", self.start, self.end)
        } else {
            self.source.clone()
        }
    }
}

/// Split `alt` around the span from its first `{` to its last `}`.
///
/// The span must enclose at least one byte, so `pic{}` is left alone. Inner
/// braces are part of the fragment, which keeps values such as
/// `data-x="{a}"` intact.
pub fn extract_from_alt(alt: &str) -> AltExtraction {
    let bytes = alt.as_bytes();
    let span = memchr(b'{', bytes)
        .and_then(|open| memrchr(b'}', bytes).map(|close| (open, close)))
        .filter(|&(open, close)| close > open + 1);

    match span {
        Some((open, close)) => AltExtraction {
            source: alt.to_string(),
            extracted: true,
            start: alt[..open].to_string(),
            attrs: alt[open + 1..close].to_string(),
            end: alt[close + 1..].to_string(),
        },
        None => AltExtraction {
            source: alt.to_string(),
            ..Default::default()
        },
    }
}

/// Alt attributes decoded, plus the alt text left once they are removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AltAttrs {
    pub alt: String,
    pub extraction: AltExtraction,
    pub properties: PropertyMap,
}

/// Extract and decode the fragment embedded in `alt`.
pub fn attrs_from_alt(alt: &str) -> Result<AltAttrs> {
    let extraction = extract_from_alt(alt);
    let properties = if extraction.extracted {
        decode_attrs(&extraction.attrs).map_err(|e| e.with_origin(AttrOrigin::Alt))?
    } else {
        PropertyMap::new()
    };
    Ok(AltAttrs {
        alt: extraction.residual(),
        extraction,
        properties,
    })
}

/// Write `properties` back into the alt text described by `ex`.
///
/// An existing fragment is replaced in place, otherwise one is appended. An
/// empty map leaves only the visible text.
pub fn salt(ex: &AltExtraction, properties: &PropertyMap) -> String {
    let encoded = encode_attrs(properties);
    match (encoded.is_empty(), ex.extracted) {
        (false, true) => format!("{}{{{encoded}}}{}", ex.start, ex.end),
        (false, false) => format!("{}{{{encoded}}}", ex.source),
        (true, _) => ex.residual(),
    }
}
