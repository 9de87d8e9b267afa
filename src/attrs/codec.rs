//! Attribute-fragment codec.
//!
//! A fragment is the inside of an HTML start tag after the tag name, e.g.
//! `class="a b" width="300" loading`. Decoding reuses the HTML parser so
//! quoting and entity rules are exactly those of a browser.

use crate::dom::{escape_attr, parse_fragment};
use crate::error::{AttrOrigin, Error, Result};

use super::{PropertyMap, PropertyValue};

const DUMMY_TAG: &str = "dummy";

/// Decode an attribute fragment into a property map.
///
/// The fragment is accepted only when it parses as the attribute list of a
/// single empty element; anything that closes the tag early (a stray `>`) or
/// injects markup is rejected with [`Error::InvalidAttrs`].
pub fn decode_attrs(fragment: &str) -> Result<PropertyMap> {
    let parsed = parse_fragment(&format!("<{DUMMY_TAG} {fragment}/>"));
    let dom = &parsed.dom;

    let invalid = || Error::InvalidAttrs {
        origin: AttrOrigin::Fragment,
        fragment: fragment.to_string(),
    };

    let [element] = dom.children(parsed.root) else {
        return Err(invalid());
    };
    if !dom.is_element_named(*element, DUMMY_TAG) || !dom.children(*element).is_empty() {
        return Err(invalid());
    }

    Ok(PropertyMap::from_attributes(dom.attrs(*element)))
}

/// Encode a property map as an attribute fragment, in map order.
///
/// Empty values are written as bare names; empty token lists are dropped.
pub fn encode_attrs(properties: &PropertyMap) -> String {
    let mut parts = Vec::with_capacity(properties.len());
    for (name, value) in properties.iter() {
        match value {
            PropertyValue::Tokens(tokens) if tokens.is_empty() => continue,
            _ => {}
        }
        let text = value.as_text();
        if text.is_empty() {
            parts.push(name.to_string());
        } else {
            parts.push(format!("{name}=\"{}\"", escape_attr(&text)));
        }
    }
    parts.join(" ")
}
