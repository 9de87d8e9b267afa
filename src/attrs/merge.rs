//! Merge of property maps from several sources.

use crate::query::{encode_modifiers, merge_pairs, to_modifiers};

use super::{PropertyMap, PropertyValue};

const CLASS: &str = "class";
const MODIFIERS: &str = "modifiers";

/// Merge `maps`, later maps overriding earlier ones key by key.
///
/// `class` is merged as a token set: tokens are added in order of first
/// appearance and a `-token` in a later map removes `token`. `modifiers` is
/// merged key-wise as a `key=value&...` map. Keys keep the position of their
/// first appearance.
pub fn merge_attrs(maps: &[&PropertyMap]) -> PropertyMap {
    let mut merged = PropertyMap::new();
    let mut classes: Vec<String> = Vec::new();
    let mut modifiers = Vec::new();

    for map in maps {
        for (key, value) in map.iter() {
            match key {
                CLASS => {
                    for token in value.tokens() {
                        match token.strip_prefix('-') {
                            Some(removed) if !removed.is_empty() => {
                                classes.retain(|t| t != removed);
                            }
                            _ => {
                                if !classes.contains(&token) {
                                    classes.push(token);
                                }
                            }
                        }
                    }
                    merged.insert(CLASS, PropertyValue::Tokens(Vec::new()));
                }
                MODIFIERS => {
                    merge_pairs(&mut modifiers, to_modifiers(&value.as_text()));
                    merged.insert(MODIFIERS, PropertyValue::Text(String::new()));
                }
                _ => {
                    merged.insert(key, value.clone());
                }
            }
        }
    }

    if merged.contains_key(CLASS) {
        if classes.is_empty() {
            merged.remove(CLASS);
        } else {
            merged.insert(CLASS, PropertyValue::Tokens(classes));
        }
    }
    if merged.contains_key(MODIFIERS) {
        merged.insert(MODIFIERS, encode_modifiers(&modifiers));
    }
    merged
}
