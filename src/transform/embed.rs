//! Embed: mirror live image attributes into alt text or a following block.

use log::{debug, trace};

use crate::attrs::{
    BlockAttrs, BlockBy, PropertyMap, attrs_from_alt, attrs_from_block, block_text, merge_attrs,
    remove_block, salt,
};
use crate::dom::{Attribute, Dom, NodeId, Visit, Walk};
use crate::error::Result;
use crate::options::{EmbedTo, NormalizedOptions};

/// Select `names` from the live attributes, in the order given.
///
/// `src` and `alt` are never picked.
pub fn pick_attrs(live: &PropertyMap, names: &[String]) -> PropertyMap {
    let mut picked = PropertyMap::new();
    for name in names {
        if name == "src" || name == "alt" {
            continue;
        }
        if let Some(value) = live.get(name) {
            picked.insert(name.as_str(), value.clone());
        }
    }
    picked
}

/// Whether the child at `index` continues the current line with visible text.
fn continues_line(dom: &Dom, parent: NodeId, index: usize) -> bool {
    dom.children(parent)
        .get(index)
        .and_then(|&node| dom.text_content(node))
        .and_then(|text| text.split('\n').next())
        .is_some_and(|line| !line.trim().is_empty())
}

/// Set `alt`, placing it right after `src` when the image has none yet.
fn set_alt(dom: &mut Dom, node: NodeId, value: String) {
    if dom.get_attr(node, "alt").is_some() {
        dom.set_attr(node, "alt", value);
        return;
    }
    let mut attrs = dom.attrs(node).to_vec();
    let at = attrs
        .iter()
        .position(|a| a.name.local.as_ref() == "src")
        .map_or(0, |i| i + 1);
    attrs.insert(at, Attribute::new("alt", value));
    dom.set_attrs(node, attrs);
}

/// Embed the picked attributes of the image at `visit`.
///
/// Live attributes are left as they are; only the alt text and the block
/// after the image change.
pub fn embed_image(dom: &mut Dom, visit: Visit<'_>, opts: &NormalizedOptions) -> Result<Walk> {
    let base_url = opts.base_url.as_str();
    match dom.get_attr(visit.node, "src") {
        Some(src) if src.starts_with(base_url) => {}
        _ => {
            trace!("skipping image outside {base_url:?}");
            return Ok(Walk::Continue);
        }
    }

    let current_alt = dom.get_attr(visit.node, "alt").map(str::to_string);
    let alt = attrs_from_alt(current_alt.as_deref().unwrap_or_default())?;
    let live = PropertyMap::from_attributes(dom.attrs(visit.node));
    let picked = pick_attrs(&live, &opts.embed.pick_attrs);

    match opts.embed.embed_to {
        EmbedTo::Alt => {
            let merged = merge_attrs(&[&alt.properties, &picked]);
            let new_alt = salt(&alt.extraction, &merged);
            if current_alt.as_deref().unwrap_or_default() != new_alt {
                debug!("embedding into alt: {new_alt:?}");
                set_alt(dom, visit.node, new_alt);
            }
        }
        EmbedTo::Block => {
            let parent = visit.parent();
            let block = match attrs_from_block(dom, visit.ancestors, parent, visit.index + 1)? {
                BlockAttrs {
                    block_by: BlockBy::Sibling(_),
                    ..
                } => BlockAttrs::none(),
                block => block,
            };
            let merged = merge_attrs(&[&alt.properties, &block.properties, &picked]);

            if alt.extraction.extracted {
                set_alt(dom, visit.node, alt.alt);
            }
            remove_block(dom, visit.ancestors, parent, &block);
            if let Some(mut text) = block_text(&merged) {
                // A block must end its line to be found again.
                if continues_line(dom, parent, visit.index + 1) {
                    text.push('\n');
                }
                debug!("embedding block after image: {text:?}");
                let node = dom.create_text(text);
                dom.insert_child(parent, visit.index + 1, node);
            }
        }
    }
    Ok(Walk::Continue)
}
