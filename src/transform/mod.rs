//! Image transforms run over a parsed document.
//!
//! - Rebuild: embedded attributes become element attributes
//! - Embed: element attributes become embedded attributes

pub mod embed;
pub mod rebuild;

use log::debug;

use crate::dom::{
    Dom, NodeId, Walk, looks_like_document, parse_document, parse_fragment, serialize_children,
    walk,
};
use crate::error::Result;
use crate::options::{Command, NormalizedOptions, OptionsInput, normalize_opts};

pub use embed::{embed_image, pick_attrs};
pub use rebuild::{ATTR_PREFIX, Link, Special, custom_attr_name, fit_to_max, rebuild_image};

/// Elements the transforms are dispatched on.
const IMAGE_TAG: &str = "img";

/// Run one pass over the descendants of `root`.
pub fn run_pass(dom: &mut Dom, root: NodeId, opts: &NormalizedOptions) -> Result<()> {
    walk(dom, root, |dom, visit| {
        if !dom.is_element_named(visit.node, IMAGE_TAG) {
            return Ok(Walk::Continue);
        }
        match opts.command {
            Command::Rebuild => rebuild_image(dom, visit, opts),
            Command::Embed => embed_image(dom, visit, opts),
        }
    })
}

/// Run every pass in order; each pass sees the result of the previous one.
///
/// On error the tree may already be partly rewritten.
pub fn process(dom: &mut Dom, root: NodeId, passes: &[NormalizedOptions]) -> Result<()> {
    for (i, opts) in passes.iter().enumerate() {
        debug!("pass {}/{}: {:?}", i + 1, passes.len(), opts.command);
        run_pass(dom, root, opts)?;
    }
    Ok(())
}

/// Process HTML text with already normalized passes.
///
/// Whole documents (starting with a doctype or `<html>`) are serialized back
/// as documents; anything else is treated as a body fragment.
pub fn process_html_with(html: &str, passes: &[NormalizedOptions]) -> Result<String> {
    let mut parsed = if looks_like_document(html) {
        parse_document(html)
    } else {
        parse_fragment(html)
    };
    process(&mut parsed.dom, parsed.root, passes)?;
    Ok(serialize_children(&parsed.dom, parsed.root))
}

/// Normalize `opts` and process HTML text.
pub fn process_html(html: &str, opts: &OptionsInput) -> Result<String> {
    let passes = normalize_opts(opts)?;
    process_html_with(html, &passes)
}
