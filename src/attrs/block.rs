//! Attribute blocks written in the text after an image.
//!
//! A block is a `{...}` fragment that may be split over several text nodes
//! and `<br>` elements:
//!
//! ```text
//! <p><img src="a.jpg" alt="">{class="light"}</p>            text
//! <img src="a.jpg" alt=""><p>{class="light"}</p>            following
//! <p><img src="a.jpg" alt=""></p> <p>{class="light"}</p>    sibling
//! ```
//!
//! Locating a block yields a removal range so the consumed markup can be
//! spliced out afterwards without touching the surrounding content.

use log::debug;

use crate::dom::{Dom, NodeId};
use crate::error::{AttrOrigin, Result};

use super::{PropertyMap, decode_attrs, encode_attrs};

// ============================================================================
// Scanning
// ============================================================================

/// A block found in a sibling list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockExtraction {
    /// Index of the text node holding the opening `{`.
    pub start: usize,
    /// Index of the text node holding the closing `}`.
    pub end: usize,
    /// Text after the closing `}` in the last node, kept in the document.
    ///
    /// Whitespace up to the end of the line, then anything on later lines.
    pub keep_text: String,
    /// The fragment between the braces, whitespace-folded.
    pub attrs: String,
}

/// Replace non-ASCII whitespace (no-break and typographic spaces) with an
/// ASCII space.
pub fn fold_whitespace(text: &str) -> String {
    text.chars()
        .map(|c| if !c.is_ascii() && c.is_whitespace() { ' ' } else { c })
        .collect()
}

fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// Index of the `}` closing a block body: the first brace outside a quoted
/// attribute value, which must be a `}`.
fn closing_brace(inner: &str) -> Option<usize> {
    let mut quote = None;
    let mut after_eq = false;
    for (i, c) in inner.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '}' => return Some(i),
            '{' => return None,
            '"' | '\'' if after_eq => quote = Some(c),
            _ => {}
        }
        after_eq = c == '=' || (after_eq && c.is_whitespace());
    }
    None
}

/// Match `^\s*\{(.+)\}\s*$` (multi-line) against accumulated block text.
///
/// Braces inside quoted values belong to the fragment. The closing `}` must
/// be followed by whitespace only up to the end of its line, so text after a
/// block never becomes part of it.
///
/// Returns the fragment and the offset just past the closing `}`.
fn match_block(text: &str) -> Option<(&str, usize)> {
    let body = text.trim_start_matches(char::is_whitespace);
    let inner = body.strip_prefix('{')?;
    let close = closing_brace(inner)?;
    let rest = &inner[close + 1..];
    let line = rest.split('\n').next().unwrap_or_default();
    if close == 0 || !is_blank(line) {
        return None;
    }
    Some((&inner[..close], text.len() - rest.len()))
}

/// Scan `siblings` from `start` for a `{...}` block.
///
/// A single `<br>` may precede the block when it is the first node scanned,
/// and whitespace-only text nodes are skipped; anything else before the
/// opening brace means there is no block. Once opened, the block runs over
/// text nodes and `<br>` elements (read as newlines) until a closing brace
/// ends a line; any other element aborts the scan.
pub fn extract_from_block(dom: &Dom, siblings: &[NodeId], start: usize) -> Option<BlockExtraction> {
    let mut index = start;

    // Find the node that opens the block.
    let open = loop {
        let &node = siblings.get(index)?;
        if index == start && dom.is_element_named(node, "br") {
            index += 1;
            continue;
        }
        let text = dom.text_content(node)?;
        if is_blank(text) {
            index += 1;
            continue;
        }
        if !text.trim_start_matches(char::is_whitespace).starts_with('{') {
            return None;
        }
        break index;
    };

    let mut accumulated = String::new();
    for (index, &node) in siblings.iter().enumerate().skip(open) {
        if dom.is_element_named(node, "br") {
            accumulated.push('\n');
            continue;
        }
        let text = dom.text_content(node)?;
        let node_start = accumulated.len();
        accumulated.push_str(text);

        if let Some((fragment, end)) = match_block(&accumulated) {
            let keep_text = text.get(end.saturating_sub(node_start)..).unwrap_or_default();
            return Some(BlockExtraction {
                start: open,
                end: index,
                keep_text: keep_text.to_string(),
                attrs: fold_whitespace(fragment),
            });
        }
    }
    None
}

// ============================================================================
// Locating
// ============================================================================

/// The paragraph after the image's own parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiblingParagraph {
    pub node: NodeId,
    /// First index after the image's parent in the grandparent's list.
    pub gap_start: usize,
    /// Index of the paragraph in the grandparent's list.
    pub index: usize,
}

/// Find the paragraph following the parent of the current node.
///
/// `ancestors` is the path down to the current node's parent. Whitespace-only
/// text between the parent and the paragraph is allowed; any other node in
/// between, or a non-paragraph element, yields `None`.
pub fn sibling_paragraph(dom: &Dom, ancestors: &[NodeId]) -> Option<SiblingParagraph> {
    let [.., grandparent, parent] = ancestors else {
        return None;
    };
    let uncles = dom.children(*grandparent);
    let parent_index = uncles.iter().position(|n| n == parent)?;
    let gap_start = parent_index + 1;

    for (index, &node) in uncles.iter().enumerate().skip(gap_start) {
        if let Some(text) = dom.text_content(node) {
            if is_blank(text) {
                continue;
            }
            return None;
        }
        if dom.is_element_named(node, "p") {
            return Some(SiblingParagraph {
                node,
                gap_start,
                index,
            });
        }
        return None;
    }
    None
}

/// Which strategy located the attribute block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockBy {
    /// Inline text after the image in the same parent.
    Text,
    /// Leading content of a paragraph directly after the image.
    Following(NodeId),
    /// Leading content of the paragraph after the image's parent.
    Sibling(SiblingParagraph),
    /// No block.
    None,
}

/// Span of a child list consumed by a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveRange {
    pub start_idx: usize,
    pub end_idx: usize,
    /// Replacement text for the node at `end_idx` when it is kept.
    pub keep_text: String,
    /// Number of children removed from `start_idx`.
    pub count: usize,
}

impl RemoveRange {
    fn from_extraction(ex: &BlockExtraction) -> Self {
        let count = if ex.keep_text.is_empty() {
            ex.end - ex.start + 1
        } else {
            ex.end - ex.start
        };
        RemoveRange {
            start_idx: ex.start,
            end_idx: ex.end,
            keep_text: ex.keep_text.clone(),
            count,
        }
    }
}

/// Result of looking for an attribute block after an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAttrs {
    pub block_by: BlockBy,
    pub remove_range: Option<RemoveRange>,
    pub properties: PropertyMap,
}

impl BlockAttrs {
    pub fn none() -> Self {
        BlockAttrs {
            block_by: BlockBy::None,
            remove_range: None,
            properties: PropertyMap::new(),
        }
    }

    /// Whether a block was found.
    pub fn found(&self) -> bool {
        self.block_by != BlockBy::None
    }

    /// The node whose child list holds the block.
    fn owner(&self, parent: NodeId) -> Option<NodeId> {
        match self.block_by {
            BlockBy::Text => Some(parent),
            BlockBy::Following(paragraph) => Some(paragraph),
            BlockBy::Sibling(sibling) => Some(sibling.node),
            BlockBy::None => None,
        }
    }
}

fn decode_block(block_by: BlockBy, ex: BlockExtraction) -> Result<BlockAttrs> {
    let properties = decode_attrs(&ex.attrs).map_err(|e| e.with_origin(AttrOrigin::Block))?;
    debug!(
        "attribute block found ({block_by:?}) at {}..={}",
        ex.start, ex.end
    );
    Ok(BlockAttrs {
        block_by,
        remove_range: Some(RemoveRange::from_extraction(&ex)),
        properties,
    })
}

/// Locate and decode the attribute block for the child at `start_index - 1`
/// of `parent`.
///
/// Strategies are tried in order: a paragraph at `start_index` (searched from
/// its first child), inline text from `start_index`, and when the parent has
/// no further children, the paragraph after the parent. The first strategy
/// whose precondition holds decides the outcome.
pub fn attrs_from_block(
    dom: &Dom,
    ancestors: &[NodeId],
    parent: NodeId,
    start_index: usize,
) -> Result<BlockAttrs> {
    let siblings = dom.children(parent);

    if let Some(&next) = siblings.get(start_index) {
        if dom.is_element_named(next, "p") {
            return match extract_from_block(dom, dom.children(next), 0) {
                Some(ex) => decode_block(BlockBy::Following(next), ex),
                None => Ok(BlockAttrs::none()),
            };
        }
        return match extract_from_block(dom, siblings, start_index) {
            Some(ex) => decode_block(BlockBy::Text, ex),
            None => Ok(BlockAttrs::none()),
        };
    }

    if let Some(sibling) = sibling_paragraph(dom, ancestors)
        && let Some(ex) = extract_from_block(dom, dom.children(sibling.node), 0)
    {
        return decode_block(BlockBy::Sibling(sibling), ex);
    }
    Ok(BlockAttrs::none())
}

// ============================================================================
// Removal and writing
// ============================================================================

/// Splice a located block out of the tree.
///
/// `ancestors` ends with `parent`, the node holding the image. A following
/// paragraph left empty (or holding only whitespace) is removed; a sibling
/// paragraph left empty is removed together with the whitespace between it
/// and `parent`.
pub fn remove_block(dom: &mut Dom, ancestors: &[NodeId], parent: NodeId, block: &BlockAttrs) {
    let (Some(owner), Some(range)) = (block.owner(parent), &block.remove_range) else {
        return;
    };

    let kept = dom.children(owner).get(range.end_idx).copied();
    dom.remove_children(owner, range.start_idx..range.start_idx + range.count);
    if !range.keep_text.is_empty()
        && let Some(kept) = kept
    {
        dom.set_text(kept, range.keep_text.as_str());
    }

    let emptied = dom
        .children(owner)
        .iter()
        .all(|&n| dom.text_content(n).is_some_and(is_blank));
    if !emptied {
        return;
    }
    match block.block_by {
        BlockBy::Following(paragraph) => dom.detach(paragraph),
        BlockBy::Sibling(sibling) => {
            if let [.., grandparent, _] = ancestors {
                dom.remove_children(*grandparent, sibling.gap_start..sibling.index + 1);
            }
        }
        BlockBy::Text | BlockBy::None => {}
    }
}

/// Render `properties` as a block, or `None` when there is nothing to write.
pub fn block_text(properties: &PropertyMap) -> Option<String> {
    let encoded = encode_attrs(properties);
    (!encoded.is_empty()).then(|| format!("{{{encoded}}}"))
}
