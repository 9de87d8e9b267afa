//! HTML parsing into the arena DOM using html5ever.

use html5ever::driver::ParseOpts;
use html5ever::parse_document as html5ever_parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;

use super::arena::{Dom, NodeId};
use super::tree_sink::DomSink;

/// A parsed tree together with the node whose children are the content.
///
/// For fragments the root is the synthetic `<body>`; for full documents it
/// is the document node itself.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub dom: Dom,
    pub root: NodeId,
}

fn parse_with_sink(html: &str) -> Dom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            ..Default::default()
        },
        ..Default::default()
    };

    html5ever_parse_document(DomSink::new(), opts)
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}

/// Parse a complete HTML document.
pub fn parse_document(html: &str) -> Fragment {
    let dom = parse_with_sink(html);
    let root = dom.document();
    Fragment { dom, root }
}

/// Parse a fragment of HTML (not a full document).
///
/// The fragment is wrapped in a minimal document and its content is read back
/// from `<body>`, so `<p>` auto-closing and entity decoding behave exactly as
/// they do in a browser.
pub fn parse_fragment(html: &str) -> Fragment {
    let wrapped = format!("<!DOCTYPE html><html><head></head><body>{html}</body></html>");
    let dom = parse_with_sink(&wrapped);
    let root = dom.find_by_tag("body").unwrap_or_else(|| dom.document());
    Fragment { dom, root }
}

/// Heuristic used by the CLI: does the input look like a whole document?
pub fn looks_like_document(html: &str) -> bool {
    let head = html.trim_start();
    let prefix: String = head.chars().take(16).collect::<String>().to_ascii_lowercase();
    prefix.starts_with("<!doctype") || prefix.starts_with("<html")
}
