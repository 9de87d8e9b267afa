//! Arena DOM used by the image rewriter: parsing, traversal and serialization.

mod arena;
mod parse;
mod serialize;
mod tree_sink;
mod walk;

pub use arena::{Attribute, Dom, Node, NodeData, NodeId};
pub use parse::{Fragment, looks_like_document, parse_document, parse_fragment};
pub use serialize::{escape_attr, escape_text, serialize_children, serialize_node};
pub use tree_sink::{DomSink, NodeHandle};
pub use walk::{Visit, Walk, walk};
