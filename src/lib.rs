//! # image-salt
//!
//! Rewrite `<img>` elements from attributes embedded in the document text.
//!
//! Authors attach extra attributes to an image either inside its alt text or
//! in a `{...}` block right after it:
//!
//! ```html
//! <p><img src="/a.jpg" alt="photo{class=&quot;rounded&quot; data-salt-max-w=&quot;600&quot;}"></p>
//! <p><img src="/b.jpg" alt="photo">{class="rounded" data-salt-thumb}</p>
//! ```
//!
//! ## Features
//!
//! - **Rebuild**: decode embedded attributes, apply them to the element and
//!   strip the markup
//! - **Embed**: the inverse; mirror live attributes back into alt text or a
//!   block
//! - Special attributes for query-string edits, thumbnail links, maximum
//!   dimensions and `modifiers` maps
//! - Several configurations applied as sequential passes
//!
//! ## Quick Start
//!
//! ```
//! use image_salt::{OptionsInput, process_html};
//!
//! let html = r#"<p><img src="/a.jpg" alt="pic{class=&quot;light&quot;}"></p>"#;
//! let out = process_html(html, &OptionsInput::default()).unwrap();
//! assert_eq!(out, r#"<p><img src="/a.jpg" alt="pic" class="light"></p>"#);
//! ```
//!
//! ## Working with the tree
//!
//! [`process`] runs over an already parsed [`dom::Dom`], so callers that need
//! atomic updates can clone the tree first and drop it on error:
//!
//! ```
//! use image_salt::{Options, dom, normalize_opts, process};
//!
//! let mut frag = dom::parse_fragment(r#"<p><img src="/a.jpg" alt="">{width="300"}</p>"#);
//! let passes = normalize_opts(&Options::default().into()).unwrap();
//! let mut work = frag.dom.clone();
//! process(&mut work, frag.root, &passes).unwrap();
//! frag.dom = work;
//!
//! assert_eq!(
//!     dom::serialize_children(&frag.dom, frag.root),
//!     r#"<p><img src="/a.jpg" alt="" width="300"></p>"#
//! );
//! ```

pub mod attrs;
pub mod dom;
pub mod error;
pub mod options;
pub mod query;
pub mod transform;
pub mod util;

pub use attrs::{PropertyMap, PropertyValue, decode_attrs, encode_attrs};
pub use error::{AttrOrigin, Error, Result};
pub use options::{
    Command, EmbedTo, NormalizedOptions, Options, OptionsInput, load_options, normalize_opts,
    parse_options,
};
pub use transform::{process, process_html, process_html_with};
