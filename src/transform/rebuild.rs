//! Rebuild: apply embedded attributes to an image and strip the markup.

use log::{debug, trace};

use crate::attrs::{PropertyMap, attrs_from_alt, attrs_from_block, merge_attrs, remove_block};
use crate::dom::{Attribute, Dom, Visit, Walk};
use crate::error::Result;
use crate::options::NormalizedOptions;
use crate::query::{edit_query, modifiers_json, to_modifiers, trim_base_url};

/// Namespace used for the special `data-*` attribute names.
pub const ATTR_PREFIX: &str = "salt";

/// Name of a custom attribute: `data-<prefix>-<suffix>`.
pub fn custom_attr_name(prefix: &str, suffix: &str) -> String {
    format!("data-{prefix}-{suffix}")
}

// ============================================================================
// Special attributes
// ============================================================================

/// Attributes that steer the rebuild instead of being copied to the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    /// `data-salt-qq`: replace the query string of `src`.
    ForceQuery,
    /// `data-salt-q`: merge into the query string of `src`.
    MergeQuery,
    /// `data-salt-thumb`: wrap the image in a link.
    Thumbnail,
    /// `data-salt-max-w`: scale down to a maximum width.
    MaxWidth,
    /// `data-salt-max-h`: scale down to a maximum height.
    MaxHeight,
    /// `modifiers`: promoted to a JSON `:modifiers` binding.
    Modifiers,
}

impl Special {
    /// Order in which special attributes are applied.
    ///
    /// Handlers run in this order after every ordinary attribute has been
    /// copied, whatever their position in the merged map. `:modifiers` is
    /// therefore always written after the pass-through attributes.
    pub const ORDER: [Special; 6] = [
        Special::ForceQuery,
        Special::MergeQuery,
        Special::Thumbnail,
        Special::MaxWidth,
        Special::MaxHeight,
        Special::Modifiers,
    ];

    /// Attribute name that triggers this handler.
    pub fn attr_name(self) -> String {
        let suffix = match self {
            Special::ForceQuery => "qq",
            Special::MergeQuery => "q",
            Special::Thumbnail => "thumb",
            Special::MaxWidth => "max-w",
            Special::MaxHeight => "max-h",
            Special::Modifiers => return "modifiers".to_string(),
        };
        custom_attr_name(ATTR_PREFIX, suffix)
    }

    pub fn from_attr_name(name: &str) -> Option<Special> {
        Special::ORDER.into_iter().find(|s| s.attr_name() == name)
    }

    fn apply(self, state: &mut RebuildState, value: &str) {
        match self {
            Special::ForceQuery => state.src = edit_query(&state.src, value, true),
            Special::MergeQuery => state.src = edit_query(&state.src, value, false),
            Special::Thumbnail => state.link = Some(Link::for_thumbnail(&state.src, value)),
            Special::MaxWidth => {
                let (w, h) = fit_to_max(state.dimensions(), value);
                state.set_dimensions((w, h));
            }
            Special::MaxHeight => {
                let (h, w) = fit_to_max(swap(state.dimensions()), value);
                state.set_dimensions((w, h));
            }
            Special::Modifiers => {
                state
                    .properties
                    .insert(":modifiers", modifiers_json(&to_modifiers(value)));
            }
        }
    }
}

fn swap<T>((a, b): (T, T)) -> (T, T) {
    (b, a)
}

/// Scale `(primary, secondary)` so that `primary <= max`, keeping the ratio.
///
/// Only a numeric `primary` larger than `max` is scaled. A negative or
/// non-numeric `max` disables the limit; zero is honored.
pub fn fit_to_max(dims: (Option<u64>, Option<u64>), max: &str) -> (Option<u64>, Option<u64>) {
    let Ok(max) = max.trim().parse::<i64>() else {
        return dims;
    };
    let Ok(max) = u64::try_from(max) else {
        return dims;
    };
    match dims {
        (Some(primary), secondary) if primary > max => {
            let scale = |s: u64| (s as f64 * max as f64 / primary as f64).round() as u64;
            (Some(max), secondary.map(scale))
        }
        _ => dims,
    }
}

/// Link target for a thumbnail image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    /// Open in a new tab with `target` and `rel`.
    pub new_tab: bool,
}

impl Link {
    /// `value` is used verbatim when it is an absolute URL or a root-relative
    /// path; otherwise it edits the query of `src` (an empty value drops it).
    pub fn for_thumbnail(src: &str, value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Link {
                href: value.to_string(),
                new_tab: true,
            }
        } else if value.starts_with('/') {
            Link {
                href: value.to_string(),
                new_tab: false,
            }
        } else {
            Link {
                href: edit_query(src, value, true),
                new_tab: true,
            }
        }
    }

    fn attributes(&self) -> Vec<Attribute> {
        let mut attrs = vec![Attribute::new("href", self.href.as_str())];
        if self.new_tab {
            attrs.push(Attribute::new("target", "_blank"));
            attrs.push(Attribute::new("rel", "noopener noreferrer"));
        }
        attrs
    }
}

struct RebuildState {
    src: String,
    link: Option<Link>,
    properties: PropertyMap,
}

impl RebuildState {
    fn dimension(&self, name: &str) -> Option<u64> {
        self.properties.get(name).and_then(|v| v.as_u64())
    }

    fn dimensions(&self) -> (Option<u64>, Option<u64>) {
        (self.dimension("width"), self.dimension("height"))
    }

    fn set_dimensions(&mut self, (width, height): (Option<u64>, Option<u64>)) {
        for (name, value) in [("width", width), ("height", height)] {
            if let Some(value) = value
                && self.dimension(name) != Some(value)
            {
                self.properties.insert(name, value.to_string());
            }
        }
    }
}

// ============================================================================
// Element rewrite
// ============================================================================

/// Rebuild the image at `visit`.
///
/// Returns [`Walk::Skip`] once the image has been replaced so the walker does
/// not descend into a link wrapper and meet the image again.
pub fn rebuild_image(dom: &mut Dom, visit: Visit<'_>, opts: &NormalizedOptions) -> Result<Walk> {
    let base_url = opts.base_url.as_str();
    let Some(src) = dom.get_attr(visit.node, "src").map(str::to_string) else {
        trace!("skipping image without src");
        return Ok(Walk::Continue);
    };
    if !src.starts_with(base_url) {
        trace!("skipping {src}: outside {base_url:?}");
        return Ok(Walk::Continue);
    }

    let parent = visit.parent();
    let alt = attrs_from_alt(dom.get_attr(visit.node, "alt").unwrap_or_default())?;
    let block = attrs_from_block(dom, visit.ancestors, parent, visit.index + 1)?;

    let rebuild = &opts.rebuild;
    let trimmed = if rebuild.keep_base_url {
        src.clone()
    } else {
        trim_base_url(base_url, &src)
    };
    if !alt.extraction.extracted
        && !block.found()
        && rebuild.base_properties.is_empty()
        && trimmed == src
        && dom.is_element_named(visit.node, &rebuild.tag_name)
    {
        trace!("nothing to rebuild for {src}");
        return Ok(Walk::Continue);
    }

    let work = merge_attrs(&[&rebuild.base_properties, &alt.properties, &block.properties]);

    let mut properties = PropertyMap::from_attributes(dom.attrs(visit.node));
    properties.remove("src");
    properties.remove("alt");

    let mut specials = Vec::new();
    for (key, value) in work.iter() {
        match Special::from_attr_name(key) {
            Some(special) => specials.push((special, value.as_text().into_owned())),
            None => {
                properties.insert(key, value.clone());
            }
        }
    }

    let mut state = RebuildState {
        src: src.clone(),
        link: None,
        properties,
    };
    for special in Special::ORDER {
        if let Some((_, value)) = specials.iter().find(|(s, _)| *s == special) {
            special.apply(&mut state, value);
        }
    }

    let new_src = if rebuild.keep_base_url {
        state.src
    } else {
        trim_base_url(base_url, &state.src)
    };

    let mut attrs = vec![
        Attribute::new("src", new_src.as_str()),
        Attribute::new("alt", alt.alt),
    ];
    attrs.extend(state.properties.to_attributes());
    let image = dom.create_html_element(&rebuild.tag_name, attrs);

    let replacement = match &state.link {
        Some(link) => {
            let anchor = dom.create_html_element("a", link.attributes());
            dom.append(anchor, image);
            anchor
        }
        None => image,
    };

    remove_block(dom, visit.ancestors, parent, &block);
    dom.replace_child(parent, visit.index, replacement);

    debug!(
        "rebuilt {src} -> <{} src={new_src:?}> (block: {:?}, link: {})",
        rebuild.tag_name,
        block.block_by,
        state.link.is_some()
    );
    Ok(Walk::Skip)
}
