//! End-to-end rebuild tests.
//!
//! Each test feeds an HTML fragment through `process_html` and compares the
//! serialized result.

use image_salt::options::RebuildOptions;
use image_salt::{AttrOrigin, Error, Options, OptionsInput, process_html};

const HEAD: &str = "<h1>test</h1><h2>test1</h2><p>image-salt-1</p>";

fn rebuild(html: &str) -> String {
    rebuild_with(html, Options::default())
}

fn rebuild_with(html: &str, opts: Options) -> String {
    process_html(html, &OptionsInput::One(opts)).expect("rebuild should succeed")
}

fn with_rebuild(base_url: &str, rebuild: RebuildOptions) -> Options {
    Options {
        base_url: Some(base_url.to_string()),
        rebuild: Some(rebuild),
        ..Default::default()
    }
}

// ============================================================================
// Pass-through
// ============================================================================

#[test]
fn test_plain_images_are_untouched() {
    let html = format!(
        "{HEAD}<p><img src=\"/path/to/image1.jpg\" alt=\"image1\"></p>\
         <h2>test2</h2><p><img src=\"/path/to/image2.jpg\" alt=\"\"></p>\
         <p><img src=\"/path/to/image3.jpg\"></p>"
    );
    assert_eq!(rebuild(&html), html);
}

#[test]
fn test_rebuild_is_idempotent() {
    let once = rebuild(
        r#"<p><img src="/a.jpg" alt="pic{class=&quot;light&quot; data-salt-max-w=&quot;600&quot;}" width="4000" height="2000"></p>"#,
    );
    assert_eq!(rebuild(&once), once);
}

// ============================================================================
// Alt-embedded attributes
// ============================================================================

#[test]
fn test_rebuild_with_alt_attrs() {
    let html = format!(
        "{HEAD}<p><img src=\"/path/to/image1.jpg\" alt=\"image1{{class=&#x22;light-img&#x22;}}\"></p>\
         <p><img src=\"/path/to/image2.jpg\" alt=\"{{sizes=&#x22;sm:100vw md:50vw lg:400px&#x22;}}\"></p>"
    );
    assert_eq!(
        rebuild(&html),
        format!(
            "{HEAD}<p><img src=\"/path/to/image1.jpg\" alt=\"image1\" class=\"light-img\"></p>\
             <p><img src=\"/path/to/image2.jpg\" alt=\"\" sizes=\"sm:100vw md:50vw lg:400px\"></p>"
        )
    );
}

#[test]
fn test_alt_text_around_fragment_is_kept() {
    assert_eq!(
        rebuild(r#"<p><img src="/a.jpg" alt="a {width=&quot;10&quot;} b"></p>"#),
        r#"<p><img src="/a.jpg" alt="a  b" width="10"></p>"#
    );
}

#[test]
fn test_rebuild_to_custom_tag() {
    let opts = with_rebuild(
        "",
        RebuildOptions {
            tag_name: Some("nuxt-img".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(
        rebuild_with(r#"<p><img src="/a.jpg" alt="image1"></p>"#, opts),
        r#"<p><nuxt-img src="/a.jpg" alt="image1"></nuxt-img></p>"#
    );
}

#[test]
fn test_modifiers_become_bound_json() {
    let opts = with_rebuild(
        "",
        RebuildOptions {
            tag_name: Some("nuxt-img".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(
        rebuild_with(
            r#"<p><img src="/a.jpg" alt="image1{modifiers=&quot;blur=100&quot;}"></p>"#,
            opts
        ),
        r#"<p><nuxt-img src="/a.jpg" alt="image1" :modifiers="{&quot;blur&quot;:&quot;100&quot;}"></nuxt-img></p>"#
    );
}

#[test]
fn test_modifiers_written_after_plain_attrs() {
    assert_eq!(
        rebuild(
            r#"<p><img src="/a.jpg" alt="{modifiers=&quot;blur=1&quot; loading=&quot;lazy&quot;}"></p>"#
        ),
        r#"<p><img src="/a.jpg" alt="" loading="lazy" :modifiers="{&quot;blur&quot;:&quot;1&quot;}"></p>"#
    );
}

#[test]
fn test_modifiers_merge_with_base_attrs() {
    let opts = with_rebuild(
        "",
        RebuildOptions {
            base_attrs: Some(r#"modifiers="auto=compress&amp;crop=entropy""#.to_string()),
            ..Default::default()
        },
    );
    assert_eq!(
        rebuild_with(
            r#"<p><img src="/a.jpg" alt="{modifiers=&quot;crop=faces&amp;blur=100&quot;}"></p>"#,
            opts
        ),
        r#"<p><img src="/a.jpg" alt="" :modifiers="{&quot;auto&quot;:&quot;compress&quot;,&quot;crop&quot;:&quot;faces&quot;,&quot;blur&quot;:&quot;100&quot;}"></p>"#
    );
}

// ============================================================================
// Query editing
// ============================================================================

#[test]
fn test_replace_query_parameter() {
    assert_eq!(
        rebuild(r#"<p><img src="/a.jpg?w=300" alt="image1{data-salt-qq=&quot;blur=100&quot;}"></p>"#),
        r#"<p><img src="/a.jpg?blur=100" alt="image1"></p>"#
    );
}

#[test]
fn test_merge_query_parameter() {
    assert_eq!(
        rebuild(
            r#"<p><img src="/a.jpg?w=300&amp;blur=200" alt="image1{data-salt-q=&quot;blur=100&quot;}"></p>"#
        ),
        r#"<p><img src="/a.jpg?w=300&amp;blur=100" alt="image1"></p>"#
    );
}

// ============================================================================
// Base URL
// ============================================================================

#[test]
fn test_trim_base_url() {
    let opts = with_rebuild("https://localhost:3000/", RebuildOptions::default());
    assert_eq!(
        rebuild_with(
            r#"<p><img src="https://localhost:3000/path/to/image1.jpg" alt="image1{class=&quot;light-img&quot;}"></p>"#,
            opts
        ),
        r#"<p><img src="/path/to/image1.jpg" alt="image1" class="light-img"></p>"#
    );
}

#[test]
fn test_trim_base_url_without_fragment() {
    let opts = with_rebuild("https://localhost:3000/", RebuildOptions::default());
    assert_eq!(
        rebuild_with(r#"<p><img src="https://localhost:3000/a.jpg" alt="x"></p>"#, opts),
        r#"<p><img src="/a.jpg" alt="x"></p>"#
    );
}

#[test]
fn test_skip_url_not_matching_base_url() {
    let opts = with_rebuild("https://localhost:3000/", RebuildOptions::default());
    let html = r#"<p><img src="https://localhost:3000/path/to/image1.jpg" alt="image1{class=&quot;light-img&quot;}"></p><p><img src="https://localhost:3001/path/to/image2.jpg" alt="image2{class=&quot;light-img&quot;}"></p>"#;
    assert_eq!(
        rebuild_with(html, opts),
        r#"<p><img src="/path/to/image1.jpg" alt="image1" class="light-img"></p><p><img src="https://localhost:3001/path/to/image2.jpg" alt="image2{class=&quot;light-img&quot;}"></p>"#
    );
}

#[test]
fn test_keep_base_url() {
    let opts = with_rebuild(
        "https://localhost:3000/",
        RebuildOptions {
            keep_base_url: Some(true),
            ..Default::default()
        },
    );
    assert_eq!(
        rebuild_with(
            r#"<p><img src="https://localhost:3000/path/to/image1.jpg" alt="image1{class=&quot;light-img&quot;}"></p>"#,
            opts
        ),
        r#"<p><img src="https://localhost:3000/path/to/image1.jpg" alt="image1" class="light-img"></p>"#
    );
}

// ============================================================================
// Base attributes and merging
// ============================================================================

#[test]
fn test_apply_base_attrs() {
    let opts = with_rebuild(
        "",
        RebuildOptions {
            tag_name: Some("nuxt-img".to_string()),
            base_attrs: Some(r#"provider="imgix""#.to_string()),
            ..Default::default()
        },
    );
    assert_eq!(
        rebuild_with(
            r#"<p><img src="/a.jpg" alt="image1{modifiers=&quot;blur=100&quot;}"></p>"#,
            opts
        ),
        r#"<p><nuxt-img src="/a.jpg" alt="image1" provider="imgix" :modifiers="{&quot;blur&quot;:&quot;100&quot;}"></nuxt-img></p>"#
    );
}

#[test]
fn test_class_tokens_merge_with_base_attrs() {
    let opts = with_rebuild(
        "",
        RebuildOptions {
            base_attrs: Some(r#"provider="imgix" class="rounded shadow""#.to_string()),
            ..Default::default()
        },
    );
    assert_eq!(
        rebuild_with(
            r#"<p><img src="/a.jpg" alt="image1{class=&quot;dark-img -shadow&quot;}"></p>"#,
            opts
        ),
        r#"<p><img src="/a.jpg" alt="image1" provider="imgix" class="rounded dark-img"></p>"#
    );
}

#[test]
fn test_block_overrides_alt_overrides_base() {
    let opts = with_rebuild(
        "",
        RebuildOptions {
            base_attrs: Some(r#"width="1" loading="lazy""#.to_string()),
            ..Default::default()
        },
    );
    assert_eq!(
        rebuild_with(
            r#"<p><img src="/a.jpg" alt="{width=&quot;2&quot; height=&quot;3&quot;}">{width="4"}</p>"#,
            opts
        ),
        r#"<p><img src="/a.jpg" alt="" width="4" loading="lazy" height="3"></p>"#
    );
}

#[test]
fn test_embedded_attrs_overwrite_live_attrs_in_place() {
    assert_eq!(
        rebuild(r#"<p><img width="1" src="/a.jpg" title="t" alt="{width=&quot;2&quot;}"></p>"#),
        r#"<p><img src="/a.jpg" alt="" width="2" title="t"></p>"#
    );
}

// ============================================================================
// Thumbnail links
// ============================================================================

#[test]
fn test_rebuild_into_anchor() {
    assert_eq!(
        rebuild(r#"<p><img src="/a.jpg?w=300&amp;h=200" alt="pic{data-salt-thumb}"></p>"#),
        r#"<p><a href="/a.jpg" target="_blank" rel="noopener noreferrer"><img src="/a.jpg?w=300&amp;h=200" alt="pic"></a></p>"#
    );
}

#[test]
fn test_rebuild_into_anchor_with_query() {
    assert_eq!(
        rebuild(
            r#"<p><img src="/a.jpg?w=300&amp;h=200" alt="pic{data-salt-thumb=&quot;w=600&quot;}"></p>"#
        ),
        r#"<p><a href="/a.jpg?w=600" target="_blank" rel="noopener noreferrer"><img src="/a.jpg?w=300&amp;h=200" alt="pic"></a></p>"#
    );
}

#[test]
fn test_thumbnail_uses_edited_untrimmed_src() {
    let opts = with_rebuild("https://localhost:3000/", RebuildOptions::default());
    assert_eq!(
        rebuild_with(
            r#"<p><img src="https://localhost:3000/a.jpg?w=300" alt="{data-salt-q=&quot;fm=webp&quot; data-salt-thumb}"></p>"#,
            opts
        ),
        r#"<p><a href="https://localhost:3000/a.jpg" target="_blank" rel="noopener noreferrer"><img src="/a.jpg?w=300&amp;fm=webp" alt=""></a></p>"#
    );
}

#[test]
fn test_thumbnail_verbatim_links() {
    assert_eq!(
        rebuild(r#"<p><img src="/a.jpg" alt="{data-salt-thumb=&quot;/large/a.jpg&quot;}"></p>"#),
        r#"<p><a href="/large/a.jpg"><img src="/a.jpg" alt=""></a></p>"#
    );
    assert_eq!(
        rebuild(
            r#"<p><img src="/a.jpg" alt="{data-salt-thumb=&quot;https://cdn.example.com/a.jpg&quot;}"></p>"#
        ),
        r#"<p><a href="https://cdn.example.com/a.jpg" target="_blank" rel="noopener noreferrer"><img src="/a.jpg" alt=""></a></p>"#
    );
}

// ============================================================================
// Dimension limits
// ============================================================================

#[test]
fn test_max_width_scales_proportionally() {
    assert_eq!(
        rebuild(
            r#"<p><img src="/a.jpg" alt="{data-salt-max-w=&quot;600&quot;}" width="4000" height="2000"></p>"#
        ),
        r#"<p><img src="/a.jpg" alt="" width="600" height="300"></p>"#
    );
}

#[test]
fn test_max_height_scales_proportionally() {
    assert_eq!(
        rebuild(
            r#"<p><img src="/a.jpg" alt="{width=&quot;4000&quot; height=&quot;2000&quot; data-salt-max-h=&quot;500&quot;}"></p>"#
        ),
        r#"<p><img src="/a.jpg" alt="" width="1000" height="500"></p>"#
    );
}

#[test]
fn test_max_width_under_limit_or_negative_is_noop() {
    assert_eq!(
        rebuild(r#"<p><img src="/a.jpg" alt="{data-salt-max-w=&quot;600&quot;}" width="100" height="50"></p>"#),
        r#"<p><img src="/a.jpg" alt="" width="100" height="50"></p>"#
    );
    assert_eq!(
        rebuild(r#"<p><img src="/a.jpg" alt="{data-salt-max-w=&quot;-1&quot;}" width="4000" height="2000"></p>"#),
        r#"<p><img src="/a.jpg" alt="" width="4000" height="2000"></p>"#
    );
}

// ============================================================================
// Attribute blocks
// ============================================================================

#[test]
fn test_block_in_same_paragraph() {
    assert_eq!(
        rebuild(r#"<p><img src="/a.jpg" alt="image1">{class="light-img"}</p>"#),
        r#"<p><img src="/a.jpg" alt="image1" class="light-img"></p>"#
    );
}

#[test]
fn test_block_keeps_surrounding_content() {
    assert_eq!(
        rebuild("<p>before <img src=\"/a.jpg\" alt=\"\">{class=\"x\"}\nafter <em>e</em></p>"),
        "<p>before <img src=\"/a.jpg\" alt=\"\" class=\"x\">\nafter <em>e</em></p>"
    );
}

#[test]
fn test_block_followed_by_text_on_same_line_is_ignored() {
    for html in [
        r#"<p><img src="/a.jpg" alt="">{width="300"} my caption {note}</p>"#,
        r#"<p><img src="/a.jpg" alt="">{class="x"} caption</p>"#,
        r#"<p>before <img src="/a.jpg" alt="">{class="x"} after <em>e</em></p>"#,
        r#"<img src="/a.jpg" alt=""><p>{class="x"} caption</p>"#,
        "<p><img src=\"/a.jpg\" alt=\"\"></p>\n<p>{class=\"x\"} caption {y}</p>",
    ] {
        assert_eq!(rebuild(html), html);
    }
}

#[test]
fn test_block_with_braces_in_quoted_values() {
    assert_eq!(
        rebuild("<p><img src=\"/a.jpg\" alt=\"\">{title=\"a {b}\"}\nnote {c}</p>"),
        "<p><img src=\"/a.jpg\" alt=\"\" title=\"a {b}\">\nnote {c}</p>"
    );
}

#[test]
fn test_block_over_soft_line_breaks() {
    assert_eq!(
        rebuild("<p><img src=\"/a.jpg\" alt=\"a\"><br>\n{<br>\nclass=\"x\"<br>\n}</p>"),
        "<p><img src=\"/a.jpg\" alt=\"a\" class=\"x\"><br></p>"
    );
}

#[test]
fn test_block_with_unicode_whitespace() {
    assert_eq!(
        rebuild(
            r#"<p><img src="/a.jpg" alt="">&nbsp;{style="display:flex;&emsp;gap:1em"}</p>"#
        ),
        r#"<p><img src="/a.jpg" alt="" style="display:flex; gap:1em"></p>"#
    );
}

#[test]
fn test_block_in_following_paragraph() {
    assert_eq!(
        rebuild(r#"<img src="/a.jpg" alt=""><p>{class="x"}</p><p>after</p>"#),
        r#"<img src="/a.jpg" alt="" class="x"><p>after</p>"#
    );
    assert_eq!(
        rebuild("<img src=\"/a.jpg\" alt=\"\"><p>{class=\"x\"}\ncaption</p>"),
        "<img src=\"/a.jpg\" alt=\"\" class=\"x\"><p>\ncaption</p>"
    );
    assert_eq!(
        rebuild("<img src=\"/a.jpg\" alt=\"\"><p>{class=\"x\"}\n</p><p>after</p>"),
        "<img src=\"/a.jpg\" alt=\"\" class=\"x\"><p>after</p>"
    );
}

#[test]
fn test_block_in_sibling_paragraph() {
    assert_eq!(
        rebuild("<p><img src=\"/a.jpg\" alt=\"\"></p>\n<p>{class=\"x\"}</p>\n<p>after</p>"),
        "<p><img src=\"/a.jpg\" alt=\"\" class=\"x\"></p>\n<p>after</p>"
    );
    assert_eq!(
        rebuild("<p><img src=\"/a.jpg\" alt=\"\"></p>\n<p>{class=\"x\"}\n</p>"),
        "<p><img src=\"/a.jpg\" alt=\"\" class=\"x\"></p>"
    );
}

#[test]
fn test_sibling_paragraph_not_used_when_text_follows_image() {
    let html = "<p><img src=\"/a.jpg\" alt=\"\"> caption</p>\n<p>{class=\"x\"}</p>";
    assert_eq!(rebuild(html), html);
}

#[test]
fn test_text_not_starting_with_brace_is_not_a_block() {
    let html = r#"<p><img src="/a.jpg" alt="">caption {class="x"}</p>"#;
    assert_eq!(rebuild(html), html);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_invalid_alt_fragment_is_an_error() {
    let html = format!(
        "{HEAD}<p><img src=\"/a.jpg\" alt=\"image1{{class=&#x22;light-img&#x22;&gt;}}\"></p>"
    );
    match process_html(&html, &OptionsInput::default()) {
        Err(Error::InvalidAttrs { origin, fragment }) => {
            assert_eq!(origin, AttrOrigin::Alt);
            assert_eq!(fragment, "class=\"light-img\">");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_invalid_block_fragment_is_an_error() {
    // The block stops at <b>, so nothing is extracted.
    let result = process_html(
        r#"<p><img src="/a.jpg" alt="">{class="a"><b>}</b></p>"#,
        &OptionsInput::default(),
    );
    assert!(result.is_ok());

    let err = process_html(r#"<p><img src="/a.jpg" alt="">{class="a">}</p>"#, &OptionsInput::default())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidAttrs { origin: AttrOrigin::Block, .. }));
    assert!(err.to_string().contains("attribute block"));
}
