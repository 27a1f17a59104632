//! Markup handed to browsers around the widget.

use crate::config::URL_BASE;

use super::catalog::caption;

/// Host document the widget loads into its iframe (`ity_ef_rule=raw`).
///
/// Served byte-for-byte; the widget locates its chrome by the ids and classes
/// in here.
pub const RAW_HOST_PAGE: &str = include_str!("../../assets/raw_host.html");

/// Script URL that bootstraps the widget for one exercise.
pub fn embed_script_url(name: &str) -> String {
    format!("{}/khan-exercises/embed.js?static:{}", URL_BASE, name)
}

/// Snippet placed into a lesson page: a caption plus the bootstrap script,
/// which replaces itself with the exercise iframe.
pub fn render_embed_tag(name: &str) -> String {
    format!(
        "<div style='width: 450px;'>\n  Khan Academy Exercise: {}\n  <script src=\"{}\" type=\"text/javascript\"></script>\n</div>",
        html_escape::encode_text(&caption(name)),
        html_escape::encode_double_quoted_attribute(&embed_script_url(name)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_page_hides_widget_chrome() {
        assert!(RAW_HOST_PAGE.starts_with("<!DOCTYPE html>"));
        assert!(RAW_HOST_PAGE.contains("div.exercises-header"));
        assert!(RAW_HOST_PAGE.contains("div#extras"));
        assert!(RAW_HOST_PAGE.contains("article.exercises-content"));
        assert!(RAW_HOST_PAGE.contains("div#workarea"));
    }

    #[test]
    fn test_script_url_contract() {
        assert_eq!(
            embed_script_url("adding_fractions"),
            "/extensions/tags/khanex/resources/khan-exercises/embed.js?static:adding_fractions"
        );
    }

    #[test]
    fn test_embed_tag() {
        let tag = render_embed_tag("long_division");
        assert!(tag.contains("Khan Academy Exercise: long division"));
        assert!(tag.contains(
            "src=\"/extensions/tags/khanex/resources/khan-exercises/embed.js?static:long_division\""
        ));
    }

    #[test]
    fn test_embed_tag_escapes_caption() {
        let tag = render_embed_tag("a<b>");
        assert!(tag.contains("a&lt;b&gt;"));
        assert!(!tag.contains("<b>"));
    }
}
