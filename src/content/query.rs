//! Lenient query-string parsing.
//!
//! Mirrors what the widget runtime and the host pages produce: pairs are
//! separated by `&` or `;`, `+` means space, names and values are
//! percent-decoded. Pairs without `=` and pairs with an empty value are
//! dropped. Repeated names keep every value in order; callers usually want
//! [`QueryParams::first`].

/// Decoded query parameters in their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse a query string (without the leading `?`).
    pub fn parse(query: &str) -> Self {
        let pairs = query
            .split(['&', ';'])
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                if value.is_empty() {
                    return None;
                }
                Some((decode_component(name), decode_component(value)))
            })
            .collect();

        Self { pairs }
    }

    /// First value for `name`, if any.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values for `name`, in order.
    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Percent-decode a string, replacing invalid UTF-8 instead of failing.
pub fn percent_decode(raw: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned()
}

fn decode_component(raw: &str) -> String {
    percent_decode(&raw.replace('+', " "))
}

/// Query component of a URL: text after the first `?`, with any fragment removed.
///
/// Works for absolute and relative URLs alike. Returns `None` when there is no
/// query or it is empty.
pub fn url_query(url: &str) -> Option<&str> {
    let without_fragment = url.split_once('#').map_or(url, |(head, _)| head);
    let (_, query) = without_fragment.split_once('?')?;
    if query.is_empty() { None } else { Some(query) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_pairs() {
        let params = QueryParams::parse("unit=5&lesson=12");
        assert_eq!(params.first("unit"), Some("5"));
        assert_eq!(params.first("lesson"), Some("12"));
        assert_eq!(params.first("missing"), None);
    }

    #[test]
    fn test_parse_semicolon_separator() {
        let params = QueryParams::parse("a=1;b=2");
        assert_eq!(params.first("a"), Some("1"));
        assert_eq!(params.first("b"), Some("2"));
    }

    #[test]
    fn test_first_value_wins() {
        let params = QueryParams::parse("a=1&a=2");
        assert_eq!(params.first("a"), Some("1"));
        assert_eq!(params.all("a").collect::<Vec<_>>(), vec!["1", "2"]);
    }

    #[test]
    fn test_blank_and_bare_pairs_dropped() {
        let params = QueryParams::parse("a=&b&c=3&&");
        assert_eq!(params.first("a"), None);
        assert_eq!(params.first("b"), None);
        assert_eq!(params.first("c"), Some("3"));
    }

    #[test]
    fn test_values_are_decoded() {
        let params = QueryParams::parse("o=http%3A%2F%2Fx%2Funit%3Funit%3D5&s=a+b");
        assert_eq!(params.first("o"), Some("http://x/unit?unit=5"));
        assert_eq!(params.first("s"), Some("a b"));
    }

    #[test]
    fn test_value_keeps_inner_equals() {
        let params = QueryParams::parse("k=a=b");
        assert_eq!(params.first("k"), Some("a=b"));
    }

    #[test]
    fn test_percent_decode_invalid_utf8_is_lossy() {
        let decoded = percent_decode("ok%FF");
        assert!(decoded.starts_with("ok"));
    }

    #[test]
    fn test_url_query() {
        assert_eq!(url_query("http://x/unit?unit=5&lesson=1"), Some("unit=5&lesson=1"));
        assert_eq!(url_query("/unit?unit=5#top"), Some("unit=5"));
        assert_eq!(url_query("http://x/unit"), None);
        assert_eq!(url_query("http://x/unit?"), None);
        assert_eq!(url_query("http://x/unit#a?b=1"), None);
    }
}
