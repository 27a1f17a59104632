//! Embed slug parsing and resolution.
//!
//! The widget requests exercises as `protocol:identifier`. Only the `static`
//! protocol exists: the identifier names an exercise page in the archive.
//!
//! A whitelisted-out identifier and a missing one must look the same to the
//! client. Both become a bare 404; only the logs tell them apart.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::archive::{ArchiveError, ArchiveSource};
use super::whitelist::WhitelistSource;
use crate::config::EXERCISE_BASE;

/// The single supported slug protocol.
pub const STATIC_PROTOCOL: &str = "static";

/// Malformed slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// Not exactly one `:` separator
    Format(String),
    /// Protocol other than `static`
    Protocol(String),
}

impl std::fmt::Display for SlugError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlugError::Format(slug) => write!(
                f,
                "Expected 'ity_ef_slug' in a form of 'protocol:identifier', got '{}'",
                slug
            ),
            SlugError::Protocol(protocol) => write!(f, "Bad protocol: '{}'", protocol),
        }
    }
}

impl std::error::Error for SlugError {}

/// A parsed `static:<identifier>` slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSlug {
    identifier: String,
}

impl EmbedSlug {
    pub fn parse(slug: &str) -> Result<Self, SlugError> {
        let parts: Vec<&str> = slug.split(':').collect();
        let [protocol, identifier] = parts.as_slice() else {
            return Err(SlugError::Format(slug.to_string()));
        };

        if *protocol != STATIC_PROTOCOL {
            return Err(SlugError::Protocol(protocol.to_string()));
        }

        Ok(Self {
            identifier: identifier.to_string(),
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Archive path of the exercise page.
    pub fn archive_path(&self) -> String {
        format!("{}{}.html", EXERCISE_BASE, self.identifier)
    }
}

/// Why a slug could not be served.
#[derive(Debug)]
pub enum ResolveError {
    Slug(SlugError),
    /// Identifier not admitted by the whitelist
    Denied(String),
    /// No such page in the archive
    NotFound(String),
    Archive(ArchiveError),
    /// Whitelist could not be read
    Whitelist(rusqlite::Error),
}

impl ResolveError {
    /// Denied and not-found share one outcome at the HTTP boundary.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::Denied(_) | ResolveError::NotFound(_))
    }
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::Slug(e) => write!(f, "{}", e),
            ResolveError::Denied(name) => write!(f, "Exercise '{}' is not whitelisted", name),
            ResolveError::NotFound(name) => write!(f, "Exercise '{}' not found", name),
            ResolveError::Archive(e) => write!(f, "{}", e),
            ResolveError::Whitelist(e) => write!(f, "Failed to read exercise whitelist: {}", e),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<SlugError> for ResolveError {
    fn from(e: SlugError) -> Self {
        ResolveError::Slug(e)
    }
}

impl From<ArchiveError> for ResolveError {
    fn from(e: ArchiveError) -> Self {
        ResolveError::Archive(e)
    }
}

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        match self {
            ResolveError::Slug(e) => {
                tracing::debug!("Rejected slug: {}", e);
                (StatusCode::BAD_REQUEST, e.to_string()).into_response()
            }
            e @ (ResolveError::Denied(_) | ResolveError::NotFound(_)) => {
                tracing::info!("Exercise unavailable: {}", e);
                StatusCode::NOT_FOUND.into_response()
            }
            e @ (ResolveError::Archive(_) | ResolveError::Whitelist(_)) => {
                tracing::error!("{}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Resolve a slug to the bytes of its exercise page.
///
/// The whitelist is consulted before the archive is opened.
pub fn resolve<W: WhitelistSource + ?Sized>(
    slug: &str,
    archive: &ArchiveSource,
    whitelist: &W,
) -> Result<Vec<u8>, ResolveError> {
    let slug = EmbedSlug::parse(slug)?;

    let allowed = whitelist
        .allows(slug.identifier())
        .map_err(ResolveError::Whitelist)?;
    if !allowed {
        return Err(ResolveError::Denied(slug.identifier().to_string()));
    }

    archive
        .read_entry(&slug.archive_path())?
        .ok_or_else(|| ResolveError::NotFound(slug.identifier().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{exercise_path, write_archive};
    use tempfile::TempDir;

    fn sample_archive(temp: &TempDir) -> ArchiveSource {
        write_archive(
            temp.path(),
            &[
                (EXERCISE_BASE, ""),
                (&exercise_path("foo"), "<p>foo</p>"),
                (&exercise_path("bar"), "<p>bar</p>"),
            ],
        )
    }

    #[test]
    fn test_parse_static_slug() {
        let slug = EmbedSlug::parse("static:adding_fractions").unwrap();
        assert_eq!(slug.identifier(), "adding_fractions");
        assert_eq!(
            slug.archive_path(),
            "khan-exercises/khan-exercises/exercises/adding_fractions.html"
        );
    }

    #[test]
    fn test_parse_wrong_part_count() {
        assert!(matches!(EmbedSlug::parse("bad"), Err(SlugError::Format(_))));
        assert!(matches!(EmbedSlug::parse("static:a:b"), Err(SlugError::Format(_))));
        assert!(matches!(EmbedSlug::parse(""), Err(SlugError::Format(_))));
    }

    #[test]
    fn test_parse_unknown_protocol() {
        assert_eq!(
            EmbedSlug::parse("ftp:foo"),
            Err(SlugError::Protocol("ftp".to_string()))
        );
        assert!(matches!(EmbedSlug::parse("STATIC:foo"), Err(SlugError::Protocol(_))));
    }

    #[test]
    fn test_resolve_existing_allowed() {
        let temp = TempDir::new().unwrap();
        let archive = sample_archive(&temp);

        let bytes = resolve("static:foo", &archive, "").unwrap();
        assert_eq!(bytes, b"<p>foo</p>");

        let bytes = resolve("static:foo", &archive, "foo\nbaz").unwrap();
        assert_eq!(bytes, b"<p>foo</p>");
    }

    #[test]
    fn test_resolve_failures() {
        let temp = TempDir::new().unwrap();
        let archive = sample_archive(&temp);

        assert!(matches!(resolve("bad", &archive, ""), Err(ResolveError::Slug(_))));
        assert!(matches!(resolve("ftp:foo", &archive, ""), Err(ResolveError::Slug(_))));
        assert!(matches!(
            resolve("static:notfound", &archive, ""),
            Err(ResolveError::NotFound(_))
        ));
        assert!(matches!(
            resolve("static:bar", &archive, "foo"),
            Err(ResolveError::Denied(_))
        ));
    }

    #[test]
    fn test_denied_checked_before_archive() {
        let temp = TempDir::new().unwrap();
        let archive = ArchiveSource::new(temp.path().join("missing.zip"));

        // a broken archive is not even opened for a denied identifier
        let err = resolve("static:bar", &archive, "foo").unwrap_err();
        assert!(matches!(err, ResolveError::Denied(_)));
    }

    #[test]
    fn test_denied_and_missing_share_response() {
        let temp = TempDir::new().unwrap();
        let archive = sample_archive(&temp);

        let denied = resolve("static:bar", &archive, "foo").unwrap_err();
        let missing = resolve("static:zzz", &archive, "foo\nzzz").unwrap_err();
        assert!(denied.is_not_found());
        assert!(missing.is_not_found());

        let denied = denied.into_response();
        let missing = missing.into_response();
        assert_eq!(denied.status(), StatusCode::NOT_FOUND);
        assert_eq!(denied.status(), missing.status());
        assert_eq!(denied.headers(), missing.headers());
    }

    #[test]
    fn test_unreadable_whitelist_is_server_error() {
        let temp = TempDir::new().unwrap();
        let archive = sample_archive(&temp);
        let env = crate::testing::TestEnv::new().unwrap();
        env.conn.execute("DROP TABLE app_settings", []).unwrap();

        let whitelist = crate::content::SettingsWhitelist::new(&env.conn);
        let err = resolve("static:foo", &archive, &whitelist).unwrap_err();
        assert!(matches!(err, ResolveError::Whitelist(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_format_error_is_bad_request() {
        let response = ResolveError::Slug(SlugError::Format("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
