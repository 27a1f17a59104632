//! Exercise content: the packaged archive and everything derived from it.
//!
//! - **Archive**: the zip file with the widget runtime and exercise pages
//! - **Catalog**: exercise names found in the archive
//! - **Whitelist**: operator allow-list over those names
//! - **Slug**: `static:<name>` identifiers resolved to exercise pages
//! - **Context**: unit/lesson recovered from submission payload URLs
//! - **Outline**: course units and lessons loaded from TOML
//!
//! # Request Flow
//!
//! 1. A lesson page embeds the widget script for `static:<name>`
//! 2. The widget asks the render endpoint for the slug (whitelist + archive)
//! 3. On "Check Answer" the widget posts its audit payload
//! 4. The payload's `location` is decoded back into a unit/lesson

pub mod archive;
pub mod catalog;
pub mod context;
pub mod embed;
pub mod outline;
pub mod query;
pub mod slug;
pub mod whitelist;

pub use archive::{ArchiveError, ArchiveSource, ArchiveVersion};
pub use catalog::{list_exercise_names, CatalogCache, ExerciseCatalog, SelectionItem};
pub use context::{recover_context, LessonDirectory, LessonRef, RecoveredContext};
pub use embed::{render_embed_tag, RAW_HOST_PAGE};
pub use outline::{CourseOutline, OutlineError};
pub use query::QueryParams;
pub use slug::{resolve, EmbedSlug, ResolveError, SlugError};
pub use whitelist::{is_allowed, SettingsWhitelist, Whitelist, WhitelistSource};
