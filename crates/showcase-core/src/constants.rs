//! Fixed values that other tooling depends on: storage layout, derivative
//! widths and the cache key namespace.

/// Root prefix of every stored media blob.
pub const MEDIA_ROOT: &str = "media";

/// Responsive widths generated for every stored image, ascending.
pub const DERIVATIVE_WIDTHS: [u32; 3] = [768, 1280, 1920];

/// Suffix of the frame extracted from uploaded video files.
pub const VIDEO_THUMBNAIL_SUFFIX: &str = "_thumb.jpg";

pub const CACHE_KEY_HOME: &str = "home:v1";
pub const CACHE_KEY_DIVISIONS_INDEX: &str = "divisions:index";
pub const CACHE_KEY_DIVISION_PREFIX: &str = "division:";
pub const CACHE_KEY_MILESTONES: &str = "milestones:all";
pub const CACHE_KEY_SETTINGS: &str = "settings:all";
pub const CACHE_KEY_VISI_MISI: &str = "visi-misi:v1";
pub const CACHE_KEY_SITEMAP: &str = "sitemap:xml";

/// Public path segment under which division pages live.
pub const DIVISION_PAGE_PREFIX: &str = "/line-of-business";
