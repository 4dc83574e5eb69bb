/// Prefix of the authenticated admin API.
pub const ADMIN_PREFIX: &str = "/api/admin";

/// Prefix of the public, cached site API.
pub const SITE_PREFIX: &str = "/api/site";

/// Header carrying the authenticated admin user, set by the upstream auth layer.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Headroom over the largest accepted file for multipart framing and text fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
