//! Application constants

/// Maximum upload size for video publish/update requests (200 MB)
pub const MAX_UPLOAD_SIZE: usize = 200 * 1024 * 1024;

/// Default page number for paginated list endpoints
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size for paginated list endpoints
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size for paginated list endpoints
pub const MAX_PAGE_SIZE: i64 = 100;

/// Header carrying the actor id resolved by the upstream auth gateway
pub const ACTOR_HEADER: &str = "x-user-id";

/// Prefix under which locally hosted media is served
pub const LOCAL_MEDIA_ROUTE: &str = "/media";
