// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Busline";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "busline";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".busline";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "busline.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "BUSLINE_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "BUSLINE_LOG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "BUSLINE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "BUSLINE_PORT";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

/// Default request body limit (filter selections are small)
pub const DEFAULT_BODY_LIMIT: usize = 256 * 1024;

// =============================================================================
// Environment Variables - Route Store
// =============================================================================

/// Environment variable for the SQLite database file
pub const ENV_DATABASE: &str = "BUSLINE_DATABASE";

/// Environment variable for the route table name
pub const ENV_TABLE: &str = "BUSLINE_TABLE";

// =============================================================================
// Route Store Defaults
// =============================================================================

/// Default SQLite database file (relative to the working directory)
pub const DEFAULT_DATABASE_PATH: &str = "redbus.db";

/// Default route table name
pub const DEFAULT_TABLE: &str = "bus_routes";

/// SQLite busy timeout for read connections
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// Environment Variables - Cache
// =============================================================================

/// Environment variable for catalog time-to-live in seconds (0 = never expire)
pub const ENV_CATALOG_TTL_SECS: &str = "BUSLINE_CATALOG_TTL";

/// Environment variable for query result time-to-live in seconds
pub const ENV_QUERY_CACHE_TTL_SECS: &str = "BUSLINE_QUERY_CACHE_TTL";

/// Environment variable for the query result cache capacity
pub const ENV_QUERY_CACHE_MAX_ENTRIES: &str = "BUSLINE_QUERY_CACHE_MAX_ENTRIES";

// =============================================================================
// Cache Defaults
// =============================================================================

/// Cache key version prefix (bump to invalidate all cached entries)
pub const CACHE_KEY_VERSION: &str = "v1";

/// Default catalog time-to-live (1 hour)
pub const DEFAULT_CATALOG_TTL_SECS: u64 = 3600;

/// Default query result time-to-live (5 minutes)
pub const DEFAULT_QUERY_CACHE_TTL_SECS: u64 = 300;

/// Default query result cache capacity
pub const DEFAULT_QUERY_CACHE_MAX_ENTRIES: u64 = 1_000;

/// The catalog cache only ever holds the snapshot for one query text
pub const CATALOG_CACHE_MAX_ENTRIES: u64 = 4;

// =============================================================================
// Filtering
// =============================================================================

/// Sentinel label that disables a filter
pub const ANYTHING: &str = "Anything";

/// Notice shown when a selection matches no rows
pub const NO_RESULTS_NOTICE: &str = "No data available with the selected filters.";

/// Lowest selectable star rating
pub const STAR_RATING_MIN: f64 = 0.0;

/// Highest selectable star rating
pub const STAR_RATING_MAX: f64 = 5.0;

// =============================================================================
// Export
// =============================================================================

/// File name offered for CSV downloads
pub const EXPORT_FILE_NAME: &str = "filtered_data.csv";

/// MIME type of CSV downloads
pub const EXPORT_CONTENT_TYPE: &str = "text/csv";
