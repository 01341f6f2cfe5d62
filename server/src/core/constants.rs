// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "WEIMS";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "weims";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".weims";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "weims.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "WEIMS_CONFIG";

// =============================================================================
// Environment Variables - Debug
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "WEIMS_DEBUG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "WEIMS_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "WEIMS_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "WEIMS_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "WEIMS_DATA_DIR";

// =============================================================================
// Authentication
// =============================================================================

/// Environment variable to disable proxy authentication
pub const ENV_NO_AUTH: &str = "WEIMS_NO_AUTH";

/// Header carrying the authenticated username, set by the front proxy
pub const HEADER_REMOTE_USER: &str = "x-remote-user";

/// Header carrying the comma-separated group list, set by the front proxy
pub const HEADER_REMOTE_GROUPS: &str = "x-remote-groups";

/// Principal injected when authentication is disabled
pub const LOCAL_USERNAME: &str = "local";

// =============================================================================
// Reports
// =============================================================================

/// Environment variable for the Word template path
pub const ENV_TEMPLATE_PATH: &str = "WEIMS_TEMPLATE_PATH";

/// Environment variable for the organization shown on exports
pub const ENV_ORGANIZATION: &str = "WEIMS_ORGANIZATION";

/// Word template filename inside the templates directory
pub const TEMPLATE_FILENAME: &str = "report_template.docx";

/// Organization used in export branding and filenames
pub const DEFAULT_ORGANIZATION: &str = "WESMAARRDEC";

/// Page size for the on-screen table
pub const DEFAULT_PER_PAGE: u32 = 25;

/// Accepted `per_page` values
pub const PER_PAGE_CHOICES: [u32; 4] = [10, 25, 50, 100];

/// Response header carrying the export fallback warning
pub const HEADER_EXPORT_WARNING: &str = "x-export-warning";

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "weims.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// SQLite WAL auto-checkpoint threshold (pages, ~4MB at 1000)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// WAL checkpoint interval in seconds (5 minutes)
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Request Body Limits
// =============================================================================

/// Default body limit for API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// Shutdown
// =============================================================================

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;
