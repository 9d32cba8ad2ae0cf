// Version information for the Fabstir adventure cache

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-continuation-cache-2025-11-02";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.0.0";

/// Build date
pub const BUILD_DATE: &str = "2025-11-02";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "continuation-cache",
    "idempotent-writes",
    "image-ingestion",
    "streamed-blobs",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir Adventure Cache {} ({})", VERSION_NUMBER, BUILD_DATE)
}
