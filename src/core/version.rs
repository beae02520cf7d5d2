//! Build metadata generated by the build script.

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Component API version as a number (`YYYYMMDD`).
/// Falls back to the last known release when the metadata is missing.
pub fn component_api_version() -> u32 {
    COMPONENT_API_VERSION.parse().unwrap_or(20261016)
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// One-line description used by `--version` and the startup banner
pub fn long_version() -> String {
    format!(
        "{} (component api {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        component_api_version(),
        build_time(),
        git_hash()
    )
}
