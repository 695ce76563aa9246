use crate::constants::{
    CHROME_CACHE, CRASH_DUMPS, EDGE_CACHE, ENV_LOCAL_APP_DATA, ENV_TEMP, ENV_USER_PROFILE,
    LABEL_CHROME_CACHE, LABEL_CRASH_DUMPS, LABEL_EDGE_CACHE, LABEL_LOCAL_APP_DATA_TEMP,
    LABEL_PREFETCH, LABEL_RECYCLE_BIN, LABEL_THUMBNAIL_CACHE, LABEL_UPDATE_CACHE,
    LABEL_USER_TEMP, LABEL_WINDOWS_TEMP, LOCAL_TEMP, RECYCLE_BIN, THUMBNAIL_CACHE,
    WINDOWS_PREFETCH, WINDOWS_TEMP, WINDOWS_UPDATE_CACHE,
};
use crate::model::Target;
use std::ffi::OsString;
use std::path::PathBuf;

/// Resolves the catalog against the current process environment.
///
/// Called fresh on every scan so environment changes between scans are seen.
pub fn resolve() -> Vec<Target> {
    resolve_with(|key| std::env::var_os(key))
}

/// Resolves the catalog with an arbitrary variable lookup. Performs no I/O.
pub fn resolve_with<F>(lookup: F) -> Vec<Target>
where
    F: Fn(&str) -> Option<OsString>,
{
    let base = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);
    let under = |key: &str, parts: &[&str]| {
        base(key).map_or_else(PathBuf::new, |root| {
            parts.iter().fold(root, |path, part| path.join(part))
        })
    };

    vec![
        Target::new(LABEL_WINDOWS_TEMP, WINDOWS_TEMP),
        Target::new(LABEL_USER_TEMP, base(ENV_TEMP).unwrap_or_default()),
        Target::new(
            LABEL_LOCAL_APP_DATA_TEMP,
            under(ENV_LOCAL_APP_DATA, LOCAL_TEMP),
        ),
        Target::new(LABEL_RECYCLE_BIN, RECYCLE_BIN),
        Target::new(LABEL_CHROME_CACHE, under(ENV_LOCAL_APP_DATA, CHROME_CACHE)),
        Target::new(LABEL_EDGE_CACHE, under(ENV_LOCAL_APP_DATA, EDGE_CACHE)),
        Target::new(LABEL_PREFETCH, WINDOWS_PREFETCH),
        Target::new(
            LABEL_THUMBNAIL_CACHE,
            under(ENV_USER_PROFILE, THUMBNAIL_CACHE),
        ),
        Target::new(LABEL_CRASH_DUMPS, under(ENV_LOCAL_APP_DATA, CRASH_DUMPS)),
        Target::new(LABEL_UPDATE_CACHE, WINDOWS_UPDATE_CACHE),
    ]
}
