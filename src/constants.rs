//! Fixed catalog data: labels, path fragments and tuning values.

pub const WINDOWS_TEMP: &str = r"C:\Windows\Temp";
pub const RECYCLE_BIN: &str = r"C:\$Recycle.Bin";
pub const WINDOWS_PREFETCH: &str = r"C:\Windows\Prefetch";
pub const WINDOWS_UPDATE_CACHE: &str = r"C:\Windows\SoftwareDistribution\Download";

pub const ENV_TEMP: &str = "TEMP";
pub const ENV_LOCAL_APP_DATA: &str = "LOCALAPPDATA";
pub const ENV_USER_PROFILE: &str = "USERPROFILE";

pub const LABEL_WINDOWS_TEMP: &str = "Windows Temp Folder";
pub const LABEL_USER_TEMP: &str = "User Temp Folder";
pub const LABEL_LOCAL_APP_DATA_TEMP: &str = "LocalAppData Temp";
pub const LABEL_RECYCLE_BIN: &str = "Recycle Bin";
pub const LABEL_CHROME_CACHE: &str = "Google Chrome Cache";
pub const LABEL_EDGE_CACHE: &str = "Microsoft Edge Cache";
pub const LABEL_PREFETCH: &str = "Windows Prefetch";
pub const LABEL_THUMBNAIL_CACHE: &str = "Thumbnail Cache";
pub const LABEL_CRASH_DUMPS: &str = "Error Reporting Dumps";
pub const LABEL_UPDATE_CACHE: &str = "Windows Update Cache";

// Sub-paths are stored as components so they join correctly on any host.
pub const LOCAL_TEMP: &[&str] = &["Temp"];
pub const CHROME_CACHE: &[&str] = &["Google", "Chrome", "User Data", "Default", "Cache"];
pub const EDGE_CACHE: &[&str] = &["Microsoft", "Edge", "User Data", "Default", "Cache"];
pub const THUMBNAIL_CACHE: &[&str] = &["AppData", "Local", "Microsoft", "Windows", "Explorer"];
pub const CRASH_DUMPS: &[&str] = &["CrashDumps"];

/// Pseudo-target label for orphaned uninstall entries.
pub const REGISTRY_LABEL: &str = "Registry Junk";
/// Namespace below `HKEY_CURRENT_USER` that lists per-user installed applications.
pub const UNINSTALL_NAMESPACE: &str = r"Software\Microsoft\Windows\CurrentVersion\Uninstall";
pub const UNINSTALL_DISPLAY_PATH: &str =
    r"HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\Uninstall";

pub const FIELD_DISPLAY_NAME: &str = "DisplayName";
pub const FIELD_INSTALL_LOCATION: &str = "InstallLocation";

/// Estimated bytes reclaimed per orphaned uninstall entry. Not a measurement.
pub const REGISTRY_ENTRY_ESTIMATE: u64 = 2048;

pub const DEFAULT_SCAN_WORKERS: usize = 6;

pub const PROBE_FILE_NAME: &str = "winsweep_permission_probe.tmp";

pub const APP_DIR: &str = "winsweep";
pub const ALLOWLIST_FILE: &str = "allowlist.txt";
pub const LOG_FILE: &str = "winsweep.log";
