//! Orphaned uninstall entries in the per-user configuration store.
//!
//! The store is reached through the small [`ConfigStore`] capability so the
//! scan and prune logic runs the same against the Windows registry and the
//! in-memory double used by the tests. Children are addressed by position,
//! which is how the registry enumerates subkeys.

#[cfg(test)]
pub(crate) mod memory;
#[cfg(windows)]
pub mod windows;

use crate::constants::{
    FIELD_DISPLAY_NAME, FIELD_INSTALL_LOCATION, REGISTRY_ENTRY_ESTIMATE, UNINSTALL_NAMESPACE,
};
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    ReadWrite,
}

pub trait ConfigStore: Send + Sync {
    fn open(&self, namespace: &str, access: Access) -> io::Result<Box<dyn Namespace + '_>>;
}

/// An opened namespace whose direct children can be enumerated by position.
pub trait Namespace {
    fn child_count(&self) -> io::Result<usize>;
    /// Name of the child at `index`, or `None` past the last child.
    fn child_at(&self, index: usize) -> io::Result<Option<String>>;
    /// Reads a string field of a child; `None` if the field is absent.
    fn read_field(&self, child: &str, field: &str) -> io::Result<Option<String>>;
    fn delete_child(&self, child: &str) -> io::Result<()>;
}

/// Stand-in used where no configuration store exists; every open fails, which
/// the scanner and pruner treat as "nothing found".
#[derive(Debug, Default)]
pub struct UnsupportedStore;

impl ConfigStore for UnsupportedStore {
    fn open(&self, namespace: &str, _access: Access) -> io::Result<Box<dyn Namespace + '_>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("no configuration store for {namespace} on this platform"),
        ))
    }
}

/// The store for the current platform.
pub fn platform_store() -> Box<dyn ConfigStore> {
    #[cfg(windows)]
    {
        Box::new(windows::WindowsRegistry)
    }
    #[cfg(not(windows))]
    {
        Box::new(UnsupportedStore)
    }
}

/// Junk found by [`scan_for_junk`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryScan {
    /// One `"<name> → Missing path: <location>"` line per orphaned entry.
    pub entries: Vec<String>,
    /// `entries.len() * REGISTRY_ENTRY_ESTIMATE`; not measured disk usage.
    pub estimated_bytes: u64,
}

impl RegistryScan {
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

/// Flags uninstall entries whose `InstallLocation` no longer exists.
///
/// Entries without an install location are never junk. An entry that cannot
/// be read is skipped; a namespace that cannot be opened yields an empty scan.
pub fn scan_for_junk(store: &dyn ConfigStore) -> RegistryScan {
    let mut scan = RegistryScan::default();

    let namespace = match store.open(UNINSTALL_NAMESPACE, Access::Read) {
        Ok(namespace) => namespace,
        Err(err) => {
            tracing::warn!("Registry scan skipped, cannot open {UNINSTALL_NAMESPACE}: {err}");
            return scan;
        }
    };

    let count = match namespace.child_count() {
        Ok(count) => count,
        Err(err) => {
            tracing::warn!("Registry scan skipped, cannot count entries: {err}");
            return scan;
        }
    };

    for index in 0..count {
        match inspect_child(namespace.as_ref(), index) {
            Ok(Some(description)) => {
                tracing::debug!("Orphaned uninstall entry: {description}");
                scan.entries.push(description);
                scan.estimated_bytes += REGISTRY_ENTRY_ESTIMATE;
            }
            Ok(None) => {}
            Err(err) => tracing::debug!("Skipping uninstall entry #{index}: {err}"),
        }
    }

    tracing::info!("Registry scan found {} orphaned entries", scan.count());
    scan
}

fn inspect_child(namespace: &dyn Namespace, index: usize) -> io::Result<Option<String>> {
    let Some(child) = namespace.child_at(index)? else {
        return Ok(None);
    };
    let name = display_name(namespace, &child)?;

    let Some(location) = namespace.read_field(&child, FIELD_INSTALL_LOCATION)? else {
        return Ok(None);
    };
    if location.is_empty() || Path::new(&location).exists() {
        return Ok(None);
    }

    Ok(Some(format!("{name} → Missing path: {location}")))
}

/// `DisplayName`, or a name synthesized from the child identifier when absent.
fn display_name(namespace: &dyn Namespace, child: &str) -> io::Result<String> {
    Ok(namespace
        .read_field(child, FIELD_DISPLAY_NAME)?
        .unwrap_or_else(|| format!("Unnamed Key {child}")))
}

/// Deletes every uninstall entry whose display name occurs in one of the
/// descriptions captured by an earlier [`scan_for_junk`].
///
/// Matching is by substring, so an entry whose name is a fragment of a
/// captured description is removed too. Returns how many entries were deleted.
pub fn prune(store: &dyn ConfigStore, descriptions: &[String]) -> usize {
    if descriptions.is_empty() {
        return 0;
    }

    let namespace = match store.open(UNINSTALL_NAMESPACE, Access::ReadWrite) {
        Ok(namespace) => namespace,
        Err(err) => {
            tracing::warn!("Registry cleanup skipped, cannot open {UNINSTALL_NAMESPACE}: {err}");
            return 0;
        }
    };

    let mut removed = 0;
    let mut index = 0;
    loop {
        let child = match namespace.child_at(index) {
            Ok(Some(child)) => child,
            Ok(None) => break,
            Err(err) => {
                tracing::debug!("Stopping registry cleanup at entry #{index}: {err}");
                break;
            }
        };

        match display_name(namespace.as_ref(), &child) {
            Ok(name) if descriptions.iter().any(|d| d.contains(name.as_str())) => {
                match namespace.delete_child(&child) {
                    // The next entry has shifted into `index`.
                    Ok(()) => {
                        tracing::info!("Removed uninstall entry {child} ({name})");
                        removed += 1;
                        continue;
                    }
                    Err(err) => tracing::warn!("Failed to remove uninstall entry {child}: {err}"),
                }
            }
            Ok(_) => {}
            Err(err) => tracing::debug!("Skipping uninstall entry {child}: {err}"),
        }
        index += 1;
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    const GONE: &str = "/winsweep/definitely/missing/install/dir";

    #[test]
    fn existing_location_is_not_junk() -> Result<()> {
        let dir = tempdir()?;
        let location = dir.path().to_string_lossy().into_owned();
        let store = MemoryStore::default()
            .with_child("{a}", &[("DisplayName", "Alive"), ("InstallLocation", &location)]);

        assert_eq!(scan_for_junk(&store), RegistryScan::default());
        Ok(())
    }

    #[test]
    fn missing_location_is_junk() {
        let store = MemoryStore::default()
            .with_child("{foo}", &[("DisplayName", "Foo"), ("InstallLocation", GONE)]);

        let scan = scan_for_junk(&store);
        assert_eq!(scan.count(), 1);
        assert_eq!(scan.estimated_bytes, REGISTRY_ENTRY_ESTIMATE);
        assert_eq!(scan.entries[0], format!("Foo → Missing path: {GONE}"));
    }

    #[test]
    fn absent_or_empty_location_is_not_junk() {
        let store = MemoryStore::default()
            .with_child("{a}", &[("DisplayName", "No Location")])
            .with_child("{b}", &[("DisplayName", "Empty"), ("InstallLocation", "")]);

        assert_eq!(scan_for_junk(&store).count(), 0);
    }

    #[test]
    fn missing_display_name_is_synthesized() {
        let store = MemoryStore::default().with_child("{nameless}", &[("InstallLocation", GONE)]);

        let scan = scan_for_junk(&store);
        assert_eq!(scan.count(), 1);
        assert!(scan.entries[0].starts_with("Unnamed Key {nameless} → "));
    }

    #[test]
    fn unreadable_entry_is_skipped() {
        let store = MemoryStore::default()
            .with_child("{locked}", &[("DisplayName", "Locked"), ("InstallLocation", GONE)])
            .with_child("{foo}", &[("DisplayName", "Foo"), ("InstallLocation", GONE)])
            .deny("{locked}");

        let scan = scan_for_junk(&store);
        assert_eq!(scan.count(), 1);
        assert!(scan.entries[0].contains("Foo"));
    }

    #[test]
    fn unopenable_namespace_finds_nothing() {
        assert_eq!(scan_for_junk(&UnsupportedStore), RegistryScan::default());
        assert_eq!(prune(&UnsupportedStore, &["Foo → x".to_string()]), 0);
    }

    #[test]
    fn prune_removes_only_the_matching_entry() {
        let store = MemoryStore::default()
            .with_child("{keep}", &[("DisplayName", "Bar"), ("InstallLocation", "/")])
            .with_child("{foo}", &[("DisplayName", "Foo"), ("InstallLocation", GONE)])
            .with_child("{other}", &[("DisplayName", "Baz")]);

        let scan = scan_for_junk(&store);
        assert_eq!(scan.count(), 1);
        assert!(scan.entries[0].contains("Foo"));

        assert_eq!(prune(&store, &scan.entries), 1);
        assert_eq!(store.child_names(), vec!["{keep}", "{other}"]);
        assert_eq!(scan_for_junk(&store).count(), 0);
    }

    #[test]
    fn prune_does_not_skip_entries_after_a_removal() {
        // Adjacent matches: each deletion shifts the next entry into the same index.
        let store = MemoryStore::default()
            .with_child("{1}", &[("DisplayName", "One"), ("InstallLocation", GONE)])
            .with_child("{2}", &[("DisplayName", "Two"), ("InstallLocation", GONE)])
            .with_child("{3}", &[("DisplayName", "Three"), ("InstallLocation", GONE)])
            .with_child("{4}", &[("DisplayName", "Keeper"), ("InstallLocation", "/")]);

        let scan = scan_for_junk(&store);
        assert_eq!(scan.count(), 3);
        assert_eq!(prune(&store, &scan.entries), 3);
        assert_eq!(store.child_names(), vec!["{4}"]);
    }

    #[test]
    fn prune_matches_by_name_fragment() {
        // A name contained in a captured description is removed even if its own
        // location still exists.
        let store = MemoryStore::default()
            .with_child("{a}", &[("DisplayName", "Foo Pro"), ("InstallLocation", GONE)])
            .with_child("{b}", &[("DisplayName", "Foo"), ("InstallLocation", "/")]);

        let scan = scan_for_junk(&store);
        assert_eq!(scan.count(), 1);
        assert_eq!(prune(&store, &scan.entries), 2);
        assert!(store.child_names().is_empty());
    }

    #[test]
    fn prune_with_no_descriptions_is_a_no_op() {
        let store = MemoryStore::default().with_child("{a}", &[("DisplayName", "A")]);
        assert_eq!(prune(&store, &[]), 0);
        assert_eq!(store.child_names(), vec!["{a}"]);
    }
}
