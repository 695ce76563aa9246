//! `HKEY_CURRENT_USER`-backed configuration store.

use super::{Access, ConfigStore, Namespace};
use std::io;
use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, KEY_ALL_ACCESS, KEY_READ};

#[derive(Debug, Default)]
pub struct WindowsRegistry;

impl ConfigStore for WindowsRegistry {
    fn open(&self, namespace: &str, access: Access) -> io::Result<Box<dyn Namespace + '_>> {
        let flags = match access {
            Access::Read => KEY_READ,
            Access::ReadWrite => KEY_ALL_ACCESS,
        };
        let key = RegKey::predef(HKEY_CURRENT_USER).open_subkey_with_flags(namespace, flags)?;
        Ok(Box::new(RegistryNamespace { key }))
    }
}

struct RegistryNamespace {
    key: RegKey,
}

impl Namespace for RegistryNamespace {
    fn child_count(&self) -> io::Result<usize> {
        Ok(self.key.query_info()?.sub_keys as usize)
    }

    fn child_at(&self, index: usize) -> io::Result<Option<String>> {
        self.key.enum_keys().nth(index).transpose()
    }

    fn read_field(&self, child: &str, field: &str) -> io::Result<Option<String>> {
        let subkey = self.key.open_subkey(child)?;
        match subkey.get_value::<String, _>(field) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn delete_child(&self, child: &str) -> io::Result<()> {
        self.key.delete_subkey_all(child)
    }
}
