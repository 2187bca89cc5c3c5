use crate::core::error::{LauncherError, LauncherResult};

use super::RegistryReader;

/// Local-machine registry, always opened through the 64-bit view so a
/// 32-bit launcher still sees 64-bit runtime installs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRegistry;

#[cfg(windows)]
mod imp {
    use winreg::enums::{HKEY_LOCAL_MACHINE, KEY_READ, KEY_WOW64_64KEY};
    use winreg::RegKey;

    use super::*;

    fn open(key: &str) -> LauncherResult<RegKey> {
        RegKey::predef(HKEY_LOCAL_MACHINE)
            .open_subkey_with_flags(key, KEY_READ | KEY_WOW64_64KEY)
            .map_err(|source| LauncherError::Registry {
                key: key.to_string(),
                source,
            })
    }

    impl RegistryReader for SystemRegistry {
        fn subkeys(&self, key: &str) -> LauncherResult<Vec<LauncherResult<String>>> {
            let handle = open(key)?;
            Ok(handle
                .enum_keys()
                .map(|name| {
                    name.map_err(|source| LauncherError::Registry {
                        key: key.to_string(),
                        source,
                    })
                })
                .collect())
        }

        fn string_value(&self, key: &str, name: &str) -> LauncherResult<String> {
            open(key)?
                .get_value::<String, _>(name)
                .map_err(|source| LauncherError::Registry {
                    key: format!("{key}\\{name}"),
                    source,
                })
        }
    }
}

#[cfg(not(windows))]
mod imp {
    use super::*;

    fn unsupported(key: &str) -> LauncherError {
        LauncherError::Registry {
            key: key.to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "no registry on this platform",
            ),
        }
    }

    impl RegistryReader for SystemRegistry {
        fn subkeys(&self, key: &str) -> LauncherResult<Vec<LauncherResult<String>>> {
            Err(unsupported(key))
        }

        fn string_value(&self, key: &str, _name: &str) -> LauncherResult<String> {
            Err(unsupported(key))
        }
    }
}
