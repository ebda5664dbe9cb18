use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

/// Directories listed in `PATH`, in order.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Reads `PATH` as it is right now; lookups never cache it.
    pub fn from_env() -> Self {
        env::var_os("PATH").map_or_else(Self::default, |path| Self::parse(&path))
    }

    pub fn parse(path: &OsStr) -> Self {
        Self {
            dirs: env::split_paths(path)
                .filter(|dir| !dir.as_os_str().is_empty())
                .collect(),
        }
    }

    /// Finds the first entry named exactly `command`.
    ///
    /// Directories are searched in order and each one in listing order.
    /// Permissions are not checked.
    pub fn find(&self, command: &str) -> Option<PathBuf> {
        self.dirs.iter().find_map(|dir| {
            fs::read_dir(dir)
                .ok()?
                .flatten()
                .find(|entry| entry.file_name() == command)
                .map(|_| dir.join(command))
        })
    }

    /// Every entry name in every directory, for completion.
    pub fn entries(&self) -> impl Iterator<Item = String> + '_ {
        self.dirs
            .iter()
            .filter_map(|dir| fs::read_dir(dir).ok())
            .flat_map(|entries| entries.flatten())
            .filter_map(|entry| entry.file_name().into_string().ok())
    }
}
