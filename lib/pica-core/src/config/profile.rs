use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::PicaError;

/// The per-user profile directory, `~/.pica`.
///
/// [`Profile::init`] is meant to be called once by the process entry point;
/// the directory is read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    path: PathBuf,
}

impl Profile {
    /// Name of the profile directory inside the home directory.
    pub const DIR_NAME: &'static str = ".pica";

    /// Creates `<home>/.pica` if absent.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be inspected or created, or when the
    /// path exists but is not a directory.
    pub fn init(home: impl AsRef<Path>) -> Result<Self, PicaError> {
        let path = home.as_ref().join(Self::DIR_NAME);

        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_dir() => {
                debug!(path = %path.display(), "profile directory found");
            }
            Ok(_) => {
                return Err(PicaError::Profile {
                    source: std::io::Error::new(ErrorKind::AlreadyExists, "not a directory"),
                    path,
                });
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                fs::create_dir_all(&path).map_err(|source| PicaError::Profile {
                    path: path.clone(),
                    source,
                })?;
                info!(path = %path.display(), "profile directory created");
            }
            Err(source) => return Err(PicaError::Profile { path, source }),
        }

        Ok(Self { path })
    }

    /// Creates the profile in the current user home directory.
    ///
    /// # Errors
    ///
    /// Fails when no home directory is known, see also [`Profile::init`].
    pub fn init_default() -> Result<Self, PicaError> {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .filter(|home| !home.is_empty())
            .ok_or(PicaError::MissingHomeDirectory)?;
        Self::init(PathBuf::from(home))
    }

    /// The profile directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
