use std::{
    env, fs,
    path::{Path, PathBuf},
};

#[derive(Debug, thiserror::Error)]
pub enum HomeDirError {
    #[error("HOME environment variable is not set")]
    HomeMissing,
    #[error("APPDATA environment variable is not set")]
    AppDataMissing,
    #[error("home_dir must be an absolute path (after ~ expansion): {0}")]
    AbsoluteRequired(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn user_home() -> Result<String, HomeDirError> {
    #[cfg(target_os = "windows")]
    {
        env::var("USERPROFILE")
            .or_else(|_| env::var("HOME"))
            .map_err(|_| HomeDirError::HomeMissing)
    }
    #[cfg(not(target_os = "windows"))]
    {
        env::var("HOME").map_err(|_| HomeDirError::HomeMissing)
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(raw: &str) -> Result<PathBuf, HomeDirError> {
    if raw == "~" {
        return Ok(PathBuf::from(user_home()?));
    }
    match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Some(rest) => Ok(Path::new(&user_home()?).join(rest)),
        None => Ok(PathBuf::from(raw)),
    }
}

fn platform_base() -> Result<PathBuf, HomeDirError> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .map(PathBuf::from)
            .map_err(|_| HomeDirError::AppDataMissing)
    }
    #[cfg(not(target_os = "windows"))]
    {
        user_home().map(PathBuf::from)
    }
}

/// Resolve the application home directory.
///
/// An explicit `config_home` is tilde-expanded and must end up absolute.
/// Without one the platform default is used: `%APPDATA%/<default_subdir>` on
/// Windows, `$HOME/<default_subdir>` elsewhere. With `create` the directory
/// is created when missing.
pub fn resolve_home_dir(
    config_home: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let path = match config_home {
        Some(raw) => {
            let expanded = expand_tilde(&raw)?;
            if !expanded.is_absolute() {
                return Err(HomeDirError::AbsoluteRequired(
                    expanded.to_string_lossy().into(),
                ));
            }
            expanded
        }
        None => platform_base()?.join(default_subdir),
    };

    if create {
        fs::create_dir_all(&path)?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_absolute_home_is_created() {
        let tmp = tempdir().unwrap();
        let want = tmp.path().join("nested").join(".resto");
        let got =
            resolve_home_dir(Some(want.to_string_lossy().into()), ".ignored", true).unwrap();
        assert_eq!(got, want);
        assert!(got.is_dir());
    }

    #[test]
    fn test_relative_home_is_rejected() {
        let err = resolve_home_dir(Some("relative/dir".into()), ".resto", false).unwrap_err();
        assert!(matches!(err, HomeDirError::AbsoluteRequired(_)));
    }

    #[test]
    fn test_plain_paths_are_not_expanded() {
        assert_eq!(expand_tilde("/srv/resto").unwrap(), PathBuf::from("/srv/resto"));
        assert_eq!(expand_tilde("a~b").unwrap(), PathBuf::from("a~b"));
    }
}
