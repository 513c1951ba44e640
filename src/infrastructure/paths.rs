//! Path manipulation utilities.
//!
//! Resolves the default policy location and expands `~` in configured paths.
//! Both read the environment once per call and never touch the filesystem.

use std::path::PathBuf;

/// Returns the data directory for feedsieve storage.
///
/// `$XDG_DATA_HOME/feedsieve` when set, otherwise
/// `~/.local/share/feedsieve`, falling back to a relative `.feedsieve`
/// when no home directory is known.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("feedsieve");
    }

    home_dir().map_or_else(
        || PathBuf::from(".feedsieve"),
        |home| home.join(".local").join("share").join("feedsieve"),
    )
}

/// Default location of the JSON policy file.
#[must_use]
pub fn default_policy_path() -> PathBuf {
    data_dir().join("policy.json")
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, and all paths when no home directory is
/// known, are returned unchanged.
///
/// # Examples
///
/// ```
/// use feedsieve::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("/absolute/path").to_str(), Some("/absolute/path"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let Some(home) = home_dir() else {
        return PathBuf::from(path);
    };

    if path == "~" {
        home
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_and_relative_paths_are_untouched() {
        assert_eq!(expand_tilde("/etc/feedsieve.toml"), PathBuf::from("/etc/feedsieve.toml"));
        assert_eq!(expand_tilde("policy.json"), PathBuf::from("policy.json"));
        assert_eq!(expand_tilde("~user/x"), PathBuf::from("~user/x"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = home_dir() else {
            return;
        };
        assert_eq!(expand_tilde("~"), home);
        assert_eq!(expand_tilde("~/policy.json"), home.join("policy.json"));
    }

    #[test]
    fn default_policy_lives_in_data_dir() {
        assert_eq!(default_policy_path(), data_dir().join("policy.json"));
    }
}
