use std::env;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("path is empty")]
    Empty,
    #[error("home directory is unknown; cannot expand '{0}'")]
    NoHome(String),
    #[error("'~user' expansion is not supported in '{0}'")]
    OtherUser(String),
    #[error("environment variable '{name}' is not set (in '{raw}')")]
    UnknownVariable { name: String, raw: String },
    #[error("unterminated '${{' in '{0}'")]
    Unterminated(String),
    #[error("failed to determine current directory: {0}")]
    CurrentDir(#[source] io::Error),
}

/// Expands `~`, `$VAR` and `${VAR}` placeholders against the process
/// environment and anchors relative results at the current directory.
pub fn expand_path(raw: &str) -> Result<PathBuf, ExpandError> {
    let cwd = env::current_dir().map_err(ExpandError::CurrentDir)?;
    let home = dirs::home_dir();
    expand_with(raw, home.as_deref(), |name| env::var(name).ok(), &cwd)
}

/// Same as [`expand_path`] with every environmental input supplied by the caller.
pub fn expand_with<F>(
    raw: &str,
    home: Option<&Path>,
    lookup: F,
    cwd: &Path,
) -> Result<PathBuf, ExpandError>
where
    F: Fn(&str) -> Option<String>,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExpandError::Empty);
    }

    let substituted = substitute_vars(trimmed, &lookup)?;
    let expanded = expand_tilde(&substituted, home, raw)?;
    let anchored = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };
    // Rebuilding from components drops `.` segments, doubled and trailing separators.
    Ok(anchored.components().collect())
}

fn expand_tilde(text: &str, home: Option<&Path>, raw: &str) -> Result<PathBuf, ExpandError> {
    let Some(rest) = text.strip_prefix('~') else {
        return Ok(PathBuf::from(text));
    };
    if !rest.is_empty() && !rest.starts_with(['/', '\\']) {
        return Err(ExpandError::OtherUser(raw.to_string()));
    }
    let home = home.ok_or_else(|| ExpandError::NoHome(raw.to_string()))?;
    let rest = rest.trim_start_matches(['/', '\\']);
    if rest.is_empty() {
        Ok(home.to_path_buf())
    } else {
        Ok(home.join(rest))
    }
}

fn substitute_vars<F>(text: &str, lookup: &F) -> Result<String, ExpandError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            let end = braced
                .find('}')
                .ok_or_else(|| ExpandError::Unterminated(text.to_string()))?;
            (&braced[..end], end + 2)
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };
        if name.is_empty() {
            // A lone `$` is kept literally.
            out.push('$');
            rest = after;
            continue;
        }
        let value = lookup(name).ok_or_else(|| ExpandError::UnknownVariable {
            name: name.to_string(),
            raw: text.to_string(),
        })?;
        out.push_str(&value);
        rest = &after[consumed..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn env_lookup(name: &str) -> Option<String> {
        match name {
            "HOME" => Some("/home/u".to_string()),
            "NOTES" => Some("/data/notes".to_string()),
            _ => None,
        }
    }

    fn expand(raw: &str) -> Result<PathBuf, ExpandError> {
        expand_with(raw, Some(Path::new("/home/u")), env_lookup, Path::new("/work"))
    }

    #[test]
    fn expands_tilde_forms() {
        assert_eq!(expand("~").unwrap(), PathBuf::from("/home/u"));
        assert_eq!(expand("~/notes").unwrap(), PathBuf::from("/home/u/notes"));
    }

    #[test]
    fn expands_environment_variables() {
        assert_eq!(
            expand("$HOME/work-notes").unwrap(),
            PathBuf::from("/home/u/work-notes")
        );
        assert_eq!(
            expand("${NOTES}/daily").unwrap(),
            PathBuf::from("/data/notes/daily")
        );
    }

    #[test]
    fn relative_paths_are_anchored_and_cleaned() {
        assert_eq!(expand("nb/./x/").unwrap(), PathBuf::from("/work/nb/x"));
        assert_eq!(expand("/a//b/").unwrap(), PathBuf::from("/a/b"));
    }

    #[test]
    fn lone_dollar_is_literal() {
        assert_eq!(expand("/tmp/$/x").unwrap(), PathBuf::from("/tmp/$/x"));
    }

    #[test]
    fn failures_are_reported() {
        assert!(matches!(expand("   "), Err(ExpandError::Empty)));
        assert!(matches!(
            expand("$MISSING/x"),
            Err(ExpandError::UnknownVariable { .. })
        ));
        assert!(matches!(expand("${HOME"), Err(ExpandError::Unterminated(_))));
        assert!(matches!(expand("~bob/x"), Err(ExpandError::OtherUser(_))));
        assert!(matches!(
            expand_with("~/x", None, env_lookup, Path::new("/")),
            Err(ExpandError::NoHome(_))
        ));
    }
}
