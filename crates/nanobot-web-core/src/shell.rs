//! Remote shell command construction.
//!
//! Every value that reaches a remote command line goes through [`quote`] or
//! [`quote_path`]; file contents travel inside a quoted heredoc whose
//! delimiter never occurs in the content.

use std::borrow::Cow;

use uuid::Uuid;

use crate::RemoteError;

/// Prepended to every remote command so user-local tool installs are found
/// by non-interactive sessions.
pub const PATH_PREFIX: &str = "export PATH=$PATH:$HOME/.local/bin:/usr/local/bin && ";

/// Base heredoc delimiter for file writes.
pub const HEREDOC_SENTINEL: &str = "NANOBOT_EOF";

/// Prefix `command` with the PATH augmentation.
#[must_use]
pub fn with_path_prefix(command: &str) -> String {
    format!("{PATH_PREFIX}{command}")
}

/// Quote a single shell word.
///
/// # Errors
/// Returns error if the value contains a NUL byte.
pub fn quote(value: &str) -> Result<String, RemoteError> {
    shlex::try_quote(value)
        .map(Cow::into_owned)
        .map_err(|e| RemoteError::Quote(e.to_string()))
}

/// Quote a remote path, keeping a leading `~/` expandable.
///
/// # Errors
/// Returns error if the path contains a NUL byte.
pub fn quote_path(path: &str) -> Result<String, RemoteError> {
    if path == "~" {
        return Ok("\"$HOME\"".to_string());
    }
    match path.strip_prefix("~/") {
        Some(rest) if rest.is_empty() => Ok("\"$HOME\"/".to_string()),
        Some(rest) => Ok(format!("\"$HOME\"/{}", quote(rest)?)),
        None => quote(path),
    }
}

/// Quote and join a list of words into one command line.
///
/// # Errors
/// Returns error if any word contains a NUL byte.
pub fn join<'a, I>(words: I) -> Result<String, RemoteError>
where
    I: IntoIterator<Item = &'a str>,
{
    shlex::try_join(words).map_err(|e| RemoteError::Quote(e.to_string()))
}

/// Pick a heredoc delimiter that does not appear as a line of `content`.
#[must_use]
pub fn heredoc_delimiter(content: &str) -> String {
    let mut delimiter = HEREDOC_SENTINEL.to_string();
    while content.lines().any(|line| line == delimiter) {
        delimiter = format!("{HEREDOC_SENTINEL}_{}", Uuid::new_v4().simple());
    }
    delimiter
}

/// `cat` command for a remote file.
///
/// # Errors
/// Returns error if the path cannot be quoted.
pub fn read_file_command(path: &str) -> Result<String, RemoteError> {
    Ok(format!("cat {}", quote_path(path)?))
}

/// Script that writes `content` to `path` byte for byte.
///
/// The parent directory is created first. A heredoc always ends the
/// document with a newline, so the file is truncated by one byte afterwards.
///
/// # Errors
/// Returns error if the path cannot be quoted.
pub fn write_file_command(path: &str, content: &str) -> Result<String, RemoteError> {
    let target = quote_path(path)?;
    let delimiter = heredoc_delimiter(content);
    Ok(format!(
        "mkdir -p \"$(dirname {target})\" && cat > {target} << '{delimiter}' && truncate -s -1 {target}\n{content}\n{delimiter}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_prefix() {
        assert_eq!(
            with_path_prefix("nanobot status"),
            "export PATH=$PATH:$HOME/.local/bin:/usr/local/bin && nanobot status"
        );
    }

    #[test]
    fn test_quote_plain_and_special() {
        assert_eq!(quote("job-1").unwrap(), "job-1");
        let quoted = quote("it's $HOME; rm -rf /").unwrap();
        assert_ne!(quoted, "it's $HOME; rm -rf /");
        assert_eq!(shlex::split(&quoted).unwrap(), vec!["it's $HOME; rm -rf /"]);
    }

    #[test]
    fn test_quote_rejects_nul() {
        assert!(matches!(quote("a\0b"), Err(RemoteError::Quote(_))));
    }

    #[test]
    fn test_quote_path_keeps_home_expandable() {
        let quoted = quote_path("~/.nanobot/my config.json").unwrap();
        assert!(quoted.starts_with("\"$HOME\"/"));
        assert!(quoted.contains("my config.json"));
        assert_eq!(quote_path("~").unwrap(), "\"$HOME\"");
        assert_eq!(quote_path("/tmp/nanobot.log").unwrap(), "/tmp/nanobot.log");
    }

    #[test]
    fn test_join() {
        let line = join(["nanobot", "cron", "add", "--name", "daily report"]).unwrap();
        assert_eq!(
            shlex::split(&line).unwrap(),
            vec!["nanobot", "cron", "add", "--name", "daily report"]
        );
    }

    #[test]
    fn test_delimiter_avoids_content() {
        assert_eq!(heredoc_delimiter("hello"), HEREDOC_SENTINEL);

        let content = format!("line\n{HEREDOC_SENTINEL}\nmore");
        let delimiter = heredoc_delimiter(&content);
        assert_ne!(delimiter, HEREDOC_SENTINEL);
        assert!(delimiter.starts_with(HEREDOC_SENTINEL));
        assert!(!content.lines().any(|l| l == delimiter));
    }

    #[test]
    fn test_write_command_shape() {
        let cmd = write_file_command("/tmp/a b/file.md", "x'y").unwrap();
        let (first, rest) = cmd.split_once('\n').unwrap();
        assert!(first.starts_with("mkdir -p \"$(dirname "));
        assert!(first.contains("<< 'NANOBOT_EOF'"));
        let target = quote("/tmp/a b/file.md").unwrap();
        assert!(first.ends_with(&format!("truncate -s -1 {target}")));
        assert_eq!(rest, "x'y\nNANOBOT_EOF");
    }
}
