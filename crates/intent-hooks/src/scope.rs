//! Glob scope matcher.
//!
//! Paths and patterns are compared as forward-slash strings with leading
//! slashes stripped. A pattern matches when any of these hold:
//!
//! - it equals the path
//! - it ends in `/**` and the path is the prefix or lies under it
//! - it has no `*` and the path lies under it as a directory
//! - its glob form matches: `**` spans any characters including `/`,
//!   `*` spans any characters except `/`

use regex::Regex;
use tracing::warn;

/// Whether `path` falls under any of `owned_scope`.
///
/// An empty pattern list never matches.
pub fn path_matches_owned_scope<S: AsRef<str>>(path: &str, owned_scope: &[S]) -> bool {
    if owned_scope.is_empty() {
        return false;
    }
    let path = normalize(path);
    owned_scope
        .iter()
        .any(|pattern| matches_glob(&path, &normalize(pattern.as_ref())))
}

fn normalize(raw: &str) -> String {
    raw.replace('\\', "/").trim_start_matches('/').to_string()
}

fn matches_glob(path: &str, pattern: &str) -> bool {
    if path == pattern {
        return true;
    }
    if let Some(prefix) = pattern.strip_suffix("/**") {
        if is_within(path, prefix) {
            return true;
        }
    }
    if !pattern.is_empty() && !pattern.contains('*') && is_within(path, pattern) {
        return true;
    }
    match glob_to_regex(pattern) {
        Ok(re) => re.is_match(path),
        Err(err) => {
            warn!(pattern, error = %err, "unusable scope pattern");
            false
        }
    }
}

fn is_within(path: &str, dir: &str) -> bool {
    path == dir
        || path
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn glob_to_regex(glob: &str) -> Result<Regex, regex::Error> {
    let mut re = String::with_capacity(glob.len() * 2 + 2);
    re.push('^');
    let mut chars = glob.chars().peekable();
    let mut buf = [0u8; 4];
    while let Some(ch) = chars.next() {
        if ch == '*' {
            if chars.peek() == Some(&'*') {
                let _ = chars.next();
                re.push_str(".*");
            } else {
                re.push_str("[^/]*");
            }
        } else {
            re.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
        }
    }
    re.push('$');
    Regex::new(&re)
}
