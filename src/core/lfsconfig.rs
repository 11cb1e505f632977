//! core::lfsconfig
//!
//! The `.lfsconfig` grammar and the lock server settings it carries.
//!
//! # Format
//!
//! `.lfsconfig` uses git-config syntax. Lockwork reads three things from it:
//!
//! ```text
//! [remote "origin"]
//! lfsurl = https://lfs.example.com/team/assets
//!
//! [lfs]
//! locksverify = true
//!
//! [lfs "https://lfs.example.com"]
//! access = basic
//! ```
//!
//! The first remote section with an `lfsurl` key names the remote and URL.
//! Basic authentication is on when an `[lfs "<prefix>"]` section whose
//! prefix matches the URL sets `access = basic`. A prefix matches when it
//! has the same origin as the URL (host case and userinfo are ignored) and
//! its path is a whole-segment prefix of the URL's path. Everything else in
//! the file is syntax-checked and ignored.
//!
//! Values containing `#`, `;`, quotes, backslashes, or surrounding
//! whitespace are written quoted so they read back unchanged.

use serde::{Deserialize, Serialize};
use url::Url;

/// Per-repository lock server override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockServerConfig {
    /// Remote the URL is attached to.
    pub remote: String,
    /// Absolute URL of the LFS server.
    pub url: String,
    /// Whether the server requires basic authentication.
    pub auth: bool,
}

/// A syntax error in `.lfsconfig`, located by 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl LockServerConfig {
    /// Check that the config can be written.
    ///
    /// Returns the URL's origin (`scheme://host[:port]`) on success.
    pub fn validate(&self) -> Result<String, String> {
        if self.remote.trim().is_empty() {
            return Err("remote name cannot be empty".into());
        }
        if self.remote.contains(['"', '\n', '\r', '\\']) {
            return Err(format!("invalid remote name '{}'", self.remote));
        }
        if self.url.contains(['\n', '\r']) {
            return Err("url cannot contain newlines".into());
        }
        let parsed = Url::parse(&self.url).map_err(|e| format!("invalid url '{}': {}", self.url, e))?;
        let origin = parsed.origin();
        if !origin.is_tuple() {
            return Err(format!("url '{}' has no host", self.url));
        }
        Ok(origin.ascii_serialization())
    }
}

/// Render a config in canonical form.
///
/// # Errors
///
/// Returns a message when [`LockServerConfig::validate`] rejects the config.
pub fn render(config: &LockServerConfig) -> Result<String, String> {
    let origin = config.validate()?;

    let mut out = format!(
        "[remote \"{}\"]\nlfsurl = {}\n\n[lfs]\nlocksverify = true\n",
        config.remote,
        quote_value(&config.url)
    );
    if config.auth {
        out.push_str(&format!("\n[lfs \"{}\"]\naccess = basic\n", origin));
    }
    Ok(out)
}

/// Parse `.lfsconfig` text.
///
/// Returns `Ok(None)` for well-formed text that names no remote URL.
pub fn parse(text: &str) -> Result<Option<LockServerConfig>, SyntaxError> {
    let mut section: Option<(String, Option<String>)> = None;
    let mut remote: Option<(String, String)> = None;
    let mut basic_prefixes: Vec<String> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            section = Some(parse_header(line).map_err(|message| SyntaxError {
                line: line_no,
                message,
            })?);
            continue;
        }

        let (key, value) = parse_entry(line).map_err(|message| SyntaxError {
            line: line_no,
            message,
        })?;
        let (name, sub) = section.as_ref().ok_or_else(|| SyntaxError {
            line: line_no,
            message: format!("key '{}' outside of any section", key),
        })?;

        match (name.as_str(), sub.as_deref(), key.as_str()) {
            ("remote", Some(remote_name), "lfsurl") if remote.is_none() => {
                remote = Some((remote_name.to_string(), value));
            }
            ("lfs", Some(prefix), "access") if value.eq_ignore_ascii_case("basic") => {
                basic_prefixes.push(prefix.to_string());
            }
            _ => {}
        }
    }

    Ok(remote.map(|(remote, url)| {
        let auth = basic_prefixes.iter().any(|prefix| prefix_matches(prefix, &url));
        LockServerConfig { remote, url, auth }
    }))
}

/// Whether an `[lfs "<prefix>"]` section applies to `url`.
fn prefix_matches(prefix: &str, url: &str) -> bool {
    let (Ok(prefix), Ok(url)) = (Url::parse(prefix), Url::parse(url)) else {
        return false;
    };
    if !prefix.origin().is_tuple() || prefix.origin() != url.origin() {
        return false;
    }

    let segments = |u: &Url| -> Vec<String> {
        u.path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).map(str::to_string).collect())
            .unwrap_or_default()
    };
    let wanted = segments(&prefix);
    let actual = segments(&url);
    actual.len() >= wanted.len() && actual.iter().zip(&wanted).all(|(a, w)| a == w)
}

/// Quote a value when git-config would otherwise read it differently.
fn quote_value(value: &str) -> String {
    let needs_quotes = value.contains(['#', ';', '"', '\\'])
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace);
    if !needs_quotes {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Drop a trailing `#`/`;` comment that is not inside quotes.
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => quoted = !quoted,
            '#' | ';' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_header(line: &str) -> Result<(String, Option<String>), String> {
    let inner = line
        .strip_prefix('[')
        .and_then(|l| l.strip_suffix(']'))
        .ok_or_else(|| format!("unterminated section header '{}'", line))?
        .trim();

    match inner.split_once(char::is_whitespace) {
        None => {
            check_name(inner)?;
            Ok((inner.to_ascii_lowercase(), None))
        }
        Some((name, rest)) => {
            check_name(name)?;
            let sub = rest
                .trim()
                .strip_prefix('"')
                .and_then(|r| r.strip_suffix('"'))
                .ok_or_else(|| format!("subsection must be quoted in '{}'", line))?;
            Ok((name.to_ascii_lowercase(), Some(unescape(sub))))
        }
    }
}

fn check_name(name: &str) -> Result<(), String> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.') {
        return Err(format!("invalid section name '{}'", name));
    }
    Ok(())
}

fn parse_entry(line: &str) -> Result<(String, String), String> {
    let (key, value) = match line.split_once('=') {
        Some((k, v)) => (k.trim(), v.trim()),
        // A bare key is boolean true in git-config.
        None => (line, "true"),
    };
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(format!("invalid key in '{}'", line));
    }

    let value = if value.starts_with('"') {
        let inner = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .ok_or_else(|| format!("unterminated quoted value in '{}'", line))?;
        unescape(inner)
    } else {
        value.to_string()
    };

    Ok((key.to_ascii_lowercase(), value))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(auth: bool) -> LockServerConfig {
        LockServerConfig {
            remote: "origin".into(),
            url: "https://lfs.example.com/team/assets".into(),
            auth,
        }
    }

    #[test]
    fn renders_canonical_form() {
        let text = render(&config(true)).unwrap();
        assert_eq!(
            text,
            "[remote \"origin\"]\nlfsurl = https://lfs.example.com/team/assets\n\n\
             [lfs]\nlocksverify = true\n\n\
             [lfs \"https://lfs.example.com\"]\naccess = basic\n"
        );
    }

    #[test]
    fn omits_access_section_without_auth() {
        let text = render(&config(false)).unwrap();
        assert!(!text.contains("access"));
    }

    #[test]
    fn origin_keeps_non_default_port() {
        let cfg = LockServerConfig {
            url: "http://localhost:8080/lfs".into(),
            ..config(true)
        };
        assert!(render(&cfg).unwrap().contains("[lfs \"http://localhost:8080\"]"));
    }

    #[test]
    fn roundtrips() {
        for auth in [true, false] {
            let text = render(&config(auth)).unwrap();
            assert_eq!(parse(&text).unwrap(), Some(config(auth)));
        }
    }

    #[test]
    fn url_with_comment_characters_is_quoted() {
        for url in [
            "https://lfs.example.com/team#main",
            "https://lfs.example.com/a;b",
            "https://lfs.example.com/q?x=\"y\"",
        ] {
            let cfg = LockServerConfig {
                url: url.into(),
                ..config(true)
            };
            let text = render(&cfg).unwrap();
            assert!(text.contains("lfsurl = \""), "{}", text);
            assert_eq!(parse(&text).unwrap(), Some(cfg));
        }
    }

    #[test]
    fn quote_value_escapes_quotes_and_backslashes() {
        assert_eq!(quote_value("https://a.example/x"), "https://a.example/x");
        assert_eq!(quote_value("a#b"), "\"a#b\"");
        assert_eq!(quote_value("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(quote_value(" x"), "\" x\"");
    }

    #[test]
    fn mixed_case_host_keeps_auth() {
        let cfg = LockServerConfig {
            url: "https://LFS.Example.com/team".into(),
            ..config(true)
        };
        let text = render(&cfg).unwrap();
        assert_eq!(parse(&text).unwrap(), Some(cfg));
    }

    #[test]
    fn userinfo_url_keeps_auth() {
        let cfg = LockServerConfig {
            url: "https://me@lfs.example.com/team".into(),
            ..config(true)
        };
        let text = render(&cfg).unwrap();
        assert_eq!(parse(&text).unwrap(), Some(cfg));
    }

    #[test]
    fn lookalike_host_does_not_count() {
        let text = "[remote \"origin\"]\nlfsurl = https://lfs.example.com.evil/x\n[lfs \"https://lfs.example.com\"]\naccess = basic\n";
        assert!(!parse(text).unwrap().unwrap().auth);
    }

    #[test]
    fn prefix_matches_whole_path_segments() {
        assert!(prefix_matches("https://h.example/team", "https://h.example/team/assets"));
        assert!(prefix_matches("https://h.example/team/", "https://h.example/team"));
        assert!(!prefix_matches("https://h.example/team", "https://h.example/teammates"));
        assert!(!prefix_matches("https://h.example:8443", "https://h.example/x"));
        assert!(!prefix_matches("http://h.example", "https://h.example/x"));
        assert!(!prefix_matches("not a url", "https://h.example/x"));
    }

    #[test]
    fn reads_quoted_access() {
        let text = "[remote \"origin\"]\nlfsurl = https://h.example/x\n[lfs \"https://h.example\"]\naccess = \"basic\"\n";
        let cfg = parse(text).unwrap().unwrap();
        assert!(cfg.auth);
    }

    #[test]
    fn access_for_other_host_does_not_count() {
        let text = "[remote \"origin\"]\nlfsurl = https://a.example/x\n[lfs \"https://b.example\"]\naccess = basic\n";
        assert!(!parse(text).unwrap().unwrap().auth);
    }

    #[test]
    fn first_remote_wins() {
        let text = "[remote \"one\"]\nlfsurl = https://a.example\n[remote \"two\"]\nlfsurl = https://b.example\n";
        let cfg = parse(text).unwrap().unwrap();
        assert_eq!(cfg.remote, "one");
        assert_eq!(cfg.url, "https://a.example");
    }

    #[test]
    fn without_lfsurl_is_none() {
        let text = "# team settings\n[lfs]\nlocksverify = true\n";
        assert_eq!(parse(text).unwrap(), None);
        assert_eq!(parse("").unwrap(), None);
    }

    #[test]
    fn comments_and_case_are_tolerated() {
        let text = "; generated\n[Remote \"origin\"]\n  LfsUrl = https://a.example/x # primary\n";
        assert_eq!(parse(text).unwrap().unwrap().url, "https://a.example/x");
    }

    #[test]
    fn malformed_header_reports_line() {
        let err = parse("[lfs]\nlocksverify = true\n[remote \"origin\"\n").unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn key_outside_section_is_error() {
        let err = parse("lfsurl = https://a.example\n").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn unquoted_subsection_is_error() {
        assert!(parse("[remote origin]\n").is_err());
    }

    #[test]
    fn rejects_bad_configs() {
        let bad_remote = LockServerConfig {
            remote: "a\"b".into(),
            ..config(false)
        };
        assert!(render(&bad_remote).is_err());

        let bad_url = LockServerConfig {
            url: "not a url".into(),
            ..config(false)
        };
        assert!(render(&bad_url).is_err());

        let empty_remote = LockServerConfig {
            remote: " ".into(),
            ..config(false)
        };
        assert!(render(&empty_remote).is_err());
    }
}
