//! core::attributes
//!
//! The `.gitattributes` rule grammar.
//!
//! # Grammar
//!
//! Each line is one rule:
//! - `# text` - a comment
//! - `pattern attr...` - a pattern rule, where each attribute token is
//!   `name` (set), `-name` (unset), `!name` (unspecified) or `name=value`
//! - anything else (blank lines, `[attr]` macros, lines that do not
//!   tokenize) is kept verbatim so that rewriting the file never loses it
//!
//! Patterns containing whitespace, quotes or backslashes are written in
//! C-style double quotes, which git also accepts on read.
//!
//! # Example
//!
//! ```
//! use lockwork::core::attributes::{parse_line, AttributeRule};
//!
//! let mut rule = parse_line("*.psd filter=lfs diff=lfs merge=lfs -text");
//! assert!(rule.is_stored_in_lfs());
//! assert!(!rule.is_lockable());
//!
//! rule.set_lockable(true);
//! assert_eq!(
//!     rule.render().unwrap(),
//!     "*.psd filter=lfs diff=lfs merge=lfs -text lockable"
//! );
//! ```

use serde::{Deserialize, Serialize};

/// Attribute that marks a file as lockable.
pub const LOCKABLE: &str = "lockable";

const LFS_ATTRIBUTES: [&str; 3] = ["filter", "diff", "merge"];

/// State of one attribute in a pattern rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrState {
    /// `name`
    Set,
    /// `-name`
    Unset,
    /// `!name`
    Unspecified,
    /// `name=value`
    Value(String),
}

/// One attribute assignment in a pattern rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub state: AttrState,
}

impl Attribute {
    fn render(&self) -> String {
        match &self.state {
            AttrState::Set => self.name.clone(),
            AttrState::Unset => format!("-{}", self.name),
            AttrState::Unspecified => format!("!{}", self.name),
            AttrState::Value(v) => format!("{}={}", self.name, v),
        }
    }

    fn parse(token: &str) -> Option<Self> {
        let (name, state) = if let Some(name) = token.strip_prefix('-') {
            (name, AttrState::Unset)
        } else if let Some(name) = token.strip_prefix('!') {
            (name, AttrState::Unspecified)
        } else if let Some((name, value)) = token.split_once('=') {
            (name, AttrState::Value(value.to_string()))
        } else {
            (token, AttrState::Set)
        };
        valid_name(name).then(|| Self {
            name: name.to_string(),
            state,
        })
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// One line of `.gitattributes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeRule {
    /// A `#` comment; the text excludes the `#` and one following space.
    Comment { text: String },
    /// A glob pattern with ordered attribute assignments.
    Pattern {
        pattern: String,
        attributes: Vec<Attribute>,
    },
    /// A line kept exactly as read.
    Verbatim { line: String },
}

impl AttributeRule {
    /// A comment rule.
    pub fn comment(text: impl Into<String>) -> Self {
        AttributeRule::Comment { text: text.into() }
    }

    /// A pattern rule with no attributes yet.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        AttributeRule::Pattern {
            pattern: pattern.into(),
            attributes: Vec::new(),
        }
    }

    /// The glob pattern, for pattern rules.
    pub fn pattern_str(&self) -> Option<&str> {
        match self {
            AttributeRule::Pattern { pattern, .. } => Some(pattern),
            _ => None,
        }
    }

    /// The state of attribute `name`, if this pattern rule mentions it.
    pub fn get(&self, name: &str) -> Option<&AttrState> {
        match self {
            AttributeRule::Pattern { attributes, .. } => attributes
                .iter()
                .find(|a| a.name == name)
                .map(|a| &a.state),
            _ => None,
        }
    }

    /// Assign attribute `name`, replacing it in place or appending it.
    ///
    /// Has no effect on comment and verbatim rules.
    pub fn set(&mut self, name: &str, state: AttrState) {
        if let AttributeRule::Pattern { attributes, .. } = self {
            match attributes.iter_mut().find(|a| a.name == name) {
                Some(existing) => existing.state = state,
                None => attributes.push(Attribute {
                    name: name.to_string(),
                    state,
                }),
            }
        }
    }

    /// Drop attribute `name` from a pattern rule.
    pub fn remove(&mut self, name: &str) {
        if let AttributeRule::Pattern { attributes, .. } = self {
            attributes.retain(|a| a.name != name);
        }
    }

    /// Whether matching files are stored in LFS (`filter=lfs`).
    pub fn is_stored_in_lfs(&self) -> bool {
        self.get("filter") == Some(&AttrState::Value("lfs".into()))
    }

    /// Store matching files in LFS or stop doing so.
    ///
    /// Enabling sets `filter=lfs diff=lfs merge=lfs -text`; disabling removes
    /// all four.
    pub fn set_stored_in_lfs(&mut self, stored: bool) {
        for name in LFS_ATTRIBUTES {
            if stored {
                self.set(name, AttrState::Value("lfs".into()));
            } else {
                self.remove(name);
            }
        }
        if stored {
            self.set("text", AttrState::Unset);
        } else {
            self.remove("text");
        }
    }

    /// Whether matching files are lockable.
    pub fn is_lockable(&self) -> bool {
        self.get(LOCKABLE) == Some(&AttrState::Set)
    }

    /// Mark matching files lockable or drop the attribute.
    pub fn set_lockable(&mut self, lockable: bool) {
        if lockable {
            self.set(LOCKABLE, AttrState::Set);
        } else {
            self.remove(LOCKABLE);
        }
    }

    /// Render this rule as one line, without the line terminator.
    ///
    /// # Errors
    ///
    /// Returns a message if the rule cannot be written as a single line or
    /// names an attribute the grammar cannot express.
    pub fn render(&self) -> Result<String, String> {
        match self {
            AttributeRule::Comment { text } => {
                check_single_line(text)?;
                Ok(if text.is_empty() {
                    "#".to_string()
                } else {
                    format!("# {}", text)
                })
            }
            AttributeRule::Pattern {
                pattern,
                attributes,
            } => {
                if pattern.is_empty() {
                    return Err("pattern cannot be empty".into());
                }
                check_single_line(pattern)?;
                let mut line = quote_pattern(pattern);
                for attr in attributes {
                    if !valid_name(&attr.name) {
                        return Err(format!("invalid attribute name '{}'", attr.name));
                    }
                    if let AttrState::Value(v) = &attr.state {
                        if v.is_empty() || v.chars().any(char::is_whitespace) {
                            return Err(format!("invalid value '{}' for '{}'", v, attr.name));
                        }
                    }
                    line.push(' ');
                    line.push_str(&attr.render());
                }
                Ok(line)
            }
            AttributeRule::Verbatim { line } => {
                check_single_line(line)?;
                Ok(line.clone())
            }
        }
    }
}

fn check_single_line(s: &str) -> Result<(), String> {
    if s.contains(['\n', '\r']) {
        return Err(format!("{:?} spans more than one line", s));
    }
    Ok(())
}

fn quote_pattern(pattern: &str) -> String {
    let needs_quotes = pattern.starts_with('#')
        || pattern.starts_with("[attr]")
        || pattern
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\\');
    if !needs_quotes {
        return pattern.to_string();
    }

    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('"');
    for c in pattern.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Parse one line of `.gitattributes`.
///
/// Never fails: lines that are not comments or well-formed pattern rules
/// come back as [`AttributeRule::Verbatim`].
pub fn parse_line(line: &str) -> AttributeRule {
    let verbatim = || AttributeRule::Verbatim {
        line: line.to_string(),
    };

    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with("[attr]") {
        return verbatim();
    }
    if let Some(text) = trimmed.strip_prefix('#') {
        return AttributeRule::comment(text.strip_prefix(' ').unwrap_or(text));
    }

    let (pattern, rest) = if trimmed.starts_with('"') {
        match unquote_pattern(trimmed) {
            Some(split) => split,
            None => return verbatim(),
        }
    } else {
        match trimmed.split_once(char::is_whitespace) {
            Some((p, rest)) => (p.to_string(), rest),
            None => (trimmed.to_string(), ""),
        }
    };

    let mut attributes = Vec::new();
    for token in rest.split_whitespace() {
        match Attribute::parse(token) {
            Some(attr) => attributes.push(attr),
            None => return verbatim(),
        }
    }

    AttributeRule::Pattern {
        pattern,
        attributes,
    }
}

/// Split a C-quoted pattern off the front of `line`.
fn unquote_pattern(line: &str) -> Option<(String, &str)> {
    let mut bytes = Vec::new();
    let mut iter = line.char_indices().skip(1);

    while let Some((i, c)) = iter.next() {
        match c {
            '"' => {
                let rest = &line[i + 1..];
                if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
                    return None;
                }
                return String::from_utf8(bytes).ok().map(|p| (p, rest));
            }
            '\\' => {
                let (_, esc) = iter.next()?;
                match esc {
                    'n' => bytes.push(b'\n'),
                    't' => bytes.push(b'\t'),
                    'r' => bytes.push(b'\r'),
                    'a' => bytes.push(0x07),
                    'b' => bytes.push(0x08),
                    'f' => bytes.push(0x0c),
                    'v' => bytes.push(0x0b),
                    '0'..='3' => {
                        let mut value = esc.to_digit(8)?;
                        for _ in 0..2 {
                            let (_, d) = iter.next()?;
                            value = value * 8 + d.to_digit(8)?;
                        }
                        bytes.push(u8::try_from(value).ok()?);
                    }
                    other => {
                        let mut buf = [0u8; 4];
                        bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
                    }
                }
            }
            other => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    None
}

/// Parse a whole file into rules, one per line.
pub fn parse_rules(text: &str) -> Vec<AttributeRule> {
    text.lines().map(parse_line).collect()
}

/// Render rules into file contents, one per line with a trailing newline.
pub fn render_rules(rules: &[AttributeRule]) -> Result<String, String> {
    let mut out = String::new();
    for rule in rules {
        out.push_str(&rule.render()?);
        out.push('\n');
    }
    Ok(out)
}

/// The built-in rule set for common binary asset types.
///
/// Every pattern is stored in LFS and lockable, grouped under comments.
pub fn default_rules() -> Vec<AttributeRule> {
    const GROUPS: &[(&str, &[&str])] = &[
        (
            "3D models",
            &[
                "3dm", "3ds", "blend", "c4d", "collada", "dae", "dxf", "fbx", "jas", "lws", "lxo",
                "ma", "max", "mb", "obj", "ply", "skp", "stl", "ztl",
            ],
        ),
        (
            "Audio",
            &["aif", "aiff", "it", "mod", "mp3", "ogg", "s3m", "wav", "xm"],
        ),
        ("Fonts", &["otf", "ttf"]),
        (
            "Images",
            &[
                "bmp", "exr", "gif", "hdr", "iff", "jpeg", "jpg", "pict", "png", "psd", "tga",
                "tif", "tiff",
            ],
        ),
    ];

    let mut rules = Vec::new();
    for (heading, extensions) in GROUPS {
        rules.push(AttributeRule::comment(*heading));
        for ext in *extensions {
            let mut rule = AttributeRule::pattern(format!("*.{}", ext));
            rule.set_stored_in_lfs(true);
            rule.set_lockable(true);
            rules.push(rule);
        }
    }
    rules
}
