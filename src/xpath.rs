//! Simple XPath handling for data-tree paths
//!
//! Only the subset the datastore hands to operational callbacks is
//! supported: absolute location paths made of `prefix:name` steps with
//! `[key='value']` predicates. Wildcard steps (`*`) parse so request paths
//! can be inspected, but cannot be used to create nodes.

use std::fmt;

use crate::error::{BridgeError, Result};

/// One location step of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Module prefix, if the step carries one
    pub module: Option<String>,
    /// Node name
    pub name: String,
    /// List key predicates in path order
    pub predicates: Vec<(String, String)>,
}

impl Segment {
    /// Create a segment without predicates
    pub fn new(module: Option<&str>, name: &str) -> Self {
        Self {
            module: module.map(str::to_string),
            name: name.to_string(),
            predicates: Vec::new(),
        }
    }

    /// Value of the predicate for `key`, if present
    pub fn predicate(&self, key: &str) -> Option<&str> {
        self.predicates
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the step is a wildcard
    pub fn is_wildcard(&self) -> bool {
        self.name == "*" || self.name == "."
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(module) = &self.module {
            write!(f, "{}:", module)?;
        }
        f.write_str(&self.name)?;
        for (key, value) in &self.predicates {
            write!(f, "[{}={}]", key, quote(value))?;
        }
        Ok(())
    }
}

/// Quote a predicate value, with double quotes if it contains a single one
///
/// XPath literals have no escapes, so a value holding both quote characters
/// cannot be written; the result is then rejected by [`parse`] with
/// `InvalidPath`.
pub fn quote(value: &str) -> String {
    if value.contains('\'') {
        format!("\"{}\"", value)
    } else {
        format!("'{}'", value)
    }
}

/// Parse an absolute path into its steps
///
/// `/` alone yields no steps.
pub fn parse(path: &str) -> Result<Vec<Segment>> {
    let trimmed = path.trim();
    let rest = trimmed
        .strip_prefix('/')
        .ok_or_else(|| BridgeError::invalid_path(path, "path must be absolute"))?;

    if rest.is_empty() {
        return Ok(Vec::new());
    }

    split_steps(rest, path)?
        .into_iter()
        .map(|step| parse_step(step, path))
        .collect()
}

/// Render steps back into an absolute path
pub fn format_path(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    segments.iter().map(|s| format!("/{}", s)).collect()
}

/// Find the key value of the first `list` step carrying a `key` predicate
///
/// Unlike [`parse`], any XPath is accepted: descendant steps, positional
/// and function predicates are skipped instead of rejected. Fails only on
/// unbalanced brackets or quotes.
pub fn list_key(path: &str, list: &str, key: &str) -> Result<Option<String>> {
    let rest = path.trim().trim_start_matches('/');
    for step in split_raw(rest, path)? {
        let (name_part, mut predicates) = match step.find('[') {
            Some(idx) => (&step[..idx], &step[idx..]),
            None => (step, ""),
        };
        let name = name_part
            .trim()
            .split_once(':')
            .map_or(name_part.trim(), |(_, local)| local);
        if name != list {
            continue;
        }

        while predicates.starts_with('[') {
            let end = closing_bracket(predicates, path)?;
            if let Ok((k, v)) = parse_predicate(&predicates[1..end], path) {
                if k == key {
                    return Ok(Some(v));
                }
            }
            predicates = &predicates[end + 1..];
        }
    }
    Ok(None)
}

fn split_steps<'a>(rest: &'a str, path: &str) -> Result<Vec<&'a str>> {
    let steps = split_raw(rest, path)?;
    if steps.iter().any(|s| s.trim().is_empty()) {
        return Err(BridgeError::invalid_path(
            path,
            "empty step (descendant axis is not supported)",
        ));
    }
    Ok(steps)
}

/// Split at top-level `/`, keeping empty steps
fn split_raw<'a>(rest: &'a str, path: &str) -> Result<Vec<&'a str>> {
    let mut steps = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in rest.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '[' => depth += 1,
                ']' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| BridgeError::invalid_path(path, "unbalanced ']'"))?;
                }
                '/' if depth == 0 => {
                    steps.push(&rest[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }

    if quote.is_some() {
        return Err(BridgeError::invalid_path(path, "unterminated quote"));
    }
    if depth != 0 {
        return Err(BridgeError::invalid_path(path, "unbalanced '['"));
    }
    steps.push(&rest[start..]);
    Ok(steps)
}

fn parse_step(step: &str, path: &str) -> Result<Segment> {
    let (name_part, mut rest) = match step.find('[') {
        Some(idx) => (&step[..idx], &step[idx..]),
        None => (step, ""),
    };

    let (module, name) = match name_part.trim().split_once(':') {
        Some((module, name)) => (Some(module), name),
        None => (None, name_part.trim()),
    };

    if let Some(module) = module {
        check_identifier(module, path)?;
    }
    if name != "*" && name != "." {
        check_identifier(name, path)?;
    }

    let mut predicates = Vec::new();
    while !rest.is_empty() {
        let end = closing_bracket(rest, path)?;
        predicates.push(parse_predicate(&rest[1..end], path)?);
        rest = &rest[end + 1..];
    }

    Ok(Segment {
        module: module.map(str::to_string),
        name: name.to_string(),
        predicates,
    })
}

/// Index of the `]` closing the predicate `rest` starts with
fn closing_bracket(rest: &str, path: &str) -> Result<usize> {
    if !rest.starts_with('[') {
        return Err(BridgeError::invalid_path(
            path,
            format!("unexpected text '{}' after step", rest),
        ));
    }

    let mut quote: Option<char> = None;
    for (i, c) in rest.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                ']' => return Ok(i),
                _ => {}
            },
        }
    }
    Err(BridgeError::invalid_path(path, "unbalanced '['"))
}

fn parse_predicate(inner: &str, path: &str) -> Result<(String, String)> {
    let (key, value) = inner.split_once('=').ok_or_else(|| {
        BridgeError::invalid_path(path, format!("unsupported predicate '[{}]'", inner))
    })?;

    let key = key.trim();
    let key = key.split_once(':').map_or(key, |(_, local)| local);
    check_identifier(key, path)?;

    let value = value.trim();
    let unquoted = ['\'', '"']
        .iter()
        .find_map(|q| {
            value
                .strip_prefix(*q)
                .and_then(|v| v.strip_suffix(*q))
                .filter(|v| !v.contains(*q))
        })
        .filter(|_| value.len() >= 2)
        .ok_or_else(|| {
            BridgeError::invalid_path(path, format!("predicate value {} is not quoted", value))
        })?;

    Ok((key.to_string(), unquoted.to_string()))
}

fn check_identifier(ident: &str, path: &str) -> Result<()> {
    let valid = !ident.is_empty()
        && ident
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(BridgeError::invalid_path(
            path,
            format!("invalid identifier '{}'", ident),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_path() {
        let segments = parse("/bbf-device-aggregation:devices/device").unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].module.as_deref(), Some("bbf-device-aggregation"));
        assert_eq!(segments[0].name, "devices");
        assert_eq!(segments[1].module, None);
        assert_eq!(segments[1].name, "device");
    }

    #[test]
    fn test_parse_predicates() {
        let segments = parse(
            "/ietf-hardware:hardware/component[name='olt/1'][class=\"it's\"]/serial-num",
        )
        .unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].predicate("name"), Some("olt/1"));
        assert_eq!(segments[1].predicate("class"), Some("it's"));
        assert_eq!(segments[2].name, "serial-num");
    }

    #[test]
    fn test_prefixed_predicate_key() {
        let segments = parse("/m:list[m:key = 'v']").unwrap();
        assert_eq!(segments[0].predicate("key"), Some("v"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("relative/path").is_err());
        assert!(parse("/a//b").is_err());
        assert!(parse("/a[name='x'").is_err());
        assert!(parse("/a[1]").is_err());
        assert!(parse("/a[name=x]").is_err());
        assert!(parse("/a b").is_err());
    }

    #[test]
    fn test_wildcard_step() {
        let segments = parse("/m:devices/device[name='d']/data/*").unwrap();
        assert!(segments[3].is_wildcard());
    }

    #[test]
    fn test_format_path() {
        let path = "/m:devices/device[name='dev-1']/type";
        assert_eq!(format_path(&parse(path).unwrap()), path);
        assert_eq!(format_path(&[]), "/");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("dev-1"), "'dev-1'");
        assert_eq!(quote("it's"), "\"it's\"");

        let path = format!("/m:devices/device[name={}]", quote("it's \"x\""));
        assert!(matches!(parse(&path), Err(BridgeError::InvalidPath { .. })));
        assert!(parse("/m:devices/device[name='it's']").is_err());
    }

    #[test]
    fn test_list_key() {
        let key = list_key(
            "/bbf-device-aggregation:devices/device[name='dev-1']/data",
            "device",
            "name",
        )
        .unwrap();
        assert_eq!(key.as_deref(), Some("dev-1"));

        let key = list_key("/bbf-device-aggregation:devices/device", "device", "name").unwrap();
        assert_eq!(key, None);
    }

    #[test]
    fn test_list_key_skips_unsupported_steps() {
        let key = list_key(
            "/bbf-device-aggregation:devices/device[name='dev-1']/data//.",
            "device",
            "name",
        )
        .unwrap();
        assert_eq!(key.as_deref(), Some("dev-1"));

        let key = list_key(
            "/bbf-device-aggregation:devices/device[1][name=\"dev-2\"]",
            "device",
            "name",
        )
        .unwrap();
        assert_eq!(key.as_deref(), Some("dev-2"));

        for path in [
            "/bbf-device-aggregation:devices//.",
            "/bbf-device-aggregation:devices/device[1]/data",
            "/bbf-device-aggregation:devices/device[starts-with(name, 'olt')]",
            "/bbf-device-aggregation:*",
        ] {
            assert_eq!(list_key(path, "device", "name").unwrap(), None, "{}", path);
        }

        assert!(list_key("/m:devices/device[name='x", "device", "name").is_err());
    }
}
