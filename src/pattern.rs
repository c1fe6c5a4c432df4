use crate::error::Error;

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use smallvec::SmallVec;

/// A `/`-delimited path template, e.g. `projects/[slug]/issues/[id]`.
///
/// A segment may embed one or more bracketed parameter tokens
/// (`report-[year]-[month]`). The empty pattern is the home route. A
/// pattern never carries a leading or trailing slash; all invariants are
/// enforced at construction.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RoutePattern(String);

enum Piece<'a> {
    Literal(&'a str),
    Param(&'a str),
}

type Pieces<'a> = SmallVec<[Piece<'a>; 4]>;

impl RoutePattern {
    pub fn parse(pattern: impl Into<String>) -> Result<Self, Error> {
        let pattern = pattern.into();
        if let Err(reason) = validate(&pattern) {
            return Err(Error::InvalidPattern { pattern, reason });
        }
        Ok(Self(pattern))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parameter names in left-to-right order, deduplicated: a token that
    /// appears twice names one logical parameter.
    pub fn param_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        if self.0.is_empty() {
            return names;
        }
        for segment in self.0.split('/') {
            if let Ok(pieces) = split_pieces(segment) {
                for piece in pieces {
                    if let Piece::Param(name) = piece {
                        if !names.iter().any(|n| n == name) {
                            names.push(name.to_owned());
                        }
                    }
                }
            }
        }
        names
    }

    pub(crate) fn compile(&self) -> Result<CompiledPattern, Error> {
        let mut source = String::with_capacity(self.0.len() + 16);
        let mut groups: Vec<String> = Vec::new();
        source.push('^');
        if !self.0.is_empty() {
            for (i, segment) in self.0.split('/').enumerate() {
                if i > 0 {
                    source.push('/');
                }
                let pieces = split_pieces(segment).map_err(|reason| Error::InvalidPattern {
                    pattern: self.0.clone(),
                    reason,
                })?;
                for piece in pieces {
                    match piece {
                        Piece::Literal(lit) => source.push_str(&regex::escape(lit)),
                        Piece::Param(name) => {
                            groups.push(name.to_owned());
                            source.push_str("([^/]+)");
                        }
                    }
                }
            }
        }
        source.push('$');
        let regex = Regex::new(&source).map_err(|_| Error::InvalidPattern {
            pattern: self.0.clone(),
            reason: "pattern does not compile to a matcher",
        })?;
        Ok(CompiledPattern { regex, groups })
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl FromStr for RoutePattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::parse(s)
    }
}

impl AsRef<str> for RoutePattern {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An anchored matcher plus the name of every capture group, in pattern
/// order (repeats preserved; the deduplicated view is
/// [`RoutePattern::param_names`]).
#[derive(Debug)]
pub(crate) struct CompiledPattern {
    regex: Regex,
    groups: Vec<String>,
}

impl CompiledPattern {
    pub(crate) fn match_path(&self, path: &str) -> Option<Vec<(String, String)>> {
        let caps = self.regex.captures(path)?;
        let mut out = Vec::with_capacity(self.groups.len());
        for (i, name) in self.groups.iter().enumerate() {
            let value = caps.get(i + 1)?.as_str().to_owned();
            out.push((name.clone(), value));
        }
        Some(out)
    }
}

fn validate(pattern: &str) -> Result<(), &'static str> {
    if pattern.is_empty() {
        return Ok(());
    }
    if pattern.chars().any(char::is_whitespace) {
        return Err("whitespace is not allowed in a pattern");
    }
    if pattern.starts_with('/') || pattern.ends_with('/') {
        return Err("a pattern can not start or end with '/'");
    }
    for segment in pattern.split('/') {
        if segment.is_empty() {
            return Err("a pattern can not contain empty segments");
        }
        split_pieces(segment)?;
    }
    Ok(())
}

fn split_pieces(segment: &str) -> Result<Pieces<'_>, &'static str> {
    let mut pieces = Pieces::new();
    let mut rest = segment;
    while let Some(open) = rest.find('[') {
        let literal = &rest[..open];
        if literal.contains(']') {
            return Err("']' without a matching '['");
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        let tail = &rest[open + 1..];
        let close = match tail.find(']') {
            Some(i) => i,
            None => return Err("unterminated parameter token"),
        };
        let name = &tail[..close];
        if !valid_param_name(name) {
            return Err("parameter names must match [A-Za-z_]\\w*");
        }
        pieces.push(Piece::Param(name));
        rest = &tail[close + 1..];
    }
    if rest.contains(']') {
        return Err("']' without a matching '['");
    }
    if !rest.is_empty() {
        pieces.push(Piece::Literal(rest));
    }
    Ok(pieces)
}

fn valid_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_rejects_malformed_input() {
        let cases: &[&str] = &[
            "/leading",
            "trailing/",
            "a//b",
            "a b",
            "users/[id",
            "users/id]",
            "users/[1id]",
            "users/[]",
            "users/[id-x]",
        ];
        for &pattern in cases {
            let err = RoutePattern::parse(pattern).unwrap_err();
            match err {
                Error::InvalidPattern { pattern: p, .. } => assert_eq!(p, pattern),
                other => panic!("unexpected error for {:?}: {}", pattern, other),
            }
        }
    }

    #[test]
    fn pattern_accepts_home_route() {
        let home = RoutePattern::parse("").unwrap();
        let compiled = home.compile().unwrap();
        assert!(compiled.match_path("").is_some());
        assert!(compiled.match_path("x").is_none());
    }

    #[test]
    fn compile_matches_and_extracts() {
        let cases: &[(&str, &str, &[(&str, &str)])] = &[
            ("about", "about", &[]),
            ("users/[id]", "users/42", &[("id", "42")]),
            (
                "report-[year]-[month]",
                "report-2025-06",
                &[("year", "2025"), ("month", "06")],
            ),
            (
                "docs/v[major].[minor]",
                "docs/v1.12",
                &[("major", "1"), ("minor", "12")],
            ),
        ];
        for &(pattern, path, expected) in cases {
            let compiled = RoutePattern::parse(pattern).unwrap().compile().unwrap();
            let caps = compiled.match_path(path).unwrap();
            let caps: Vec<(&str, &str)> = caps
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            assert_eq!(&caps, expected, "pattern = {:?}", pattern);
        }
    }

    #[test]
    fn compile_escapes_literals() {
        let compiled = RoutePattern::parse("files/a.b").unwrap().compile().unwrap();
        assert!(compiled.match_path("files/a.b").is_some());
        assert!(compiled.match_path("files/axb").is_none());
    }

    #[test]
    fn captures_never_cross_segments() {
        let compiled = RoutePattern::parse("u/[id]").unwrap().compile().unwrap();
        assert!(compiled.match_path("u/1/2").is_none());
    }

    #[test]
    fn repeated_token_names_one_parameter() {
        let pattern = RoutePattern::parse("report/[year]/summary-[year]").unwrap();
        assert_eq!(pattern.param_names(), vec!["year".to_owned()]);
    }
}
