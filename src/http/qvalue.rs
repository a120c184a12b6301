//! Quality-tagged values, as found in `Accept`-family headers.
//!
//! A header like `Accept: text/html;level=1;q=0.7, */*;q=0.1` is a list of
//! [`QValue`]s. Each carries a value, optional attributes, a quality in
//! thousandths and optional accept-extensions.
//!
//! Two relations are defined on them and they are deliberately kept apart:
//!
//! - [`QValue::cmp_preference`] is a total order from least to most
//!   preferred. Quality comes first; ties go to the more specific value.
//! - [`QValue::matches`] decides whether two values name the same thing,
//!   honouring `*` wildcards and ignoring quality. It is not transitive, so
//!   `QValue` does not implement `PartialEq`.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Highest quality, i.e. `q=1`.
pub const MAX_QUALITY: u16 = 1000;

#[derive(Debug, Clone)]
pub struct QValue {
    /// The main value, e.g. a MIME type or a language tag.
    pub value: String,
    /// Parameters before the quality, e.g. `level=1` in `text/html;level=1`.
    pub attributes: BTreeSet<String>,
    /// Parameters after the quality. Order and duplicates are not preserved.
    pub extensions: BTreeSet<String>,
    /// Quality in thousandths, `0..=1000`.
    pub quality: u16,
}

/// What a value looks like once split on `/`.
#[derive(Debug, PartialEq, Eq)]
enum Shape<'a> {
    Empty,
    /// No `/`; sub-tags separated by `-`, as in `en-GB`.
    Tag(Vec<&'a str>),
    /// `type/subtype`.
    Range { major: &'a str, minor: &'a str },
    /// Three or more `/` components.
    Opaque(usize),
}

impl<'a> Shape<'a> {
    fn of(value: &'a str) -> Self {
        let parts: Vec<&str> = components(value).collect();
        match *parts.as_slice() {
            [] => Shape::Empty,
            [tag] => Shape::Tag(tag.split('-').collect()),
            [major, minor] => Shape::Range { major, minor },
            _ => Shape::Opaque(parts.len()),
        }
    }

    fn arity(&self) -> usize {
        match self {
            Shape::Empty => 0,
            Shape::Tag(_) => 1,
            Shape::Range { .. } => 2,
            Shape::Opaque(n) => *n,
        }
    }
}

fn components(value: &str) -> impl Iterator<Item = &str> {
    let empty = value.is_empty();
    value.split('/').filter(move |_| !empty)
}

impl QValue {
    /// Parses one list element of the form `value(;attr)*(;q=D.DDD)?(;ext)*`.
    pub fn parse(raw: &str) -> Self {
        let mut segments = raw.split(';').map(str::trim);
        let value = segments.next().unwrap_or_default().to_string();

        let mut attributes = BTreeSet::new();
        let mut extensions = BTreeSet::new();
        let mut quality = None;

        for segment in segments.filter(|s| !s.is_empty()) {
            if quality.is_some() {
                extensions.insert(segment.to_string());
            } else if let Some(q) = parse_quality(segment) {
                quality = Some(q);
            } else {
                attributes.insert(segment.to_string());
            }
        }

        Self {
            value,
            attributes,
            extensions,
            quality: quality.unwrap_or(MAX_QUALITY).min(MAX_QUALITY),
        }
    }

    /// True if any `/` component of the value is `*`.
    pub fn has_wildcard(&self) -> bool {
        components(&self.value).any(|c| c == "*")
    }

    /// Whether `self` and `other` name the same thing.
    ///
    /// Identical values with identical attributes always match. Otherwise
    /// exactly one side must carry a wildcard, both must have the same number
    /// of `/` components, and each component must be equal or `*` on either
    /// side. Attributes are ignored for wildcard matches.
    pub fn matches(&self, other: &QValue) -> bool {
        if self.value == other.value && self.attributes == other.attributes {
            return true;
        }

        if self.has_wildcard() == other.has_wildcard() {
            return false;
        }

        let a: Vec<&str> = components(&self.value).collect();
        let b: Vec<&str> = components(&other.value).collect();

        !a.is_empty()
            && a.len() == b.len()
            && a.iter()
                .zip(&b)
                .all(|(x, y)| x == y || *x == "*" || *y == "*")
    }

    /// Orders from least to most preferred.
    pub fn cmp_preference(&self, other: &QValue) -> Ordering {
        self.quality
            .cmp(&other.quality)
            .then_with(|| self.cmp_specificity(other))
    }

    fn cmp_specificity(&self, other: &QValue) -> Ordering {
        if self.value == other.value {
            let by_attributes = self.attributes.len().cmp(&other.attributes.len());
            if by_attributes.is_ne() {
                return by_attributes;
            }
        }

        let a = Shape::of(&self.value);
        let b = Shape::of(&other.value);

        let by_shape = match (&a, &b) {
            (Shape::Range { major: ma, minor: na }, Shape::Range { major: mb, minor: nb }) => {
                // `*/*` (and any `*/x`) sits below every concrete major type;
                // `type/*` sits below `type/subtype`.
                (*ma != "*")
                    .cmp(&(*mb != "*"))
                    .then_with(|| {
                        if ma == mb {
                            (*na != "*").cmp(&(*nb != "*"))
                        } else {
                            Ordering::Equal
                        }
                    })
            }
            (Shape::Tag(ta), Shape::Tag(tb)) => ta.cmp(tb),
            _ => a.arity().cmp(&b.arity()),
        };

        by_shape.then_with(|| self.to_string().cmp(&other.to_string()))
    }

    /// Like the `Display` form, but with the quality and extensions appended.
    pub fn full(&self) -> String {
        let mut rv = self.to_string();
        if !rv.is_empty() {
            rv.push_str(&format!(";q={}", f64::from(self.quality) / 1000.0));
            for ext in &self.extensions {
                rv.push(';');
                rv.push_str(ext);
            }
        }
        rv
    }
}

impl fmt::Display for QValue {
    /// Writes `value(;attribute)*`, attributes sorted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)?;
        if !self.value.is_empty() {
            for attr in &self.attributes {
                write!(f, ";{attr}")?;
            }
        }
        Ok(())
    }
}

/// Scans `q WS* = WS* [01] ( "." DIGIT{0,3} )?` and returns thousandths.
fn parse_quality(segment: &str) -> Option<u16> {
    let rest = segment.strip_prefix('q')?.trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();

    let mut chars = rest.chars();
    let whole = match chars.next()? {
        '0' => 0,
        '1' => 1,
        _ => return None,
    };

    let fraction = chars.as_str();
    let digits = match fraction.strip_prefix('.') {
        Some(d) => d,
        None if fraction.is_empty() => "",
        None => return None,
    };
    if digits.len() > 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let thousandths = digits
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(3)
        .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'));

    Some(whole * MAX_QUALITY + thousandths)
}
