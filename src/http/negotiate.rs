//! Content negotiation over quality-value lists (RFC 2616, section 14).
//!
//! The same algorithm serves `Accept`, `Accept-Language`, `Accept-Encoding`
//! and friends. As an extension the server side may carry q-values too; the
//! two qualities of a matching pair are multiplied, so the server can bias
//! the choice. A wildcard is never returned as the result.
//!
//! ```
//! # use parley::http::negotiate::negotiate_str;
//! let chosen = negotiate_str("text/*;q=0.3, text/html;q=0.7", "text/html, text/plain");
//! assert_eq!(chosen, "text/html");
//! ```

use crate::http::qvalue::{MAX_QUALITY, QValue};

/// Picks the best value acceptable to both sides.
///
/// `theirs` is the client's list, `mine` the server's. Returns the chosen
/// `value(;attr)*`, or an empty string when there is nothing acceptable.
pub fn negotiate(theirs: &[QValue], mine: &[QValue]) -> String {
    if mine.is_empty() {
        tracing::debug!("negotiation without server preferences");
        return String::new();
    }

    if theirs.is_empty() {
        return mine
            .iter()
            .filter(|v| !v.has_wildcard())
            .max_by(|a, b| a.cmp_preference(b))
            .map(ToString::to_string)
            .unwrap_or_default();
    }

    let mut best: Option<QValue> = None;

    for a in theirs {
        for b in mine.iter().filter(|b| a.matches(b)) {
            // Keep the concrete side; the server's spelling wins a tie.
            let chosen = if b.has_wildcard() && !a.has_wildcard() { a } else { b };
            if chosen.has_wildcard() {
                continue;
            }

            let mut candidate = chosen.clone();
            candidate.quality =
                (u32::from(a.quality) * u32::from(b.quality) / u32::from(MAX_QUALITY)) as u16;

            let better = best
                .as_ref()
                .is_none_or(|current| candidate.cmp_preference(current).is_gt());
            if better {
                best = Some(candidate);
            }
        }
    }

    best.map(|v| v.to_string()).unwrap_or_default()
}

/// Splits a header value on `,` into trimmed, non-empty [`QValue`]s.
pub fn parse_list(header: &str) -> Vec<QValue> {
    header
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(QValue::parse)
        .collect()
}

/// [`negotiate`] over lists of raw tokens.
pub fn negotiate_tokens<S: AsRef<str>>(theirs: &[S], mine: &[S]) -> String {
    let parse = |list: &[S]| -> Vec<QValue> {
        list.iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .map(QValue::parse)
            .collect()
    };

    negotiate(&parse(theirs), &parse(mine))
}

/// [`negotiate`] over two comma-separated header values.
pub fn negotiate_str(theirs: &str, mine: &str) -> String {
    negotiate(&parse_list(theirs), &parse_list(mine))
}
