#![forbid(unsafe_code)]

//! The route seam between the navigation core and the host UI framework.
//!
//! A [`Route`] is an immutable descriptor of one navigable destination:
//! a stable identity, a declared default [`TransitionStyle`], and a
//! zero-argument capability to produce the destination's renderable
//! content. The core never inspects the produced content beyond passing
//! it through to the render surface.
//!
//! # Invariants
//!
//! 1. `id()` is stable for the lifetime of a route value; equality of
//!    interest is equality of ids.
//! 2. `body()` may be called any number of times; each call produces a
//!    fresh renderable.
//! 3. `content_description()` describes the *rendered content*, not the
//!    route value; it is only consumed by [`comparison_key`] when matching
//!    pop-to-route targets.

use crate::transition::TransitionStyle;

/// An immutable descriptor of one navigable destination.
///
/// `Body` is the host framework's renderable type; the core treats it as
/// opaque. Routes are cheap to clone — implementations typically are
/// small enums or id-carrying structs.
pub trait Route: Clone {
    /// The opaque renderable produced for this destination.
    type Body;

    /// Stable identity for this destination.
    fn id(&self) -> String;

    /// The transition style this route declares as its default. Callers
    /// may override it per navigation.
    fn style(&self) -> TransitionStyle;

    /// Produce the renderable content for this destination.
    fn body(&self) -> Self::Body;

    /// Stringified description of the rendered content, consumed by
    /// pop-to-route matching. Conventionally the content type name, with
    /// an optional `id: "<value>"` token when instances of one type must
    /// be distinguished (see [`comparison_key`]).
    fn content_description(&self) -> String;
}

/// Reduce a content description to its comparison key.
///
/// Exact rule, kept behavior-compatible with the structural matching this
/// core inherited (fragile by design, see the repository design notes):
///
/// 1. If the description contains an `id: "<value>"` token with a
///    non-empty value, that value *is* the key.
/// 2. Otherwise every parenthesized group — including nested groups,
///    removed innermost-first — is stripped and the remainder is the key.
///
/// The pop-to-route *target* is compared against this key verbatim; no
/// stripping is applied to the target side.
#[must_use]
pub fn comparison_key(description: &str) -> String {
    if let Some(identity) = extract_identity(description) {
        return identity;
    }
    strip_parenthesized(description)
}

/// Extract the first non-empty `id: "<value>"` token.
fn extract_identity(description: &str) -> Option<String> {
    const MARKER: &str = "id: \"";
    let mut search = description;
    while let Some(pos) = search.find(MARKER) {
        let rest = &search[pos + MARKER.len()..];
        match rest.find('"') {
            // Empty capture; keep scanning for a later token.
            Some(0) => search = rest,
            Some(end) => return Some(rest[..end].to_string()),
            None => return None,
        }
    }
    None
}

/// Remove every parenthesized group, innermost-first, until none remain.
/// Unbalanced parentheses are left in place.
fn strip_parenthesized(description: &str) -> String {
    let mut out = description.to_string();
    loop {
        let mut open: Option<usize> = None;
        let mut innermost: Option<(usize, usize)> = None;
        for (i, ch) in out.char_indices() {
            match ch {
                '(' => open = Some(i),
                ')' => {
                    if let Some(o) = open {
                        innermost = Some((o, i));
                        break;
                    }
                }
                _ => {}
            }
        }
        match innermost {
            Some((o, c)) => out.replace_range(o..=c, ""),
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_passes_through() {
        assert_eq!(comparison_key("ActionListView"), "ActionListView");
    }

    #[test]
    fn single_group_is_stripped() {
        assert_eq!(comparison_key("DetailView(title: First)"), "DetailView");
    }

    #[test]
    fn nested_groups_are_stripped_innermost_first() {
        assert_eq!(
            comparison_key("Wrapper(Inner(leaf), other)Tail(x)"),
            "WrapperTail"
        );
    }

    #[test]
    fn identity_token_wins_over_stripping() {
        assert_eq!(
            comparison_key("DetailView(id: \"detail-42\", title: First)"),
            "detail-42"
        );
    }

    #[test]
    fn empty_identity_token_is_skipped() {
        assert_eq!(
            comparison_key("View(id: \"\" id: \"real\")"),
            "real"
        );
    }

    #[test]
    fn unterminated_identity_token_falls_back_to_stripping() {
        // No closing quote: the token rule cannot match, paren stripping
        // still applies to balanced groups.
        assert_eq!(comparison_key("View(tag)id: \"broken"), "Viewid: \"broken");
    }

    #[test]
    fn unbalanced_parens_are_left_alone() {
        assert_eq!(comparison_key("a)b(c)"), "a)b");
        assert_eq!(comparison_key("a(b"), "a(b");
    }

    #[test]
    fn empty_description() {
        assert_eq!(comparison_key(""), "");
    }
}
