use std::borrow::Cow;

use tracing::warn;

use crate::decode::ENV_MARKER;

/// Replace each `$(NAME)` reference in `text` with `lookup(NAME)`.
///
/// References are expanded left to right. An unclosed `$(` or a variable the
/// lookup does not know stops expansion with a warning; the text from that
/// reference on is kept as is, so the value stays visibly unexpanded.
///
/// Substituted text is not scanned again: a variable whose value itself
/// contains `$(OTHER)` is inserted literally.
///
/// Takes a lookup closure so tests can pass synthetic data instead of
/// `std::env::var`.
pub fn expand_env_refs<'t>(text: &'t str, lookup: impl Fn(&str) -> Option<String>) -> Cow<'t, str> {
    if !text.contains(ENV_MARKER) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(ENV_MARKER) {
        let after = &rest[start + ENV_MARKER.len()..];
        let Some(close) = after.find(')') else {
            warn!(text, "no closing bracket for env variable");
            break;
        };
        let name = &after[..close];
        let Some(value) = lookup(name) else {
            warn!(text, variable = name, "env variable not set");
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}
