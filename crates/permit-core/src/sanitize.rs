//! HTML Sanitization
//!
//! Every user-supplied string that reaches a rendered page goes through
//! [`sanitize`] when its view model is built. Markup is removed (`script` and
//! `style` together with their content) and the remaining text is escaped for
//! both text and quoted-attribute positions, so templates may emit a
//! [`SafeText`] without further escaping.

use std::collections::HashSet;
use std::sync::LazyLock;

use serde::Serialize;

static CLEANER: LazyLock<ammonia::Builder<'static>> = LazyLock::new(|| {
    let mut builder = ammonia::Builder::empty();
    builder.clean_content_tags(HashSet::from(["script", "style"]));
    builder
});

/// Text that has been through [`sanitize`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SafeText(String);

impl SafeText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SafeText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip markup from `raw` and escape what is left
pub fn sanitize(raw: &str) -> SafeText {
    let cleaned = CLEANER.clean(raw).to_string();
    // ammonia escapes `&`, `<` and `>`; quotes stay literal in text nodes
    SafeText(cleaned.replace('"', "&quot;").replace('\'', "&#39;"))
}
