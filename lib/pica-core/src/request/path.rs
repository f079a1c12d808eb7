use std::collections::BTreeSet;
use std::sync::LazyLock;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::model::Query;
use crate::scope::Scope;
use crate::{PicaError, ScriptValue, coerce};

/// Regular expression for matching template placeholders in the format `{name}`.
static RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<name>\w+)}").expect("a valid regex"));

/// A URL after template resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    /// The absolute target URL.
    pub url: Url,
    /// The query parameters found in the URL, in order.
    pub query: Query,
}

/// Turns a URL template into an absolute URL using the scope bindings.
pub trait UrlResolver: Send + Sync {
    /// Resolves `url` (base URL already prefixed) against the scope.
    ///
    /// # Errors
    ///
    /// Fails when a placeholder is not bound or the result is not an absolute URL.
    fn resolve(&self, url: &str, scope: &dyn Scope) -> Result<ResolvedUrl, PicaError>;
}

/// Default resolver: substitutes `{name}` placeholders with scope bindings.
///
/// Substituted values are percent-encoded, the query pairs of the resulting
/// URL are decoded back into the [`Query`].
///
/// ```rust
/// use pica_core::{RuntimeScope, TemplateResolver, UrlResolver};
///
/// # fn example() -> Result<(), pica_core::PicaError> {
/// let scope = RuntimeScope::new().bind("id", 42).bind("page", "2");
/// let resolved = TemplateResolver.resolve("http://localhost/users/{id}?page={page}", &scope)?;
///
/// assert_eq!(resolved.url.as_str(), "http://localhost/users/42?page=2");
/// assert_eq!(resolved.query.get("page").map(String::as_str), Some("2"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateResolver;

impl UrlResolver for TemplateResolver {
    fn resolve(&self, url: &str, scope: &dyn Scope) -> Result<ResolvedUrl, PicaError> {
        let names = RE
            .captures_iter(url)
            .filter_map(|caps| caps.name("name"))
            .map(|name| name.as_str().to_string())
            .collect::<BTreeSet<_>>();

        let mut resolved = url.to_string();
        let mut missings = Vec::new();
        for name in names {
            let value = match scope.lookup(&name) {
                Some(value @ (ScriptValue::Integer(_) | ScriptValue::Text(_))) => coerce(&value),
                Some(other) => {
                    return Err(PicaError::MalformedScope {
                        name,
                        expected: "int or string",
                        kind: other.kind(),
                    });
                }
                None => {
                    missings.push(name);
                    continue;
                }
            };
            let encoded = utf8_percent_encode(&value, NON_ALPHANUMERIC).to_string();
            resolved = replace_placeholder(&resolved, &name, &encoded);
        }

        if !missings.is_empty() {
            return Err(PicaError::PathUnresolved {
                path: url.to_string(),
                missings,
            });
        }

        let url = resolved.parse::<Url>()?;
        let query = url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect::<Query>();
        debug!(%url, ?query, "url resolved");

        Ok(ResolvedUrl { url, query })
    }
}

fn replace_placeholder(template: &str, name: &str, value: &str) -> String {
    let pattern = ["{", name, "}"].concat();
    template.replace(&pattern, value)
}
