use std::fmt;

use headers::HeaderMapExt;
use http::{HeaderMap, Method};
use tracing::debug;
use url::Url;

use crate::PicaError;
use crate::model::ApiRequest;
use crate::scope::{ParameterBag, Scope, ScopeExt};

pub mod body;
use self::body::{BodyEncoding, EncodedBody};

mod path;
pub use self::path::{ResolvedUrl, TemplateResolver, UrlResolver};

/// A fully materialized request, ready to be sent by the [`HttpClient`](crate::HttpClient).
#[derive(Clone, derive_more::Debug)]
pub struct PreparedRequest {
    /// The HTTP method.
    pub method: Method,
    /// The resolved absolute URL.
    pub url: Url,
    /// Declared headers, with encoding-mandated overrides applied.
    pub headers: HeaderMap,
    /// The encoded body, empty for `GET`.
    #[debug(ignore)]
    pub body: Vec<u8>,
}

/// Materializes [`ApiRequest`]s against a runtime [`Scope`].
///
/// The body encoding is selected from the declared `Content-Type`:
///
/// | Content-Type                        | Encoding                          |
/// |-------------------------------------|-----------------------------------|
/// | `application/x-www-form-urlencoded` | [`body::FormUrlEncodedEncoder`]   |
/// | `multipart/form-data`               | [`body::MultipartEncoder`]        |
/// | `application/json`                  | [`body::JsonEncoder`]             |
///
/// A `GET` request never has a body: its URL is resolved and any content
/// type is accepted. Any other method with another content type fails with
/// [`PicaError::UnsupportedContentType`].
///
/// ```rust
/// use http::Method;
/// use pica_core::{ApiRequest, RequestBuilder, RuntimeScope};
///
/// # fn example() -> Result<(), pica_core::PicaError> {
/// let scope = RuntimeScope::new()
///     .bind("baseUrl", "http://localhost:8080")
///     .with_params("POST", [("name", "alice")]);
/// let mut request = ApiRequest::new(Method::POST, "/api/users")
///     .add_header("Content-Type", "application/json")?;
///
/// let prepared = RequestBuilder::default().build(&mut request, &scope)?;
///
/// assert_eq!(prepared.url.as_str(), "http://localhost:8080/api/users");
/// assert_eq!(prepared.body, br#"{"name":"alice"}"#);
/// # Ok(())
/// # }
/// ```
pub struct RequestBuilder {
    resolver: Box<dyn UrlResolver>,
}

impl RequestBuilder {
    /// Creates a builder resolving URLs with the given resolver.
    pub fn new(resolver: impl UrlResolver + 'static) -> Self {
        Self {
            resolver: Box::new(resolver),
        }
    }

    /// Resolves the URL and encodes the body of `request`.
    ///
    /// On success the request `query` and `body` are updated and the prepared
    /// request is returned. On failure the request is left untouched.
    ///
    /// # Errors
    ///
    /// Fails when the content type has no encoder, when the scope parameter bag
    /// is malformed, when the URL cannot be resolved, or when encoding fails.
    pub fn build(
        &self,
        request: &mut ApiRequest,
        scope: &dyn Scope,
    ) -> Result<PreparedRequest, PicaError> {
        let method = request.method.clone();
        let content_type = request.content_type().unwrap_or_default();
        let encoding = BodyEncoding::from_content_type(content_type);

        let body = match encoding {
            _ if method == Method::GET => EncodedBody::empty(),
            Some(encoding) => {
                let params = scope.method_params(method.as_str())?.unwrap_or_default();
                encode(encoding, &params)?
            }
            None => {
                return Err(PicaError::UnsupportedContentType {
                    content_type: content_type.to_string(),
                    method: method.to_string(),
                });
            }
        };

        let target = format!("{}{}", scope.base_url()?, request.url);
        let ResolvedUrl { url, query } = self.resolver.resolve(&target, scope)?;

        let mut headers = request.headers.clone();
        if let Some(content_type) = body.content_type {
            headers.typed_insert(content_type);
        }

        request.query = query;
        request.body = body.data;
        debug!(%method, %url, body_len = request.body.len(), "request built");

        Ok(PreparedRequest {
            method,
            url,
            headers,
            body: request.body.clone(),
        })
    }
}

fn encode(encoding: BodyEncoding, params: &ParameterBag) -> Result<EncodedBody, PicaError> {
    debug!(?encoding, params = params.len(), "encoding body");
    encoding.encode(params)
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(TemplateResolver)
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use http::header::CONTENT_TYPE;
    use indexmap::IndexMap;

    use super::*;
    use crate::model::Query;
    use crate::{RuntimeScope, ScriptValue};

    const BASE_URL: &str = "http://localhost:8080";

    fn request(method: Method, content_type: &str) -> ApiRequest {
        ApiRequest::new(method, "/api/users")
            .add_header("Content-Type", content_type)
            .expect("valid header")
    }

    fn scope() -> RuntimeScope {
        RuntimeScope::new().bind("baseUrl", BASE_URL)
    }

    #[test]
    fn test_get_has_empty_body_for_every_content_type() {
        for content_type in [
            "application/x-www-form-urlencoded",
            "multipart/form-data",
            "application/json",
            "text/plain",
        ] {
            let mut request = request(Method::GET, content_type);

            let prepared = RequestBuilder::default()
                .build(&mut request, &scope())
                .expect("should build");

            assert!(prepared.body.is_empty(), "{content_type}");
            assert!(request.body.is_empty(), "{content_type}");
            assert_eq!(prepared.url.as_str(), "http://localhost:8080/api/users");
        }
    }

    #[test]
    fn test_get_without_content_type() {
        let mut request = ApiRequest::new(Method::GET, "/api/users?page={page}");
        let scope = scope().bind("page", 2);

        let prepared = RequestBuilder::default()
            .build(&mut request, &scope)
            .expect("should build");

        assert_eq!(prepared.url.as_str(), "http://localhost:8080/api/users?page=2");
        assert_eq!(request.query, Query::from_iter([("page", "2")]));
    }

    #[test]
    fn test_post_json() {
        let mut request = request(Method::POST, "application/json");
        let scope = scope().with_params(
            "post",
            [("name", ScriptValue::from("alice")), ("age", 30.into())],
        );

        let prepared = RequestBuilder::default()
            .build(&mut request, &scope)
            .expect("should build");

        let body = serde_json::from_slice::<serde_json::Value>(&prepared.body).expect("json");
        assert_eq!(body, serde_json::json!({ "age": 30, "name": "alice" }));
        assert_eq!(request.body, prepared.body);
        assert_eq!(
            prepared.headers.get(CONTENT_TYPE).map(|value| value.as_bytes()),
            Some(&b"application/json"[..])
        );
    }

    #[test]
    fn test_post_form() {
        let mut request = request(Method::POST, "application/x-www-form-urlencoded");
        let scope = scope().with_params("post", [("a", "1"), ("b", "x y")]);

        let prepared = RequestBuilder::default()
            .build(&mut request, &scope)
            .expect("should build");

        let form = serde_urlencoded::from_bytes::<IndexMap<String, String>>(&prepared.body)
            .expect("form");
        assert_eq!(form.get("a").map(String::as_str), Some("1"));
        assert_eq!(form.get("b").map(String::as_str), Some("x y"));
    }

    #[test]
    fn test_post_multipart_overrides_content_type() {
        let dir = std::env::temp_dir().join(format!("pica-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("f.txt");
        fs::write(&path, "file content").expect("temp file");

        let mut request = request(Method::PUT, "multipart/form-data");
        let scope = scope().with_params(
            "put",
            [
                ("title", ScriptValue::from("report")),
                ("file", format!("@{}", path.display()).into()),
            ],
        );

        let prepared = RequestBuilder::default()
            .build(&mut request, &scope)
            .expect("should build");
        let _ = fs::remove_dir_all(&dir);

        let content_type = prepared
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .expect("content type");
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .expect("boundary");
        let body = String::from_utf8(prepared.body).expect("utf-8");
        assert!(body.contains("name=\"title\"\r\n\r\nreport\r\n"));
        assert!(body.contains("name=\"file\"; filename=\"f.txt\""));
        assert!(body.contains("\r\n\r\nfile content\r\n"));
        assert!(body.ends_with(&format!("--{boundary}--\r\n")));
        assert_eq!(
            request.content_type(),
            Some("multipart/form-data"),
            "the declared header is left untouched"
        );
    }

    #[test]
    fn test_post_without_bag_is_empty() {
        let mut request = request(Method::POST, "application/json");

        let prepared = RequestBuilder::default()
            .build(&mut request, &scope())
            .expect("should build");

        assert_eq!(prepared.body, b"{}");
    }

    #[test]
    fn test_unsupported_content_type() {
        let mut request = request(Method::POST, "text/plain");

        let error = RequestBuilder::default()
            .build(&mut request, &scope())
            .expect_err("should fail");

        insta::assert_snapshot!(error, @"Unsupported content type 'text/plain' for POST request");
    }

    #[test]
    fn test_missing_content_type_for_delete() {
        let mut request = ApiRequest::new(Method::DELETE, "/api/users/1");

        let result = RequestBuilder::default().build(&mut request, &scope());

        assert!(matches!(
            result,
            Err(PicaError::UnsupportedContentType { ref content_type, .. }) if content_type.is_empty()
        ));
    }

    #[test]
    fn test_malformed_bag() {
        let mut request = request(Method::PATCH, "application/json");
        let scope = scope().bind("patch", "not a map");

        let result = RequestBuilder::default().build(&mut request, &scope);

        assert!(matches!(result, Err(PicaError::MalformedScope { .. })));
    }

    #[test]
    fn test_failure_leaves_request_untouched() {
        let mut request = ApiRequest::new(Method::POST, "/api/users/{id}")
            .add_header("Content-Type", "application/json")
            .expect("valid header");
        let scope = scope().with_params("post", [("name", "alice")]);

        let result = RequestBuilder::default().build(&mut request, &scope);

        assert!(matches!(result, Err(PicaError::PathUnresolved { .. })));
        assert!(request.body.is_empty());
        assert!(request.query.is_empty());
    }

    #[test]
    fn test_custom_resolver() {
        struct Fixed;

        impl UrlResolver for Fixed {
            fn resolve(&self, _url: &str, _scope: &dyn Scope) -> Result<ResolvedUrl, PicaError> {
                Ok(ResolvedUrl {
                    url: "http://example.com/fixed?x=1".parse()?,
                    query: Query::from_iter([("x", "1")]),
                })
            }
        }

        let mut request = request(Method::GET, "application/json");

        let prepared = RequestBuilder::new(Fixed)
            .build(&mut request, &RuntimeScope::new())
            .expect("should build");

        assert_eq!(prepared.url.as_str(), "http://example.com/fixed?x=1");
        assert_eq!(request.query, Query::from_iter([("x", "1")]));
    }
}
