use http::{HeaderMap, Method, StatusCode};
use indexmap::IndexMap;

use crate::PicaError;

/// Query parameters extracted while resolving a request URL, in URL order.
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_more::Deref, derive_more::DerefMut)]
pub struct Query(IndexMap<String, String>);

impl Query {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// The declarative description of one HTTP call.
///
/// `query` and `body` are not set by the author of the description: they are
/// written by [`RequestBuilder::build`](crate::RequestBuilder::build) once
/// the URL is resolved and the body encoded.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// The HTTP method.
    pub method: Method,
    /// The URL template, appended to the base URL.
    pub url: String,
    /// Declared headers, case-insensitive and multi-valued.
    pub headers: HeaderMap,
    /// Query parameters found while resolving the URL.
    pub query: Query,
    /// A short human name.
    pub name: String,
    /// A longer description.
    pub description: String,
    /// The encoded body.
    pub body: Vec<u8>,
}

impl ApiRequest {
    /// Creates a request without headers.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            query: Query::default(),
            name: String::new(),
            description: String::new(),
            body: Vec::new(),
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replaces the headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Appends a header value, existing values for the same name are kept.
    ///
    /// # Errors
    ///
    /// Fails when the name or the value is not a valid HTTP header.
    pub fn add_header(mut self, name: &str, value: &str) -> Result<Self, PicaError> {
        let name = http::HeaderName::from_bytes(name.as_bytes())?;
        let value = http::HeaderValue::from_str(value)?;
        self.headers.append(name, value);
        Ok(self)
    }

    /// Adds the `defaults` headers this request does not declare.
    ///
    /// A declared name hides every default value for that name, a missing
    /// one gets all of them.
    pub fn fill_headers(&mut self, defaults: &HeaderMap) {
        let missing = defaults
            .keys()
            .filter(|name| !self.headers.contains_key(*name))
            .cloned()
            .collect::<Vec<_>>();
        for name in missing {
            for value in defaults.get_all(&name) {
                self.headers.append(name.clone(), value.clone());
            }
        }
    }

    /// The first declared `Content-Type` value, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }
}

/// The outcome of one executed [`ApiRequest`].
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: Vec<u8>,
    /// Status code.
    pub status: StatusCode,
}

impl ApiResponse {
    /// Reads the whole response.
    ///
    /// # Errors
    ///
    /// Fails when the body cannot be read from the connection.
    pub async fn read(response: reqwest::Response) -> Result<Self, PicaError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(Self {
            headers,
            body,
            status,
        })
    }

    /// The body as UTF-8 text, invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A named, replayable test case: a request and its latest response.
#[derive(Debug, Clone)]
pub struct ApiItem {
    /// The request description.
    pub request: ApiRequest,
    /// The last response, if the item was run.
    pub response: Option<ApiResponse>,
}

impl ApiItem {
    /// Creates an item that has not been run yet.
    pub fn new(request: ApiRequest) -> Self {
        Self {
            request,
            response: None,
        }
    }
}

impl From<ApiRequest> for ApiItem {
    fn from(request: ApiRequest) -> Self {
        Self::new(request)
    }
}

/// A test suite: metadata, suite-wide headers and its items.
#[derive(Debug, Clone, Default)]
pub struct PicaContext {
    /// Suite name.
    pub name: String,
    /// Suite description.
    pub description: String,
    /// Suite author.
    pub author: String,
    /// Version of the API under test.
    pub version: String,
    /// Headers added to every item that does not declare them.
    pub headers: HeaderMap,
    /// The items, in declaration order.
    pub api_items: Vec<ApiItem>,
}

impl PicaContext {
    /// Adds an item, filling the headers it does not declare from the suite headers.
    pub fn push(&mut self, mut request: ApiRequest) {
        request.fill_headers(&self.headers);
        self.api_items.push(ApiItem::new(request));
    }
}
