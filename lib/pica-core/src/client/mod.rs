use std::time::Duration;

use http::{HeaderMap, Method};
use reqwest::{Body, Request, Response};
use tracing::debug;
use url::Url;

use crate::PicaError;
use crate::model::ApiRequest;
use crate::request::PreparedRequest;

mod output;
use self::output::{print_headers, print_status};

/// Sends requests over the network and logs what goes through.
///
/// Each call logs the outgoing headers, then the status line (green for
/// `200`, red otherwise) and the response headers. Transport errors are
/// returned as they are, there is no retry.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
///
/// use http::Method;
/// use pica_core::{ApiRequest, HttpClient};
///
/// # async fn example() -> Result<(), pica_core::PicaError> {
/// let client = HttpClient::new("http://localhost:8080").with_timeout(Duration::from_secs(5));
///
/// let request = ApiRequest::new(Method::GET, "/api/users");
/// let response = client.execute(&request).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpClient {
    /// Creates a client prefixing request URLs with `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Uses a preconfigured reqwest client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Bounds every request, connection and body download included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends an [`ApiRequest`] as declared.
    ///
    /// The target is the base URL concatenated with the request URL, without
    /// any template resolution. The body is only sent for `POST`, `PATCH` and
    /// `PUT`.
    ///
    /// # Errors
    ///
    /// Fails when the target is not a valid URL, or on transport errors.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Response, PicaError> {
        let url = format!("{}{}", self.base_url, request.url).parse::<Url>()?;

        let request = self.build_request(
            request.method.clone(),
            url,
            &request.headers,
            request.body.clone(),
        );
        self.dispatch(request).await
    }

    /// Sends a request materialized by the [`RequestBuilder`](crate::RequestBuilder).
    ///
    /// Like [`HttpClient::execute`], the body is dropped for methods other
    /// than `POST`, `PATCH` and `PUT`.
    ///
    /// # Errors
    ///
    /// Fails on transport errors.
    pub async fn send(&self, prepared: PreparedRequest) -> Result<Response, PicaError> {
        let PreparedRequest {
            method,
            url,
            headers,
            body,
        } = prepared;

        let request = self.build_request(method, url, &headers, body);
        self.dispatch(request).await
    }

    fn build_request(
        &self,
        method: Method,
        url: Url,
        headers: &HeaderMap,
        body: Vec<u8>,
    ) -> Request {
        let with_body = carries_body(&method) && !body.is_empty();
        let mut request = Request::new(method, url);
        *request.headers_mut() = headers.clone();
        if with_body {
            *request.body_mut() = Some(Body::from(body));
        }
        if let Some(timeout) = self.timeout {
            *request.timeout_mut() = Some(timeout);
        }
        request
    }

    async fn dispatch(&self, request: Request) -> Result<Response, PicaError> {
        print_headers(request.headers());

        debug!(?request, "sending...");
        let response = self.client.execute(request).await?;
        debug!(?response, "...receiving");

        print_status(response.status());
        print_headers(response.headers());

        Ok(response)
    }
}

/// Whether requests with this method are sent with their body.
fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PATCH | Method::PUT)
}
