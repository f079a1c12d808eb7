use tracing::{info, instrument};

use crate::client::HttpClient;
use crate::config::PicaConfig;
use crate::model::{ApiItem, ApiResponse, PicaContext};
use crate::request::RequestBuilder;
use crate::scope::{BASE_URL, Scope};
use crate::{PicaError, ScriptValue};

/// Runs [`ApiItem`]s: materializes each request against the scope, sends it
/// and records the response on the item.
#[derive(Debug)]
pub struct ApiRunner {
    config: PicaConfig,
    builder: RequestBuilder,
    client: HttpClient,
}

impl ApiRunner {
    /// Creates a runner with the default request builder.
    pub fn new(config: PicaConfig) -> Self {
        Self::with_builder(config, RequestBuilder::default())
    }

    /// Creates a runner with a custom request builder.
    pub fn with_builder(config: PicaConfig, builder: RequestBuilder) -> Self {
        let mut client = HttpClient::new(config.base_url());
        if let Some(timeout) = config.timeout() {
            client = client.with_timeout(timeout);
        }
        Self {
            config,
            builder,
            client,
        }
    }

    /// The configuration.
    pub fn config(&self) -> &PicaConfig {
        &self.config
    }

    /// Runs one item and stores its response.
    ///
    /// Default headers missing from the request are added first. When the
    /// scope has no `baseUrl` binding the configured base URL is used.
    ///
    /// # Errors
    ///
    /// Fails when the request cannot be built, on transport errors, or when
    /// the response body cannot be read.
    #[instrument(skip_all, fields(name = %item.request.name, method = %item.request.method))]
    pub async fn run<'item>(
        &self,
        item: &'item mut ApiItem,
        scope: &dyn Scope,
    ) -> Result<&'item ApiResponse, PicaError> {
        item.request.fill_headers(self.config.default_headers());

        let scope = WithBaseUrl {
            scope,
            base_url: self.config.base_url(),
        };
        let prepared = self.builder.build(&mut item.request, &scope)?;
        let response = self.client.send(prepared).await?;
        let response = ApiResponse::read(response).await?;
        info!(status = %response.status, size = response.body.len(), "response received");

        Ok(item.response.insert(response))
    }

    /// Runs every item of the context, in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// See [`ApiRunner::run`].
    pub async fn run_context(
        &self,
        context: &mut PicaContext,
        scope: &dyn Scope,
    ) -> Result<(), PicaError> {
        info!(name = %context.name, items = context.api_items.len(), "running suite");
        for item in &mut context.api_items {
            self.run(item, scope).await?;
        }
        Ok(())
    }
}

struct WithBaseUrl<'a> {
    scope: &'a dyn Scope,
    base_url: &'a str,
}

impl Scope for WithBaseUrl<'_> {
    fn lookup(&self, name: &str) -> Option<ScriptValue> {
        self.scope.lookup(name).or_else(|| {
            (name == BASE_URL && !self.base_url.is_empty())
                .then(|| ScriptValue::from(self.base_url))
        })
    }
}
