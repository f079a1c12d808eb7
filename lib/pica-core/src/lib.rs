//! # Pica Core
//!
//! Turn declarative API calls into HTTP requests, send them and keep the responses.
//!
//! An [`ApiRequest`] describes one endpoint under test: method, URL template and
//! headers. Body parameters live in the scripting runtime [`Scope`], bound to
//! the lower-cased method name (`post`, `put`...). The [`RequestBuilder`]
//! reads them, picks an encoding from the declared `Content-Type` and produces
//! a [`PreparedRequest`] that the [`HttpClient`] sends.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use http::Method;
//! use pica_core::{ApiItem, ApiRequest, ApiRunner, PicaConfig, RuntimeScope};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PicaConfig::builder()
//!     .with_base_url("http://localhost:8080")
//!     .build();
//! let runner = ApiRunner::new(config);
//!
//! let scope = RuntimeScope::new().with_params("POST", [("name", "alice")]);
//! let mut item = ApiItem::new(
//!     ApiRequest::new(Method::POST, "/api/users").with_name("create user"),
//! );
//!
//! let response = runner.run(&mut item, &scope).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```
//!
//! ## Body Encodings
//!
//! | Content-Type                        | Body                                              |
//! |-------------------------------------|---------------------------------------------------|
//! | `application/x-www-form-urlencoded` | `key=value` pairs                                 |
//! | `multipart/form-data`               | one part per parameter, `@path` streams a file    |
//! | `application/json`                  | one flat JSON object                              |
//!
//! `GET` requests never carry a body.
//!
//! ### File Attachments
//!
//! In a multipart body, a parameter value starting with `@` is a local path:
//!
//! ```rust
//! use pica_core::RuntimeScope;
//!
//! let scope = RuntimeScope::new().with_params(
//!     "post",
//!     [("title", "holidays"), ("picture", "@/tmp/beach.jpg")],
//! );
//! ```
//!
//! The `picture` part is sent with the `beach.jpg` filename and the file content.
//!
//! ## Values
//!
//! Only integers and strings can be put on the wire, see [`coerce`]. Any other
//! [`ScriptValue`] reaching an encoder is a bug in the script and panics.

pub mod builtins;
pub use self::builtins::{Builtin, builtins};

mod client;
pub use self::client::HttpClient;

mod config;
pub use self::config::{PicaConfig, PicaConfigBuilder, Profile, VERSION};

mod error;
pub use self::error::PicaError;

mod model;
pub use self::model::{ApiItem, ApiRequest, ApiResponse, PicaContext, Query};

pub mod request;
pub use self::request::{
    PreparedRequest, RequestBuilder, ResolvedUrl, TemplateResolver, UrlResolver,
};

mod runner;
pub use self::runner::ApiRunner;

mod scope;
pub use self::scope::{BASE_URL, ParameterBag, RuntimeScope, Scope, ScopeExt};

mod value;
pub use self::value::{ScriptValue, coerce};
