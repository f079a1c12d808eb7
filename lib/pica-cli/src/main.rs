#![allow(missing_docs)]
use std::ffi::OsString;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use http::Method;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pica_core::{ApiItem, ApiRequest, ApiRunner, PicaConfig, Profile, RuntimeScope, ScriptValue};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let profile = Profile::init_default().context("initializing profile")?;
    info!(path = %profile.path().display(), "profile ready");

    let args = CliArgs::parse(std::env::args_os().skip(1).collect()).context("parsing arguments")?;
    let body = args.run().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{body}");
    }
    Ok(())
}

#[derive(Debug)]
struct CliArgs {
    base_url: Option<String>,
    timeout: Option<Duration>,
    headers: Vec<(String, String)>,
    data: Vec<(String, ScriptValue)>,
    method: Method,
    path: String,
}

impl CliArgs {
    fn parse(args: Vec<OsString>) -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_vec(args);

        let base_url = pargs
            .opt_value_from_str(["-b", "--base-url"])
            .context("parsing base URL argument")?;
        let timeout = pargs
            .opt_value_from_str::<_, u64>(["-t", "--timeout"])
            .context("parsing timeout argument")?
            .map(Duration::from_secs);
        let headers = pargs
            .values_from_fn(["-H", "--header"], parse_header)
            .context("parsing header argument")?;
        let data = pargs
            .values_from_fn(["-d", "--data"], parse_data)
            .context("parsing data argument")?;
        let method = pargs
            .free_from_str::<Method>()
            .context("parsing method argument")?;
        let path = pargs
            .free_from_str::<String>()
            .context("parsing path argument")?;

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            warn!(?remaining, "Warning: unused arguments left");
        }

        Ok(Self {
            base_url,
            timeout,
            headers,
            data,
            method,
            path,
        })
    }

    async fn run(self) -> Result<String> {
        let mut config = PicaConfig::builder();
        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        let runner = ApiRunner::new(config.build());

        let mut request = ApiRequest::new(self.method.clone(), self.path);
        for (name, value) in &self.headers {
            request = request.add_header(name, value)?;
        }
        let scope = RuntimeScope::new().with_params(self.method.as_str(), self.data);

        let mut item = ApiItem::new(request);
        let response = runner
            .run(&mut item, &scope)
            .await
            .context("running request")?;
        Ok(response.text())
    }
}

fn parse_header(arg: &str) -> Result<(String, String)> {
    let Some((name, value)) = arg.split_once(':') else {
        bail!("expected 'Name: value', got '{arg}'");
    };
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn parse_data(arg: &str) -> Result<(String, ScriptValue)> {
    let Some((key, value)) = arg.split_once('=') else {
        bail!("expected 'key=value', got '{arg}'");
    };
    let value = value
        .parse::<i64>()
        .map_or_else(|_| ScriptValue::from(value), ScriptValue::from);
    Ok((key.to_string(), value))
}
