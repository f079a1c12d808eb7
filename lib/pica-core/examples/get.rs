use http::Method;
use pica_core::{ApiRequest, ApiRunner, PicaConfig, PicaContext, RuntimeScope};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let config = PicaConfig::builder()
        .with_base_url("http://dog.ceo/api")
        .build();
    let runner = ApiRunner::new(config);

    let mut context = PicaContext {
        name: "dog.ceo".to_string(),
        ..PicaContext::default()
    };

    // Simple get call with no parameters
    context.push(ApiRequest::new(Method::GET, "/breeds/list").with_name("breeds"));

    // Get call with a path parameter, resolved from the scope
    context.push(ApiRequest::new(Method::GET, "/breed/{breed}/images").with_name("images"));

    let scope = RuntimeScope::new().bind("breed", "hound");
    runner.run_context(&mut context, &scope).await?;

    for item in &context.api_items {
        if let Some(response) = &item.response {
            let body = serde_json::from_slice::<serde_json::Value>(&response.body)?;
            tracing::info!(name = %item.request.name, status = %response.status, %body);
        }
    }

    Ok(())
}
