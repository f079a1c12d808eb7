#![allow(dead_code, missing_docs, clippy::expect_used)]
use rstest::fixture;
use tracing::info;

mod echo_server;
pub use self::echo_server::*;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

#[fixture]
pub async fn server() -> EchoServer {
    init_tracing();
    match EchoServer::start().await {
        Ok(server) => server,
        Err(error) => {
            panic!("fail to start echo server: {error:?}");
        }
    }
}
