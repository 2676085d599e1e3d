//! Live tests against a real Conjur appliance.
//!
//! Gated behind `CONJUR_TEST=on`; without it every test passes trivially.
//! The appliance connection comes from the usual `CONJUR_*` variables, plus:
//!
//! - `CONJUR_TEST_VARIABLE_ID`: a variable the configured identity can read

use anyhow::Result;
use conjur::{Client, Config};
use conjur_core::{Context, OsEnv};
use conjur_file_read_tokio::TokioFileRead;
use conjur_http_send_reqwest::ReqwestHttpSend;
use log::debug;
use std::env;

fn init_client() -> Option<Client> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("CONJUR_TEST").is_err() || env::var("CONJUR_TEST").unwrap() != "on" {
        return None;
    }

    let ctx = Context::new().with_env(OsEnv);
    let config = Config::default().from_env(&ctx);
    let http = if config.ignore_untrusted_ssl {
        ReqwestHttpSend::untrusted_tls().expect("http client must build")
    } else {
        ReqwestHttpSend::default()
    };
    let ctx = ctx.with_file_read(TokioFileRead).with_http_send(http);

    Some(Client::new(ctx, config).expect("client must build"))
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let Some(client) = init_client() else {
        return Ok(());
    };

    let health = client.health().await?;
    debug!("appliance health: {health}");
    assert!(health.is_object());

    Ok(())
}

#[tokio::test]
async fn test_info() -> Result<()> {
    let Some(client) = init_client() else {
        return Ok(());
    };

    let info = client.info().await?;
    debug!("appliance info: {info}");
    assert!(info.is_object());

    Ok(())
}

#[tokio::test]
async fn test_authenticate_and_retrieve_secret() -> Result<()> {
    let Some(client) = init_client() else {
        return Ok(());
    };

    client.authenticate().await?;

    let variable_id = env::var("CONJUR_TEST_VARIABLE_ID")
        .expect("env CONJUR_TEST_VARIABLE_ID must be set when CONJUR_TEST is on");
    let secret = client.retrieve_secret(&variable_id).await?;
    assert!(!secret.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_list_resources() -> Result<()> {
    let Some(client) = init_client() else {
        return Ok(());
    };

    client.authenticate().await?;

    let resources = client.list_resources(None, None).await?;
    debug!("visible resources: {}", resources.len());
    for resource in resources {
        assert!(!resource.account.is_empty());
    }

    Ok(())
}
