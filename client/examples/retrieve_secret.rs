//! Read one secret, configured entirely from `CONJUR_*` environment
//! variables.
//!
//! ```shell
//! export CONJUR_APPLIANCE_URL=https://conjur.example.com
//! export CONJUR_ACCOUNT=conjur
//! export CONJUR_AUTHN_LOGIN=admin
//! export CONJUR_AUTHN_API_KEY=...
//! cargo run --example retrieve_secret -- prod/db/password
//! ```

use conjur::{Client, Config};
use conjur_core::{Context, OsEnv};
use conjur_file_read_tokio::TokioFileRead;
use conjur_http_send_reqwest::ReqwestHttpSend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let variable_id = std::env::args()
        .nth(1)
        .expect("usage: retrieve_secret <variable-id>");

    let ctx = Context::new().with_env(OsEnv);
    let config = Config::default().from_env(&ctx);
    let http = if config.ignore_untrusted_ssl {
        ReqwestHttpSend::untrusted_tls()?
    } else {
        ReqwestHttpSend::default()
    };
    let ctx = ctx.with_file_read(TokioFileRead).with_http_send(http);

    let client = Client::new(ctx, config)?;
    client.authenticate().await?;

    let secret = client.retrieve_secret(&variable_id).await?;
    println!("{}", secret.as_str());

    Ok(())
}
