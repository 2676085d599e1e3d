//! Authenticate with an AWS IAM identity assertion instead of an api key.
//!
//! The AWS credential is read from `AWS_ACCESS_KEY_ID`,
//! `AWS_SECRET_ACCESS_KEY` and `AWS_SESSION_TOKEN`; the Conjur side comes
//! from the usual `CONJUR_*` variables, with `CONJUR_AUTHN_URL` pointing at
//! the IAM authenticator, e.g.
//! `https://conjur.example.com/authn-iam/prod`.

use conjur::iam::EnvIamCredentialProvider;
use conjur::Client;
use conjur_core::{Context, OsEnv};
use conjur_file_read_tokio::TokioFileRead;
use conjur_http_send_reqwest::ReqwestHttpSend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let variable_id = std::env::args()
        .nth(1)
        .expect("usage: iam_auth <variable-id>");

    let ctx = Context::new()
        .with_env(OsEnv)
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default());

    let client = Client::from_env(ctx)?;
    client
        .authenticate_iam_with(&EnvIamCredentialProvider::new())
        .await?;

    let secret = client.retrieve_secret(&variable_id).await?;
    println!("{}", secret.as_str());

    Ok(())
}
