use crate::iam::{IamCredential, IdentitySigner};
use crate::{Config, Endpoints, Resource, ResourceKind};
use bytes::Bytes;
use conjur_core::hash::base64_encode;
use conjur_core::{Context, Error, ProvideCredential, Result};
use http::header::HeaderValue;
use http::{header, Method, Request, StatusCode};
use log::debug;
use std::fmt::{Debug, Formatter};
use std::sync::Mutex;
use zeroize::Zeroizing;

/// Client for a Conjur appliance.
///
/// The client keeps the access token obtained by the last `authenticate_*`
/// call and presents it on subsequent requests. Everything else is
/// stateless, so a client can be shared behind an `Arc` across tasks.
pub struct Client {
    ctx: Context,
    config: Config,
    endpoints: Endpoints,
    iam_signer: IdentitySigner,
    token: Mutex<Option<Zeroizing<String>>>,
}

impl Debug for Client {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The cached access token stays out of the output.
        f.debug_struct("Client")
            .field("ctx", &self.ctx)
            .field("config", &self.config)
            .field("endpoints", &self.endpoints)
            .field("iam_signer", &self.iam_signer)
            .finish()
    }
}

impl Client {
    /// Create a client for the given configuration.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        config.validate()?;
        let endpoints = Endpoints::new(&config);
        let token = config.access_token.clone();

        Ok(Self {
            ctx,
            config,
            endpoints,
            iam_signer: IdentitySigner::new(),
            token: Mutex::new(token),
        })
    }

    /// Create a client configured from the `CONJUR_*` environment variables.
    pub fn from_env(ctx: Context) -> Result<Self> {
        let config = Config::default().from_env(&ctx);
        Self::new(ctx, config)
    }

    /// Replace the IAM identity signer, e.g. to bind it to an alternate
    /// identity endpoint or clock.
    pub fn with_iam_signer(mut self, signer: IdentitySigner) -> Self {
        self.iam_signer = signer;
        self
    }

    /// Fetch the appliance info document.
    pub async fn info(&self) -> Result<serde_json::Value> {
        let body = self
            .request(Method::GET, &self.endpoints.info(), false, None)
            .await?;
        parse_json(&body)
    }

    /// Fetch the appliance health document.
    pub async fn health(&self) -> Result<serde_json::Value> {
        let body = self
            .request(Method::GET, &self.endpoints.health(), false, None)
            .await?;
        parse_json(&body)
    }

    /// Obtain an access token from the configured authentication material.
    ///
    /// Uses, in order: the inline access token, the access token file, or
    /// the login/api-key exchange. The token is kept for later requests.
    pub async fn authenticate(&self) -> Result<()> {
        if let Some(token) = &self.config.access_token {
            self.store_token(token.clone());
            return Ok(());
        }

        if let Some(path) = &self.config.access_token_path {
            let content = self.ctx.file_read(path).await.map_err(|e| {
                Error::config_invalid(format!("failed to read access token from file `{path}`"))
                    .with_source(e)
            })?;
            let token = String::from_utf8(content).map_err(|e| {
                Error::config_invalid(format!("access token in `{path}` is not valid utf-8"))
                    .with_source(e)
            })?;
            if token.trim().is_empty() {
                return Err(Error::config_invalid(format!(
                    "invalid access token, validate contents of `{path}`"
                )));
            }
            self.store_token(Zeroizing::new(token.trim_end().to_string()));
            return Ok(());
        }

        let (Some(login), Some(api_key)) = (&self.config.login, &self.config.api_key) else {
            return Err(Error::config_invalid(
                "no authentication method configured, set an access token, a token file, or login and api key",
            ));
        };

        let endpoint = self.endpoints.authenticate(login);
        let token = self
            .request(
                Method::POST,
                &endpoint,
                false,
                Some(Bytes::copy_from_slice(api_key.as_bytes())),
            )
            .await?;
        self.store_token(Zeroizing::new(token));

        Ok(())
    }

    /// Obtain an access token by asserting the caller's AWS identity.
    ///
    /// The signed header bundle is produced locally and posted as the
    /// authentication body; the appliance verifies it against AWS. The
    /// configured login names the identity to authenticate as.
    pub async fn authenticate_iam(&self, credential: &IamCredential) -> Result<()> {
        let login = self.config.login.as_deref().ok_or_else(|| {
            Error::config_invalid("a login is required for IAM authentication")
        })?;

        let bundle = self.iam_signer.signed_header(credential)?;
        let endpoint = self.endpoints.authenticate(login);
        let token = self
            .request(
                Method::POST,
                &endpoint,
                false,
                Some(Bytes::copy_from_slice(bundle.as_bytes())),
            )
            .await?;
        self.store_token(Zeroizing::new(token));

        Ok(())
    }

    /// Like [`Client::authenticate_iam`], with the credential looked up
    /// through the given provider.
    pub async fn authenticate_iam_with<P>(&self, provider: &P) -> Result<()>
    where
        P: ProvideCredential<Credential = IamCredential>,
    {
        let credential = provider
            .provide_credential(&self.ctx)
            .await?
            .ok_or_else(|| Error::credential_invalid("no AWS credential available"))?;

        self.authenticate_iam(&credential).await
    }

    /// Read the current value of a variable.
    pub async fn retrieve_secret(&self, variable_id: &str) -> Result<Zeroizing<String>> {
        let endpoint = self.endpoints.retrieve_secret(variable_id);
        let value = self.request(Method::GET, &endpoint, true, None).await?;

        Ok(Zeroizing::new(value))
    }

    /// Set the value of a variable.
    pub async fn add_secret(&self, variable_id: &str, value: &str) -> Result<()> {
        let endpoint = self.endpoints.add_secret(variable_id);
        self.request(
            Method::POST,
            &endpoint,
            true,
            Some(Bytes::copy_from_slice(value.as_bytes())),
        )
        .await?;

        Ok(())
    }

    /// List the resources visible to the caller.
    pub async fn list_resources(
        &self,
        kind: Option<ResourceKind>,
        search: Option<&str>,
    ) -> Result<Vec<Resource>> {
        let endpoint = self.endpoints.list_resources(kind, search);
        let body = self.request(Method::GET, &endpoint, true, None).await?;

        let documents: Vec<serde_json::Value> = serde_json::from_str(&body).map_err(|e| {
            Error::unexpected("failed to parse resource list").with_source(e)
        })?;
        documents.into_iter().map(Resource::from_json).collect()
    }

    fn store_token(&self, token: Zeroizing<String>) {
        *self.token.lock().expect("lock poisoned") = Some(token);
    }

    fn token_header(&self) -> Result<HeaderValue> {
        let guard = self.token.lock().expect("lock poisoned");
        let token = guard.as_ref().ok_or_else(|| {
            Error::authentication_denied("no access token available, authenticate first")
        })?;

        let mut value =
            HeaderValue::from_str(&format!("Token token=\"{}\"", base64_encode(token.as_bytes())))?;
        value.set_sensitive(true);

        Ok(value)
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        with_token: bool,
        body: Option<Bytes>,
    ) -> Result<String> {
        let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("{}{}", self.config.appliance_url, endpoint)
        };
        debug!("sending {method} {url}");

        let mut builder = Request::builder().method(method.clone()).uri(url.as_str());
        if with_token {
            builder = builder.header(header::AUTHORIZATION, self.token_header()?);
        }
        let req = builder.body(body.unwrap_or_default())?;

        let resp = self.ctx.http_send(req).await?;
        let status = resp.status();
        let content = String::from_utf8(resp.into_body().to_vec())?;

        match status {
            StatusCode::UNAUTHORIZED => Err(Error::authentication_denied(
                "unauthorized '401', invalid login, api key, or privileges",
            )),
            StatusCode::NOT_FOUND => Err(Error::resource_not_found(
                "not found '404', invalid privileges, resource does not exist, or secret value not populated",
            )),
            s if !s.is_success() => Err(Error::unexpected(format!(
                "http {method} {url} returned status code '{}' with response of '{content}'",
                s.as_u16()
            ))),
            _ => Ok(content),
        }
    }
}

fn parse_json(content: &str) -> Result<serde_json::Value> {
    serde_json::from_str(content)
        .map_err(|e| Error::unexpected("failed to parse appliance response").with_source(e))
}
