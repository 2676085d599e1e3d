use super::constants::*;
use conjur_core::utils::Redact;
use conjur_core::{Context, Error, Result};
use std::fmt::{Debug, Formatter};
use zeroize::Zeroizing;

/// Config carries all the configuration for the Conjur client.
#[derive(Clone, Default)]
pub struct Config {
    /// Base URL of the appliance, e.g. `https://conjur.example.com`.
    ///
    /// `appliance_url` will be loaded from
    ///
    /// - this field if it's non-empty
    /// - env value: [`CONJUR_APPLIANCE_URL`]
    pub appliance_url: String,
    /// Name of the Conjur account.
    ///
    /// `account` will be loaded from
    ///
    /// - this field if it's non-empty
    /// - env value: [`CONJUR_ACCOUNT`]
    pub account: String,
    /// URL of the authentication service.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CONJUR_AUTHN_URL`]
    /// - default to `{appliance_url}/authn`
    pub authn_url: Option<String>,
    /// Login name presented to the authentication service, e.g. `admin` or
    /// `host/my-app`.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CONJUR_AUTHN_LOGIN`]
    pub login: Option<String>,
    /// Api key exchanged for an access token.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CONJUR_AUTHN_API_KEY`]
    pub api_key: Option<Zeroizing<String>>,
    /// Pre-provisioned access token, used as-is.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CONJUR_AUTHN_TOKEN`]
    pub access_token: Option<Zeroizing<String>>,
    /// Path of a file holding the access token, read at authentication time.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CONJUR_AUTHN_TOKEN_FILE`]
    pub access_token_path: Option<String>,
    /// Accept untrusted server certificates.
    ///
    /// - this field if it's `true`
    /// - env value: [`CONJUR_IGNORE_UNTRUSTED_SSL`] set to `true` or `yes`
    pub ignore_untrusted_ssl: bool,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("appliance_url", &self.appliance_url)
            .field("account", &self.account)
            .field("authn_url", &self.authn_url)
            .field("login", &self.login)
            .field("api_key", &Redact::from(&self.api_key))
            .field("access_token", &Redact::from(&self.access_token))
            .field("access_token_path", &self.access_token_path)
            .field("ignore_untrusted_ssl", &self.ignore_untrusted_ssl)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if self.appliance_url.is_empty() {
            if let Some(v) = ctx.env_var(CONJUR_APPLIANCE_URL) {
                self.appliance_url = v;
            }
        }
        if self.account.is_empty() {
            if let Some(v) = ctx.env_var(CONJUR_ACCOUNT) {
                self.account = v;
            }
        }
        if let Some(v) = ctx.env_var(CONJUR_AUTHN_URL) {
            self.authn_url.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(CONJUR_AUTHN_LOGIN) {
            self.login.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(CONJUR_AUTHN_API_KEY) {
            self.api_key.get_or_insert(Zeroizing::new(v));
        }
        if let Some(v) = ctx.env_var(CONJUR_AUTHN_TOKEN) {
            self.access_token.get_or_insert(Zeroizing::new(v));
        }
        if let Some(v) = ctx.env_var(CONJUR_AUTHN_TOKEN_FILE) {
            self.access_token_path.get_or_insert(v);
        }
        if !self.ignore_untrusted_ssl {
            if let Some(v) = ctx.env_var(CONJUR_IGNORE_UNTRUSTED_SSL) {
                let v = v.to_lowercase();
                self.ignore_untrusted_ssl = v == "true" || v == "yes";
            }
        }

        self
    }

    /// The authentication service URL, defaulting to `{appliance_url}/authn`.
    pub fn authn_url(&self) -> String {
        match &self.authn_url {
            Some(url) => url.clone(),
            None => format!("{}/authn", self.appliance_url),
        }
    }

    /// Check that the fields every request depends on are present.
    ///
    /// Authentication material is checked later, at authentication time,
    /// since unauthenticated endpoints like `/health` don't need any.
    pub fn validate(&self) -> Result<()> {
        if self.appliance_url.is_empty() {
            return Err(Error::config_invalid(format!(
                "failed to retrieve required configuration `{CONJUR_APPLIANCE_URL}`"
            )));
        }
        if self.account.is_empty() {
            return Err(Error::config_invalid(format!(
                "failed to retrieve required configuration `{CONJUR_ACCOUNT}`"
            )));
        }

        Ok(())
    }
}
