use crate::constants::PATH_SEGMENT_ENCODE_SET;
use crate::{Config, ResourceKind};
use percent_encoding::utf8_percent_encode;

/// Endpoints builds the REST paths of the Conjur API.
///
/// Paths are relative to the appliance URL unless the authentication service
/// lives on a different host, in which case [`Endpoints::authenticate`]
/// returns an absolute URL.
#[derive(Debug, Clone)]
pub struct Endpoints {
    account: String,
    authn_base: String,
}

impl Endpoints {
    /// Create endpoints for the given configuration.
    pub fn new(config: &Config) -> Self {
        // Keep authn relative when it lives under the appliance URL, so
        // both can share one base; a foreign authn URL stays absolute.
        let authn_url = config.authn_url();
        let authn_base = match authn_url.strip_prefix(&config.appliance_url) {
            Some(rest) if !config.appliance_url.is_empty() => rest.to_string(),
            _ => authn_url.clone(),
        };

        Self {
            account: config.account.clone(),
            authn_base,
        }
    }

    /// Path of the authentication endpoint for the given login.
    pub fn authenticate(&self, login: &str) -> String {
        format!(
            "{}/{}/{}/authenticate",
            self.authn_base,
            self.account,
            url_encode(login)
        )
    }

    /// Path for reading the value of a variable.
    pub fn retrieve_secret(&self, variable_id: &str) -> String {
        format!(
            "/secrets/{}/variable/{}",
            self.account,
            url_encode(variable_id)
        )
    }

    /// Path for setting the value of a variable.
    pub fn add_secret(&self, variable_id: &str) -> String {
        self.retrieve_secret(variable_id)
    }

    /// Path for listing resources, optionally narrowed by kind and search.
    pub fn list_resources(&self, kind: Option<ResourceKind>, search: Option<&str>) -> String {
        let mut path = format!("/resources/{}", self.account);
        if let Some(kind) = kind {
            path.push('/');
            path.push_str(kind.as_str());
        }
        if let Some(search) = search {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("search", search)
                .finish();
            path.push('?');
            path.push_str(&query);
        }

        path
    }

    /// Path of the appliance info document.
    pub fn info(&self) -> String {
        "/info".to_string()
    }

    /// Path of the appliance health document.
    pub fn health(&self) -> String {
        "/health".to_string()
    }
}

fn url_encode(segment: &str) -> String {
    utf8_percent_encode(segment, &PATH_SEGMENT_ENCODE_SET).to_string()
}
