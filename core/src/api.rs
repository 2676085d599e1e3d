use crate::{Context, Result};
use std::fmt::Debug;

/// SigningCredential marks a credential type that can be checked for
/// completeness before it is used to produce a signature or token.
pub trait SigningCredential: Clone + Send + Sync + 'static {
    /// Check if the credential is complete enough to sign with.
    fn is_valid(&self) -> bool;
}

impl<T: SigningCredential> SigningCredential for Option<T> {
    fn is_valid(&self) -> bool {
        let Some(cred) = self else {
            return false;
        };

        cred.is_valid()
    }
}

/// ProvideCredential is the trait used to load a credential from the
/// environment.
///
/// Different authentication methods require different material, for example,
/// the IAM flow requires an AWS access key, secret key and session token,
/// while the api-key flow only needs the key configured up front.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync {
    /// Credential returned by this provider.
    type Credential: SigningCredential;

    /// Load the credential from the current env.
    ///
    /// Returns `Ok(None)` when this provider has nothing to offer, so callers
    /// can fall through to another source.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}
