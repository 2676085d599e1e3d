use super::constants::*;
use crate::iam::IamCredential;
use conjur_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use conjur_core::time::{format_date, format_iso8601, Clock, DateTime, SystemClock};
use conjur_core::{Error, Result, SigningCredential};
use log::debug;
use std::fmt::Write;
use std::sync::Arc;
use zeroize::Zeroizing;

/// The identity endpoint a signature is bound to.
///
/// The defaults point at the global STS host; they are injected rather than
/// hardcoded in the signing logic so the engine can be pointed at an
/// alternate verifier without code changes.
#[derive(Debug, Clone)]
pub struct StsEndpoint {
    host: String,
    region: String,
    service: String,
}

impl StsEndpoint {
    /// Create an endpoint description.
    pub fn new(host: &str, region: &str, service: &str) -> Self {
        Self {
            host: host.into(),
            region: region.into(),
            service: service.into(),
        }
    }

    /// Host the identity request is addressed to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Region bound into the credential scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service name bound into the credential scope.
    pub fn service(&self) -> &str {
        &self.service
    }
}

impl Default for StsEndpoint {
    fn default() -> Self {
        Self::new(STS_HOST, STS_REGION, STS_SERVICE)
    }
}

/// IdentitySigner produces the signed `GetCallerIdentity` header bundle that
/// proves the caller's AWS identity to the appliance.
///
/// Signing is a pure in-memory transform: the signer holds no mutable state
/// and may be shared freely across threads. The instant of signing comes
/// from the injected [`Clock`] (system time by default), or can be passed
/// explicitly through [`IdentitySigner::signed_header_at`]; the verifier
/// enforces a validity window around it, so sign right before use.
#[derive(Debug, Clone)]
pub struct IdentitySigner {
    endpoint: StsEndpoint,
    clock: Arc<dyn Clock>,
}

impl Default for IdentitySigner {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentitySigner {
    /// Create a signer for the default STS endpoint and the system clock.
    pub fn new() -> Self {
        Self {
            endpoint: StsEndpoint::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Bind signatures to a different identity endpoint.
    pub fn with_endpoint(mut self, endpoint: StsEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Replace the clock the signing instant is read from.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Produce the header bundle for the current instant.
    pub fn signed_header(&self, credential: &IamCredential) -> Result<Zeroizing<String>> {
        self.signed_header_at(credential, self.clock.now())
    }

    /// Produce the header bundle for an explicit signing instant.
    ///
    /// For fixed inputs the output is byte-for-byte deterministic.
    pub fn signed_header_at(
        &self,
        credential: &IamCredential,
        now: DateTime,
    ) -> Result<Zeroizing<String>> {
        // Reject incomplete material before any hashing happens; an empty
        // field would otherwise sign fine and fail only at the verifier.
        if !credential.is_valid() {
            return Err(Error::credential_invalid(
                "access key id, secret access key and session token must all be non-empty",
            ));
        }

        // Both strings must come from the same captured instant, or they can
        // disagree across a midnight boundary.
        let amz_date = format_iso8601(now);
        let date_stamp = format_date(now);

        let creq = canonical_request(&self.endpoint, &amz_date, &credential.session_token)?;

        // Scope: "19700101/<region>/<service>/aws4_request"
        let scope = format!(
            "{date_stamp}/{}/{}/{AWS4_REQUEST}",
            self.endpoint.region, self.endpoint.service
        );
        debug!("calculated scope: {scope}");

        let string_to_sign = string_to_sign(&amz_date, &scope, &creq)?;
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key = generate_signing_key(
            &credential.secret_access_key,
            &date_stamp,
            &self.endpoint.region,
            &self.endpoint.service,
        );
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let authorization = format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
            credential.access_key_id
        );

        header_bundle(
            &self.endpoint,
            &amz_date,
            &credential.session_token,
            &authorization,
        )
    }
}

/// Build the canonical form of the identity request.
///
/// The layout is a verifier contract: header lines appear in lexical order
/// of header name, and every byte, including the trailing payload hash, must
/// match the verifier's reconstruction exactly.
fn canonical_request(
    endpoint: &StsEndpoint,
    amz_date: &str,
    session_token: &str,
) -> Result<String> {
    // 1024 fits a typical session token without reallocation.
    let mut f = String::with_capacity(1024);

    writeln!(f, "GET")?;
    writeln!(f, "/")?;
    writeln!(f, "{GET_CALLER_IDENTITY_QUERY}")?;
    writeln!(f, "host:{}", endpoint.host)?;
    writeln!(f, "{X_AMZ_CONTENT_SHA_256}:{EMPTY_PAYLOAD_SHA256}")?;
    writeln!(f, "{X_AMZ_DATE}:{amz_date}")?;
    writeln!(f, "{X_AMZ_SECURITY_TOKEN}:{session_token}")?;
    writeln!(f)?;
    writeln!(f, "{SIGNED_HEADERS}")?;
    write!(f, "{EMPTY_PAYLOAD_SHA256}")?;

    Ok(f)
}

/// Wrap the canonical request hash with algorithm, timestamp and scope.
///
/// StringToSign:
///
/// ```text
/// AWS4-HMAC-SHA256
/// 19700101T010101Z
/// 19700101/<region>/<service>/aws4_request
/// <hashed_canonical_request>
/// ```
fn string_to_sign(amz_date: &str, scope: &str, canonical_request: &str) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "{ALGORITHM}")?;
    writeln!(f, "{amz_date}")?;
    writeln!(f, "{scope}")?;
    write!(f, "{}", hex_sha256(canonical_request.as_bytes()))?;

    Ok(f)
}

/// Derive the signing key for one date/region/service tuple.
///
/// Four chained HMAC operations, each output keying the next. The result is
/// never the raw secret and is only valid for this tuple; it is derived
/// fresh per signature and zeroed as soon as the signature is computed.
fn generate_signing_key(
    secret: &str,
    date_stamp: &str,
    region: &str,
    service: &str,
) -> Zeroizing<Vec<u8>> {
    // Sign secret
    let secret = Zeroizing::new(format!("AWS4{secret}"));
    // Sign date
    let sign_date = Zeroizing::new(hmac_sha256(secret.as_bytes(), date_stamp.as_bytes()));
    // Sign region
    let sign_region = Zeroizing::new(hmac_sha256(&sign_date, region.as_bytes()));
    // Sign service
    let sign_service = Zeroizing::new(hmac_sha256(&sign_region, service.as_bytes()));
    // Sign request
    Zeroizing::new(hmac_sha256(&sign_service, AWS4_REQUEST.as_bytes()))
}

/// Assemble the JSON bundle handed to the transport layer.
///
/// Key order and the `": "` / `", "` separators are part of the verifier
/// contract, so the object is written out by hand instead of going through a
/// serializer. The bundle carries the session token, treat it like the
/// credential itself.
fn header_bundle(
    endpoint: &StsEndpoint,
    amz_date: &str,
    session_token: &str,
    authorization: &str,
) -> Result<Zeroizing<String>> {
    let mut f = String::with_capacity(1536);
    write!(
        f,
        "{{\"host\": \"{}\", \"{X_AMZ_DATE}\": \"{amz_date}\", \"{X_AMZ_SECURITY_TOKEN}\": \"{session_token}\", \"{X_AMZ_CONTENT_SHA_256}\": \"{EMPTY_PAYLOAD_SHA256}\", \"authorization\": \"{authorization}\"}}",
        endpoint.host
    )?;

    Ok(Zeroizing::new(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use conjur_core::time::parse_rfc3339;
    use conjur_core::ErrorKind;
    use pretty_assertions::assert_eq;

    const EXPECTED_CANONICAL_REQUEST: &str = "GET\n\
        /\n\
        Action=GetCallerIdentity&Version=2011-06-15\n\
        host:sts.amazonaws.com\n\
        x-amz-content-sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\n\
        x-amz-date:19700101T010101Z\n\
        x-amz-security-token:thisIsMyToken\n\
        \n\
        host;x-amz-content-sha256;x-amz-date;x-amz-security-token\n\
        e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    const EXPECTED_BUNDLE: &str = "{\"host\": \"sts.amazonaws.com\", \
        \"x-amz-date\": \"19700101T010101Z\", \
        \"x-amz-security-token\": \"sessionToken\", \
        \"x-amz-content-sha256\": \"e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\", \
        \"authorization\": \"AWS4-HMAC-SHA256 \
        Credential=accessKey/19700101/us-east-1/sts/aws4_request, \
        SignedHeaders=host;x-amz-content-sha256;x-amz-date;x-amz-security-token, \
        Signature=b4bcd421537126ab374c41563b6f36bcc5db0cb634a5b251614a51ca352d3031\"}";

    fn test_time() -> DateTime {
        parse_rfc3339("1970-01-01T01:01:01Z").unwrap()
    }

    fn test_credential() -> IamCredential {
        IamCredential::new("accessKey", "secretKey", "sessionToken")
    }

    #[test]
    fn test_canonical_request() {
        let creq = canonical_request(
            &StsEndpoint::default(),
            "19700101T010101Z",
            "thisIsMyToken",
        )
        .unwrap();

        assert_eq!(creq, EXPECTED_CANONICAL_REQUEST);
        assert_eq!(
            hex_sha256(creq.as_bytes()),
            "a4ec84e151d9cc55ae97ea6e575126535e49c284f651bc66275ed03818506189"
        );
    }

    #[test]
    fn test_canonical_request_token_changes_one_line() {
        let endpoint = StsEndpoint::default();
        let base = canonical_request(&endpoint, "19700101T010101Z", "thisIsMyToken").unwrap();
        let other = canonical_request(&endpoint, "19700101T010101Z", "someOtherToken").unwrap();

        let changed = base
            .lines()
            .zip(other.lines())
            .filter(|(l, r)| l != r)
            .count();
        assert_eq!(base.lines().count(), other.lines().count());
        assert_eq!(changed, 1);
    }

    #[test]
    fn test_string_to_sign_golden() {
        let sts = string_to_sign(
            "19700101T010101Z",
            "19700101/us-east-1/sts/aws4_request",
            EXPECTED_CANONICAL_REQUEST,
        )
        .unwrap();

        assert_eq!(
            sts,
            "AWS4-HMAC-SHA256\n\
             19700101T010101Z\n\
             19700101/us-east-1/sts/aws4_request\n\
             a4ec84e151d9cc55ae97ea6e575126535e49c284f651bc66275ed03818506189"
        );

        // 64 lowercase hex chars, no separators.
        let key = generate_signing_key("secretKey", "19700101", "us-east-1", "sts");
        let signature = hex_hmac_sha256(&key, sts.as_bytes());
        assert_eq!(signature.len(), 64);
        assert_eq!(signature, signature.to_lowercase());
    }

    #[test]
    fn test_signed_header_at_golden() {
        let bundle = IdentitySigner::new()
            .signed_header_at(&test_credential(), test_time())
            .unwrap();

        assert_eq!(bundle.as_str(), EXPECTED_BUNDLE);
    }

    #[test]
    fn test_signed_header_at_is_deterministic() {
        let signer = IdentitySigner::new();
        let cred = test_credential();

        let a = signer.signed_header_at(&cred, test_time()).unwrap();
        let b = signer.signed_header_at(&cred, test_time()).unwrap();
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_bundle_is_json_with_pinned_key_order() {
        let bundle = IdentitySigner::new()
            .signed_header_at(&test_credential(), test_time())
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&bundle).unwrap();
        assert_eq!(
            parsed["host"],
            serde_json::Value::String("sts.amazonaws.com".to_string())
        );

        let positions: Vec<usize> = [
            "\"host\"",
            "\"x-amz-date\"",
            "\"x-amz-security-token\"",
            "\"x-amz-content-sha256\"",
            "\"authorization\"",
        ]
        .iter()
        .map(|key| bundle.find(key).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_timestamp_propagation_across_boundaries() {
        let signer = IdentitySigner::new();
        let cred = test_credential();

        for s in [
            "1999-12-31T23:59:59Z",
            "2023-12-31T23:59:59Z",
            "2024-02-29T00:00:00Z",
            "2024-07-01T12:30:45Z",
        ] {
            let now = parse_rfc3339(s).unwrap();
            let bundle = signer.signed_header_at(&cred, now).unwrap();
            let parsed: serde_json::Value = serde_json::from_str(&bundle).unwrap();

            let amz_date = parsed["x-amz-date"].as_str().unwrap();
            let authorization = parsed["authorization"].as_str().unwrap();
            let scope_date = authorization
                .split("Credential=accessKey/")
                .nth(1)
                .unwrap()
                .split('/')
                .next()
                .unwrap();

            assert_eq!(&amz_date[..8], scope_date, "at {s}");
        }
    }

    #[test]
    fn test_key_derivation_independence() {
        let a = generate_signing_key("secretKey", "19700101", "us-east-1", "sts");
        let b = generate_signing_key("secretKey", "19700101", "us-east-1", "sts");
        assert_eq!(a.as_slice(), b.as_slice());
        assert_eq!(a.len(), 32);

        let other = generate_signing_key("otherSecret", "19700101", "us-east-1", "sts");
        assert_ne!(a.as_slice(), other.as_slice());

        let other_date = generate_signing_key("secretKey", "19700102", "us-east-1", "sts");
        assert_ne!(a.as_slice(), other_date.as_slice());
    }

    #[test]
    fn test_different_secrets_produce_different_signatures() {
        let signer = IdentitySigner::new();
        let a = signer
            .signed_header_at(
                &IamCredential::new("accessKey", "secretKey", "sessionToken"),
                test_time(),
            )
            .unwrap();
        let b = signer
            .signed_header_at(
                &IamCredential::new("accessKey", "anotherSecretKey", "sessionToken"),
                test_time(),
            )
            .unwrap();

        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_rejects_incomplete_credentials() {
        let signer = IdentitySigner::new();
        for cred in [
            IamCredential::new("", "secretKey", "sessionToken"),
            IamCredential::new("accessKey", "", "sessionToken"),
            IamCredential::new("accessKey", "secretKey", ""),
        ] {
            let err = signer.signed_header_at(&cred, test_time()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
        }
    }

    #[test]
    fn test_custom_endpoint_flows_into_bundle() {
        let signer = IdentitySigner::new().with_endpoint(StsEndpoint::new(
            "sts.eu-west-1.amazonaws.com",
            "eu-west-1",
            "sts",
        ));

        let bundle = signer
            .signed_header_at(&test_credential(), test_time())
            .unwrap();
        assert!(bundle.contains("\"host\": \"sts.eu-west-1.amazonaws.com\""));
        assert!(bundle.contains("/19700101/eu-west-1/sts/aws4_request,"));
    }

    #[test]
    fn test_injected_clock_matches_explicit_time() {
        #[derive(Debug)]
        struct FixedClock(DateTime);

        impl Clock for FixedClock {
            fn now(&self) -> DateTime {
                self.0
            }
        }

        let signer = IdentitySigner::new().with_clock(FixedClock(test_time()));
        let cred = test_credential();

        let from_clock = signer.signed_header(&cred).unwrap();
        let explicit = signer.signed_header_at(&cred, test_time()).unwrap();
        assert_eq!(from_clock.as_str(), explicit.as_str());
    }
}
