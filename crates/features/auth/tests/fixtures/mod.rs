use std::sync::{Arc, LazyLock};

use chrono::Utc;
use http::HeaderValue;
use http::header::{AUTHORIZATION, DATE};
use sigil_auth::prelude::*;
use sigil_auth::signature::format_http_date;
use sigil_domain::Credential as CredentialRecord;

/// Key size used throughout the tests. Small enough to keep generation fast.
pub const TEST_KEY_BITS: usize = 1024;

static CLIENT: LazyLock<RsaCredential> =
    LazyLock::new(|| RsaCredential::generate(TEST_KEY_BITS).expect("client key generation"));
static IMPOSTOR: LazyLock<RsaCredential> =
    LazyLock::new(|| RsaCredential::generate(TEST_KEY_BITS).expect("impostor key generation"));

/// The credential registered in most tests.
#[must_use]
pub fn client() -> &'static RsaCredential {
    &CLIENT
}

/// A credential that is never registered.
#[must_use]
pub fn impostor() -> &'static RsaCredential {
    &IMPOSTOR
}

/// The server-side record of `credential` under `account_id`.
#[must_use]
pub fn record_of(credential: &RsaCredential, account_id: &str) -> CredentialRecord {
    CredentialRecord {
        account_id: account_id.into(),
        fingerprint: credential.fingerprint().to_owned(),
        verifier: credential.verifier().to_vec(),
    }
}

type Lookup = dyn Fn(&str) -> Result<CredentialRecord, LookupError> + Send + Sync;

/// A [`CredentialGetter`] answering through a closure.
pub struct FakeCredentialGetter {
    lookup: Box<Lookup>,
}

impl FakeCredentialGetter {
    pub fn new(
        lookup: impl Fn(&str) -> Result<CredentialRecord, LookupError> + Send + Sync + 'static,
    ) -> Self {
        Self { lookup: Box::new(lookup) }
    }

    /// Knows exactly one credential.
    pub fn single(record: CredentialRecord) -> Self {
        Self::new(move |fingerprint| {
            if fingerprint == record.fingerprint {
                Ok(record.clone())
            } else {
                Err(LookupError::NotFound { context: None })
            }
        })
    }
}

impl std::fmt::Debug for FakeCredentialGetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeCredentialGetter").finish_non_exhaustive()
    }
}

impl CredentialGetter for FakeCredentialGetter {
    fn get_credential(&self, fingerprint: &str) -> Result<CredentialRecord, LookupError> {
        (self.lookup)(fingerprint)
    }
}

/// An authenticator that knows only [`client`] under `acct-1`.
#[must_use]
pub fn authenticator() -> Authenticator {
    authenticator_with(FakeCredentialGetter::single(record_of(client(), "acct-1")))
}

#[must_use]
pub fn authenticator_with(getter: FakeCredentialGetter) -> Authenticator {
    Authenticator::new(MethodSignature::new(Arc::new(getter)))
}

#[must_use]
pub fn request(method: &str, uri: &str, body: &[u8]) -> HttpRequest {
    http::Request::builder().method(method).uri(uri).body(body.to_vec()).expect("valid request")
}

/// A request with a current `Date` and the given raw `Authorization` value.
#[must_use]
pub fn with_authorization(authorization: &str) -> HttpRequest {
    let mut req = request("GET", "/repos/jdoe/catpictures", b"");
    req.headers_mut()
        .insert(DATE, HeaderValue::from_str(&format_http_date(Utc::now())).expect("date header"));
    req.headers_mut()
        .insert(AUTHORIZATION, HeaderValue::from_str(authorization).expect("authorization header"));
    req
}
