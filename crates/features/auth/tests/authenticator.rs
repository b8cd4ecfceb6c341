pub mod fixtures;

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use fixtures::*;
use http::HeaderValue;
use http::header::{AUTHORIZATION, DATE};
use sigil_auth::prelude::*;
use sigil_auth::signature::format_http_date;

fn signed(method: &str, uri: &str, body: &[u8]) -> HttpRequest {
    let mut req = request(method, uri, body);
    client().add_authentication(&mut req).unwrap();
    req
}

fn copy_auth(from: &HttpRequest, to: &mut HttpRequest) {
    for name in [DATE, AUTHORIZATION] {
        to.headers_mut().insert(name.clone(), from.headers()[&name].clone());
    }
}

#[test]
fn test_sign_then_verify() {
    let req = signed("POST", "/repos/jdoe/catpictures?page=2", br#"{"name":"cat"}"#);

    let result = authenticator().verify(&req).unwrap();
    assert_eq!(result.fingerprint, client().fingerprint());
    assert_eq!(result.account_id.as_str(), "acct-1");
}

#[test]
fn test_sign_then_verify_empty_body() {
    let req = signed("DELETE", "/secrets/42", b"");
    assert!(authenticator().verify(&req).is_ok());
}

#[test]
fn test_missing_date() {
    let mut req = signed("GET", "/", b"");
    req.headers_mut().remove(DATE);

    assert!(matches!(authenticator().verify(&req), Err(AuthError::DateParse { .. })));
}

#[test]
fn test_empty_date() {
    let mut req = signed("GET", "/", b"");
    req.headers_mut().insert(DATE, HeaderValue::from_static(""));

    assert!(matches!(authenticator().verify(&req), Err(AuthError::DateParse { .. })));
}

#[test]
fn test_rfc3339_date() {
    let mut req = signed("GET", "/", b"");
    req.headers_mut().insert(DATE, HeaderValue::from_static("2016-04-01T12:00:00Z"));

    assert!(matches!(authenticator().verify(&req), Err(AuthError::DateParse { .. })));
}

#[test]
fn test_stale_date() {
    let mut req = request("GET", "/", b"");
    let old = format_http_date(Utc::now() - TimeDelta::hours(1));
    req.headers_mut().insert(DATE, HeaderValue::from_str(&old).unwrap());
    client().add_authentication(&mut req).unwrap();

    assert!(matches!(authenticator().verify(&req), Err(AuthError::StaleRequest { .. })));
    assert!(authenticator().with_max_clock_skew(None).verify(&req).is_ok());
}

#[test]
fn test_missing_authorization() {
    let mut req = signed("GET", "/", b"");
    req.headers_mut().remove(AUTHORIZATION);

    assert!(matches!(
        authenticator().verify(&req),
        Err(AuthError::InvalidAuthorizationHeader { .. })
    ));
}

#[test]
fn test_invalid_authorization_headers() {
    for header in [
        "",
        "Basic username:password",
        "sigil-sig-v1 no_colon_here",
        "sigil-sig-v1 foo:bar:baz:extra",
        "sigil-sig-v1 :signature",
        "sigil-sig-v1 fingerprint:",
        "sigil-sig-v1",
        "Sigil-Sig3 foo:bar",
    ] {
        let err = authenticator().verify(&with_authorization(header)).unwrap_err();
        assert!(
            matches!(err, AuthError::InvalidAuthorizationHeader { .. }),
            "{header:?} produced {err:?}"
        );
    }
}

#[test]
fn test_outdated_protocols() {
    for header in ["Sigil foo:bar:baz", "Sigil-Sig2 foo:bar"] {
        let err = authenticator().verify(&with_authorization(header)).unwrap_err();
        assert_eq!(err.code(), "outdated_signature_protocol", "{header:?}");
    }
}

#[test]
fn test_signature_not_base64() {
    let err = authenticator()
        .verify(&with_authorization(
            "sigil-sig-v1 RSA$base64_encoded_fingerprint:signature_not_base64",
        ))
        .unwrap_err();

    assert!(matches!(err, AuthError::MalformedSignature { .. }));
}

#[test]
fn test_unknown_fingerprint_looks_like_bad_signature() {
    let unknown = signed("GET", "/", b"");
    let unknown_err = authenticator_with(FakeCredentialGetter::new(|_| {
        Err(LookupError::NotFound { context: Some("no such row".into()) })
    }))
    .verify(&unknown)
    .unwrap_err();

    let header = format!("sigil-sig-v1 {}:c2lnbmF0dXJl", client().fingerprint());
    let bad_err = authenticator().verify(&with_authorization(&header)).unwrap_err();

    assert!(matches!(unknown_err, AuthError::SignatureNotVerified { .. }));
    assert_eq!(unknown_err.code(), bad_err.code());
    assert_eq!(unknown_err.to_string(), bad_err.to_string());
}

#[test]
fn test_lookup_backend_error_is_propagated() {
    let req = signed("GET", "/", b"");
    let err = authenticator_with(FakeCredentialGetter::new(|_| {
        Err(LookupError::Backend { message: "connection reset".into(), context: None })
    }))
    .verify(&req)
    .unwrap_err();

    assert!(matches!(err, AuthError::Lookup { source: LookupError::Backend { .. }, .. }));
    assert!(err.to_string().contains("connection reset"));
}

#[test]
fn test_stored_key_mismatch() {
    // The fingerprint is registered, but with someone else's key.
    let mut record = record_of(impostor(), "acct-1");
    record.fingerprint = client().fingerprint().to_owned();

    let err = authenticator_with(FakeCredentialGetter::single(record))
        .verify(&signed("GET", "/", b""))
        .unwrap_err();
    assert!(matches!(err, AuthError::SignatureNotVerified { .. }));
}

#[test]
fn test_unusable_stored_verifier() {
    let mut record = record_of(client(), "acct-1");
    record.verifier = b"not a key".to_vec();

    let err = authenticator_with(FakeCredentialGetter::single(record))
        .verify(&signed("GET", "/", b""))
        .unwrap_err();
    assert!(matches!(err, AuthError::SignatureNotVerified { .. }));
}

#[test]
fn test_foreign_signature_under_claimed_fingerprint() {
    let mut req = request("GET", "/", b"");
    impostor().add_authentication(&mut req).unwrap();

    let forged = req.headers()[AUTHORIZATION]
        .to_str()
        .unwrap()
        .replace(impostor().fingerprint(), client().fingerprint());
    req.headers_mut().insert(AUTHORIZATION, HeaderValue::from_str(&forged).unwrap());

    assert!(matches!(authenticator().verify(&req), Err(AuthError::SignatureNotVerified { .. })));
}

#[test]
fn test_replay_on_other_route() {
    let original = signed("GET", "/repos/jdoe/catpictures", b"");
    let mut replay = request("GET", "/repos/jdoe/dogpictures", b"");
    copy_auth(&original, &mut replay);

    assert!(matches!(authenticator().verify(&replay), Err(AuthError::SignatureNotVerified { .. })));
}

#[test]
fn test_replay_with_other_query() {
    let original = signed("GET", "/secrets?page=1", b"");
    let mut replay = request("GET", "/secrets?page=2", b"");
    copy_auth(&original, &mut replay);

    assert!(matches!(authenticator().verify(&replay), Err(AuthError::SignatureNotVerified { .. })));
}

#[test]
fn test_replay_with_other_method() {
    let original = signed("GET", "/secrets/42", b"");
    let mut replay = request("DELETE", "/secrets/42", b"");
    copy_auth(&original, &mut replay);

    assert!(matches!(authenticator().verify(&replay), Err(AuthError::SignatureNotVerified { .. })));
}

#[test]
fn test_replay_with_other_body() {
    let original = signed("POST", "/secrets", br#"{"value":"a"}"#);
    let mut replay = request("POST", "/secrets", br#"{"value":"b"}"#);
    copy_auth(&original, &mut replay);

    assert!(matches!(authenticator().verify(&replay), Err(AuthError::SignatureNotVerified { .. })));
}

#[test]
fn test_replay_with_empty_body() {
    let original = signed("POST", "/secrets", br#"{"value":"a"}"#);
    let mut replay = request("POST", "/secrets", b"");
    copy_auth(&original, &mut replay);

    assert!(matches!(authenticator().verify(&replay), Err(AuthError::SignatureNotVerified { .. })));
}

#[test]
fn test_second_verification_method() {
    struct Static;

    impl VerificationMethod for Static {
        fn scheme(&self) -> &str {
            "Static"
        }

        fn verify(
            &self,
            _: &HttpRequest,
            headers: &sigil_auth::signature::SignedHeaders<'_>,
        ) -> Result<sigil_domain::AuthResult, AuthError> {
            Ok(sigil_domain::AuthResult {
                fingerprint: headers.credentials.to_owned(),
                account_id: "static".into(),
            })
        }
    }

    let getter = FakeCredentialGetter::single(record_of(client(), "acct-1"));
    let authenticator =
        Authenticator::new(MethodSignature::new(Arc::new(getter))).with_method(Static);

    assert_eq!(
        authenticator.verify(&with_authorization("Static token")).unwrap().account_id.as_str(),
        "static"
    );
    assert!(authenticator.verify(&signed("GET", "/", b"")).is_ok());
}
