use serde_json::json;
use sigil_domain::{AccountId, AuthResult, Credential};

#[test]
fn account_id_is_transparent_on_the_wire() {
    let id = AccountId::new("7Hk2mPq9XzA4");
    assert_eq!(serde_json::to_value(&id).unwrap(), json!("7Hk2mPq9XzA4"));
    assert_eq!(id.to_string(), "7Hk2mPq9XzA4");
}

#[test]
fn auth_result_and_credential_round_trip() {
    let result = AuthResult { fingerprint: "ab12".into(), account_id: "acct".into() };
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value, json!({ "fingerprint": "ab12", "account_id": "acct" }));

    let credential =
        Credential { account_id: "acct".into(), fingerprint: "ab12".into(), verifier: vec![1, 2] };
    let back: Credential =
        serde_json::from_value(serde_json::to_value(&credential).unwrap()).unwrap();
    assert_eq!(back, credential);
}
