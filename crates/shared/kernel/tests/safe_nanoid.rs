use sigil_kernel::{SAFE_ALPHABET, new_account_id, safe_nanoid};

#[test]
fn generates_expected_length_and_charset() {
    let id = safe_nanoid!();
    assert_eq!(id.len(), 12);

    for ch in id.chars() {
        assert!(SAFE_ALPHABET.contains(&ch), "unexpected character in nanoid: {ch}");
    }
}

#[test]
fn custom_length() {
    let id = safe_nanoid!(20);
    assert_eq!(id.len(), 20);
}

#[test]
fn account_ids_are_unique_and_safe() {
    let first = new_account_id();
    let second = new_account_id();

    assert_ne!(first, second);
    assert!(first.as_str().chars().all(|ch| SAFE_ALPHABET.contains(&ch)));
}
