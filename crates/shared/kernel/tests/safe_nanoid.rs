use moringa_kernel::SAFE_ALPHABET;
use moringa_kernel::safe_nanoid;
use std::collections::HashSet;

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
    let id = safe_nanoid!(16);
    assert_eq!(id.len(), 16);
}

#[test]
fn ids_do_not_repeat() {
    let ids: HashSet<String> = (0..1_000).map(|_| safe_nanoid!(16)).collect();
    assert_eq!(ids.len(), 1_000);
}
