use crate::services::mpris::identifiers::{
    BusIdentity, HASH_SEED, combine_ordered, murmur3_32, track_id, track_object_path,
};

#[test]
fn murmur3_matches_reference_vectors() {
    assert_eq!(murmur3_32(b"", 0), 0);
    assert_eq!(murmur3_32(b"", 1), 0x514e_28b7);
    assert_eq!(murmur3_32(b"hello", 0), 0x248b_fa47);
    assert_eq!(murmur3_32(b"Hello, world!", 1234), 0xfaf6_cdb3);
    assert_eq!(
        murmur3_32(b"The quick brown fox jumps over the lazy dog", 0x9747_b28c),
        0x2fa8_26cd
    );
}

#[test]
fn combine_single_hash_is_identity() {
    assert_eq!(combine_ordered(&[0xdead_beef]), 0xdead_beef);
}

#[test]
fn combine_is_order_sensitive() {
    let a = murmur3_32(b"alpha", HASH_SEED);
    let b = murmur3_32(b"beta", HASH_SEED);

    assert_ne!(combine_ordered(&[a, b]), combine_ordered(&[b, a]));
}

#[test]
fn track_id_known_values() {
    assert_eq!(track_id("Song", "id-1"), 2_433_891_519);
    assert_eq!(track_id("id-1", "Song"), 2_779_909_131);
}

#[test]
fn track_path_is_deterministic() {
    let first = track_object_path("com.example.app", "Song", "id-1");
    let second = track_object_path("com.example.app", "Song", "id-1");

    assert_eq!(first, second);
    assert_eq!(first, "/com/example/app/2433891519");
}

#[test]
fn swapped_title_and_media_id_differ() {
    let path = track_object_path("com.example.app", "Song", "id-1");
    let swapped = track_object_path("com.example.app", "id-1", "Song");

    assert_ne!(path, swapped);
}

#[test]
fn track_path_sanitizes_namespace() {
    let id = track_id("Song", "id-1");

    assert_eq!(
        track_object_path("com.my-app..beta", "Song", "id-1"),
        format!("/com/my_app/beta/{id}")
    );
    assert_eq!(track_object_path("", "Song", "id-1"), format!("/{id}"));
}

#[test]
fn bus_identity_renders_eight_hex_digits() {
    let identity = BusIdentity::from_hash(0xab);

    assert_eq!(identity.suffix(), "000000ab");
    assert_eq!(
        identity.bus_name("org.mpris.MediaPlayer2"),
        "org.mpris.MediaPlayer2.x000000ab"
    );
}

#[test]
fn generated_bus_identity_is_valid_suffix() {
    let identity = BusIdentity::generate();

    assert_eq!(identity.suffix().len(), 8);
    assert!(
        identity
            .suffix()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    );
}
