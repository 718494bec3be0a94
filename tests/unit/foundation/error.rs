use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StripError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        StripError::resource("x")
            .to_string()
            .contains("resource error:")
    );
    assert!(
        StripError::encoding("x")
            .to_string()
            .contains("encoding error:")
    );
    assert!(
        StripError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StripError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn public_message_drops_prefix() {
    assert_eq!(StripError::validation("empty layout").public_message(), "empty layout");
}
