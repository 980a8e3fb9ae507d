use crate::SharedSecret;

/// **VALUE**: An empty secret never authenticates, whatever is presented.
///
/// **WHY THIS MATTERS**: When no secret was provisioned the viewer binding carries
/// an empty token. If empty-vs-empty compared equal, an unprovisioned session would
/// accept every loopback callback (fail open).
///
/// **BUG THIS CATCHES**: A `matches()` rewritten as plain `==`.
#[test]
fn given_empty_secret_when_matching_any_token_then_rejects() {
    // GIVEN: Empty and non-empty secrets
    let empty = SharedSecret::empty();
    let real = SharedSecret::new("abc123");

    // WHEN/THEN: Every combination involving an empty side is rejected
    assert!(!empty.matches(""), "empty vs empty must not match");
    assert!(!empty.matches("abc123"), "empty vs token must not match");
    assert!(!real.matches(""), "token vs empty must not match");
}

#[test]
fn given_provisioned_secret_when_matching_then_only_exact_token_accepted() {
    let secret = SharedSecret::new("abc123");

    assert!(secret.matches("abc123"));
    assert!(!secret.matches("abc124"));
    assert!(!secret.matches("abc12"));
    assert!(!secret.matches("abc1234"));
    assert!(!secret.matches("ABC123"));
}

/// **VALUE**: The token never shows up in Debug or Display output.
///
/// **BUG THIS CATCHES**: Someone adding `#[derive(Debug)]` back, which would put the
/// live session secret into every log line that formats a binding.
#[test]
fn given_secret_when_formatted_then_value_is_redacted() {
    let secret = SharedSecret::new("super-secret-token");

    let debug = format!("{secret:?}");
    let display = format!("{secret}");

    assert!(!debug.contains("super-secret-token"));
    assert!(!display.contains("super-secret-token"));
    assert!(debug.contains("REDACTED"));
    assert_eq!(format!("{:?}", SharedSecret::empty()), "SharedSecret(<empty>)");
}

#[test]
fn given_secret_when_serialized_then_fails() {
    let secret = SharedSecret::new("abc123");

    let result = serde_json::to_string(&secret);

    assert!(result.is_err(), "Secret must refuse serialization");
}

#[test]
fn given_tokens_with_separators_when_checked_then_not_embeddable() {
    assert!(SharedSecret::new("0f3a9c").is_embeddable());
    assert!(SharedSecret::empty().is_embeddable());
    assert!(!SharedSecret::new("has space").is_embeddable());
    assert!(!SharedSecret::new("tab\there").is_embeddable());
    assert!(!SharedSecret::new("quo\"te").is_embeddable());
}
