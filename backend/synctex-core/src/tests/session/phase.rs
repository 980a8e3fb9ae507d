use crate::session::SessionPhase;

/// **VALUE**: Without a secret the session is `Uninitialized`, whatever else happened.
///
/// **BUG THIS CATCHES**: Reporting `ListenerActive` for a session whose listener
/// is up but will reject every callback.
#[test]
fn given_no_secret_when_derive_then_uninitialized() {
    assert_eq!(SessionPhase::derive(false, 0, false), SessionPhase::Uninitialized);
    assert_eq!(SessionPhase::derive(false, 5, true), SessionPhase::Uninitialized);
}

#[test]
fn given_secret_when_derive_then_advances_with_bindings_and_listener() {
    assert_eq!(SessionPhase::derive(true, 0, true), SessionPhase::SecretProvisioned);
    assert_eq!(SessionPhase::derive(true, 1, false), SessionPhase::Bound);
    assert_eq!(SessionPhase::derive(true, 3, true), SessionPhase::ListenerActive);
}
