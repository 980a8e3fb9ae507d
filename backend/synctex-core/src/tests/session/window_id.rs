use crate::session::WindowId;

#[test]
fn given_window_id_when_displayed_then_lowercase_hex() {
    assert_eq!(WindowId(0x1001).to_string(), "0x1001");
    assert_eq!(WindowId(0xABCDEF).to_string(), "0xabcdef");
}

/// **VALUE**: Both hex and decimal spellings parse to the same id.
///
/// **WHY THIS MATTERS**: Older bindings and some platform APIs spell native
/// handles in decimal. The callback must accept either.
#[test]
fn given_hex_or_decimal_when_parsed_then_same_id() {
    let hex: WindowId = "0x1001".parse().expect("hex should parse");
    let upper: WindowId = "0X1001".parse().expect("upper prefix should parse");
    let decimal: WindowId = "4097".parse().expect("decimal should parse");

    assert_eq!(hex, WindowId(4097));
    assert_eq!(upper, hex);
    assert_eq!(decimal, hex);
}

#[test]
fn given_garbage_when_parsed_then_error() {
    assert!("".parse::<WindowId>().is_err());
    assert!("0x".parse::<WindowId>().is_err());
    assert!("window".parse::<WindowId>().is_err());
    assert!("-1".parse::<WindowId>().is_err());
}
