use super::*;

fn validation(msg: &str) -> ClientError {
    ClientError::Validation(msg.to_owned())
}

#[test]
fn sanitize_pin_input_keeps_four_digits() {
    assert_eq!(sanitize_pin_input("12a3-45"), "1234");
    assert_eq!(sanitize_pin_input("••"), "");
}

#[test]
fn validate_pin_requires_exactly_four_digits() {
    assert!(validate_pin("1234").is_ok());
    assert_eq!(validate_pin("123"), Err(validation(PIN_LENGTH_MESSAGE)));
    assert_eq!(validate_pin("12345"), Err(validation(PIN_LENGTH_MESSAGE)));
    assert_eq!(validate_pin("12a4"), Err(validation(PIN_LENGTH_MESSAGE)));
}

#[test]
fn validate_pin_rejects_non_ascii_digits() {
    // Arabic-Indic digits are numeric but not ASCII.
    assert!(validate_pin("١٢٣٤").is_err());
}

#[test]
fn confirmation_mismatch_reported_first() {
    assert_eq!(validate_pin_confirmation("12", "34"), Err(validation(PIN_MISMATCH_MESSAGE)));
    assert_eq!(validate_pin_confirmation("12", "12"), Err(validation(PIN_LENGTH_MESSAGE)));
    assert!(validate_pin_confirmation("4321", "4321").is_ok());
}

#[test]
fn normalize_phone_keeps_digits() {
    assert_eq!(normalize_phone("+91 98765-43210").unwrap(), "919876543210");
    assert_eq!(normalize_phone(" - "), Err(validation(PHONE_REQUIRED_MESSAGE)));
}

#[test]
fn normalize_email_lowercases_and_checks_shape() {
    assert_eq!(normalize_email(" Member@Parishat.ORG "), Some("member@parishat.org".into()));
    assert_eq!(normalize_email("no-at-sign"), None);
    assert_eq!(normalize_email("@domain"), None);
    assert_eq!(normalize_email("a@b@c"), None);
}

#[test]
fn validate_identifier_trims() {
    assert_eq!(validate_identifier(" 9876543210 ").unwrap(), "9876543210");
    assert_eq!(validate_identifier("  "), Err(validation(IDENTIFIER_REQUIRED_MESSAGE)));
}

#[test]
fn validate_register_builds_request() {
    let req = validate_register("98765 43210", "  Test User ", "1234", "1234").unwrap();
    assert_eq!(req, RegisterRequest { phone: "9876543210".into(), pin: "1234".into(), full_name: "Test User".into() });
}

#[test]
fn validate_register_requires_name() {
    assert_eq!(validate_register("9876543210", " ", "1234", "1234"), Err(validation(NAME_REQUIRED_MESSAGE)));
}

#[test]
fn validate_login_checks_pin_before_phone() {
    assert_eq!(validate_login("", "12"), Err(validation(PIN_LENGTH_MESSAGE)));
    assert_eq!(validate_login("", "1234"), Err(validation(PHONE_REQUIRED_MESSAGE)));
    assert_eq!(
        validate_login("9876543210", "1234").unwrap(),
        LoginRequest { phone: "9876543210".into(), pin: "1234".into() }
    );
}
