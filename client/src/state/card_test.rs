use super::*;
use crate::test_helpers::user_fixture;

#[test]
fn accent_follows_role() {
    assert_eq!(Accent::for_role(Some(Role::Permanent)), Accent::Amber);
    assert_eq!(Accent::for_role(Some(Role::Normal)), Accent::Blue);
    assert_eq!(Accent::for_role(Some(Role::Associated)), Accent::Teal);
    assert_eq!(Accent::for_role(Some(Role::Head)), Accent::Purple);
    assert_eq!(Accent::for_role(None), Accent::Gray);
}

#[test]
fn approved_member_card() {
    let mut user = user_fixture("9876543210", Some(Role::Permanent), Status::Active);
    user.full_name = Some("Sita Rama".into());
    user.member_id = Some("Pid-004".into());
    user.gotram = Some("Kasyapa".into());

    let card = IdCard::from_user(&user);
    assert_eq!(card.full_name, "Sita Rama");
    assert_eq!(card.member_id_label(), "Pid-004");
    assert_eq!(card.role_label(), "PERMANENT");
    assert_eq!(card.file_name(), "Parishat-ID-Pid-004.jpg");

    let text = card.render_text();
    assert!(text.contains("[amber]"));
    assert!(text.contains("Pid-004"));
    assert!(text.contains("Kasyapa"));
    assert!(text.contains("Zonal Committee  N/A"));
}

#[test]
fn pending_member_card_uses_placeholders() {
    let user = user_fixture("9876543210", None, Status::Pending);
    let card = IdCard::from_user(&user);
    assert_eq!(card.full_name, "9876543210");
    assert_eq!(card.member_id_label(), "PENDING");
    assert_eq!(card.role_label(), "N/A");
    assert_eq!(card.file_name(), "Parishat-ID-Member.jpg");
}

#[test]
fn blank_member_id_treated_as_missing() {
    let mut user = user_fixture("1", Some(Role::Normal), Status::Active);
    user.member_id = Some("  ".into());
    assert_eq!(IdCard::from_user(&user).file_name(), "Parishat-ID-Member.jpg");
}
