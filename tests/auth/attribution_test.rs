// Deep-link attribution: start-param parsing and first-touch semantics.

use club_portal::services::attribution::parse_start_param;
use club_portal::types::UserRecord;

#[test]
fn five_slot_param_fills_every_tag() {
    let tags = parse_start_param(Some("utm1_fb__utm2_cpc__utm3_spring__utm4_a__utm5_b"));
    assert_eq!(tags.utm_1.as_deref(), Some("fb"));
    assert_eq!(tags.utm_2.as_deref(), Some("cpc"));
    assert_eq!(tags.utm_3.as_deref(), Some("spring"));
    assert_eq!(tags.utm_4.as_deref(), Some("a"));
    assert_eq!(tags.utm_5.as_deref(), Some("b"));
}

#[test]
fn partial_param_leaves_other_slots_none() {
    let tags = parse_start_param(Some("utm2_cpc"));
    assert_eq!(tags.utm_1, None);
    assert_eq!(tags.utm_2.as_deref(), Some("cpc"));
    assert_eq!(tags.utm_5, None);
}

#[test]
fn repeated_slot_keeps_the_last_value() {
    let tags = parse_start_param(Some("utm1_first__utm1_second"));
    assert_eq!(tags.utm_1.as_deref(), Some("second"));
}

#[test]
fn applying_tags_writes_only_parsed_slots() {
    let mut user = UserRecord::new("42");
    let tags = parse_start_param(Some("utm1_fb__utm3_retarget"));
    tags.apply_to_user(&mut user);

    assert_eq!(user.utm_1.as_deref(), Some("fb"));
    assert_eq!(user.utm_2, None);
    assert_eq!(user.utm_3.as_deref(), Some("retarget"));
}

#[test]
fn garbage_params_yield_no_tags() {
    for raw in ["", "   ", "ref_code_only", "utm6_nope", "utm1_"] {
        let tags = parse_start_param(Some(raw));
        assert!(tags.is_empty(), "{:?} should parse to nothing", raw);
    }
}
