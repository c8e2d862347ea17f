// Mini-App init-data validation: signatures, tampering, expiry.

use club_portal::middleware::{sign_check_string, validate_init_data};

const BOT_TOKEN: &str = "1234567890:TEST_TOKEN_abcdef";

fn build_init_data(
    bot_token: &str,
    user_json: &str,
    auth_date: i64,
    start_param: Option<&str>,
) -> String {
    let mut fields = vec![
        ("auth_date".to_string(), auth_date.to_string()),
        ("user".to_string(), user_json.to_string()),
    ];
    if let Some(param) = start_param {
        fields.push(("start_param".to_string(), param.to_string()));
    }
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let check_string = fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("\n");
    let hash = sign_check_string(&check_string, bot_token).unwrap();

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in &fields {
        serializer.append_pair(key, value);
    }
    serializer.append_pair("hash", &hash);
    serializer.finish()
}

fn fresh_auth_date() -> i64 {
    chrono::Utc::now().timestamp()
}

#[test]
fn valid_init_data_is_accepted() {
    let user_json = r#"{"id":42,"username":"member","first_name":"Ada"}"#;
    let raw = build_init_data(BOT_TOKEN, user_json, fresh_auth_date(), Some("utm1_fb"));

    let init = validate_init_data(&raw, BOT_TOKEN).unwrap();
    assert_eq!(init.user.id, 42);
    assert_eq!(init.user.username.as_deref(), Some("member"));
    assert_eq!(init.start_param.as_deref(), Some("utm1_fb"));
}

#[test]
fn tampered_payload_is_rejected() {
    let user_json = r#"{"id":42,"username":"member"}"#;
    let raw = build_init_data(BOT_TOKEN, user_json, fresh_auth_date(), None);

    // Swap the user id after signing.
    let tampered = raw.replace("%22id%22%3A42", "%22id%3A%2299");
    assert!(validate_init_data(&tampered, BOT_TOKEN).is_err());
}

#[test]
fn wrong_bot_token_is_rejected() {
    let user_json = r#"{"id":42}"#;
    let raw = build_init_data("other:token", user_json, fresh_auth_date(), None);
    assert!(validate_init_data(&raw, BOT_TOKEN).is_err());
}

#[test]
fn missing_hash_is_rejected() {
    let err = validate_init_data("auth_date=1&user=%7B%22id%22%3A1%7D", BOT_TOKEN);
    assert!(err.is_err());
}

#[test]
fn stale_auth_date_is_rejected() {
    let user_json = r#"{"id":42}"#;
    let two_days_ago = fresh_auth_date() - 2 * 86_400;
    let raw = build_init_data(BOT_TOKEN, user_json, two_days_ago, None);
    assert!(validate_init_data(&raw, BOT_TOKEN).is_err());
}

#[test]
fn init_data_without_user_is_rejected() {
    let auth_date = fresh_auth_date().to_string();
    let check_string = format!("auth_date={}", auth_date);
    let hash = sign_check_string(&check_string, BOT_TOKEN).unwrap();
    let raw = format!("auth_date={}&hash={}", auth_date, hash);
    assert!(validate_init_data(&raw, BOT_TOKEN).is_err());
}
