use fridgewise_auth::{create_access_token, verify_token};
use fridgewise_config::JwtConfig;

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
    }
}

#[test]
fn test_verify_token_round_trips_subject() {
    let jwt_config = get_test_jwt_config();

    let token = create_access_token("user-42", "cook@example.com", &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.sub, "user-42");
    assert_eq!(claims.email, "cook@example.com");
    assert!(claims.exp > claims.iat);
}

#[test]
fn test_distinct_users_get_distinct_subjects() {
    let jwt_config = get_test_jwt_config();

    let first = create_access_token("alice", "alice@example.com", &jwt_config).unwrap();
    let second = create_access_token("bob", "bob@example.com", &jwt_config).unwrap();

    assert_ne!(first, second);
    assert_ne!(
        verify_token(&first, &jwt_config).unwrap().sub,
        verify_token(&second, &jwt_config).unwrap().sub
    );
}

#[test]
fn test_verify_token_rejects_other_secret() {
    let token = create_access_token("user-42", "cook@example.com", &get_test_jwt_config()).unwrap();

    let other = JwtConfig {
        secret: "a_completely_different_secret".to_string(),
        access_token_expiry: 3600,
    };
    let err = verify_token(&token, &other).unwrap_err();
    assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
}

#[test]
fn test_verify_token_rejects_garbage() {
    let jwt_config = get_test_jwt_config();

    assert!(verify_token("", &jwt_config).is_err());
    assert!(verify_token("not.a.token", &jwt_config).is_err());
}
