use jiff::{SignedDuration, Timestamp};
use psyscale_auth::credentials::{
    new_user, patient_initial_password, patient_login, professional_initial_password,
    professional_login,
};
use psyscale_auth::error::AuthError;
use psyscale_auth::jwt::{JwtConfig, issue_token, validate_token};
use psyscale_auth::lockout::{LockoutPolicy, attempt_login};
use psyscale_auth::password::{hash_password, validate_password_strength, verify_password};
use psyscale_core::models::Role;
use uuid::Uuid;

fn config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret".to_string(),
        ttl_minutes: 60,
    }
}

#[test]
fn hash_and_verify() {
    let hash = hash_password("segredo123").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(verify_password("segredo123", &hash).unwrap());
    assert!(!verify_password("errado", &hash).unwrap());
    assert!(verify_password("segredo123", "not-a-hash").is_err());
}

#[test]
fn password_strength() {
    assert!(validate_password_strength("abc12").is_err());
    assert!(validate_password_strength("abc123").is_ok());
}

#[test]
fn generated_passwords() {
    assert_eq!(patient_initial_password("12345678901"), "123456");
    assert_eq!(patient_initial_password("123.456.789-01"), "123456");

    let p = professional_initial_password();
    assert_eq!(p.len(), 6);
    assert!(p.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn generated_logins() {
    let now = Timestamp::UNIX_EPOCH;
    let patient_id = Uuid::new_v4();
    let login = patient_login(" Ana@Example.com ", patient_id, "98765432100", now).unwrap();
    assert_eq!(login.password, "987654");
    assert_eq!(login.user.email, "ana@example.com");
    assert_eq!(login.user.role, Role::Patient);
    assert_eq!(login.user.account_id, Some(patient_id));
    assert!(!login.user.force_password_reset);
    assert!(verify_password("987654", &login.user.password_hash).unwrap());

    let login = professional_login("dr@example.com", Uuid::new_v4(), now).unwrap();
    assert_eq!(login.user.role, Role::Professional);
    assert!(login.user.force_password_reset);
    assert!(verify_password(&login.password, &login.user.password_hash).unwrap());
}

#[test]
fn token_round_trip() {
    let user = new_user("admin@example.com", Role::Admin, None, "admin123", false, Timestamp::now())
        .unwrap();
    let token = issue_token(&user, &config(), Timestamp::now()).unwrap();
    let claims = validate_token(&token, &config()).unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.account_id, None);
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[test]
fn token_signed_with_other_secret_is_rejected() {
    let user = new_user("a@example.com", Role::Patient, Some(Uuid::new_v4()), "abc123", false, Timestamp::now())
        .unwrap();
    let token = issue_token(&user, &config(), Timestamp::now()).unwrap();
    let other = JwtConfig {
        secret: "other".to_string(),
        ttl_minutes: 60,
    };
    assert!(matches!(
        validate_token(&token, &other),
        Err(AuthError::InvalidToken(_))
    ));
    assert!(matches!(
        validate_token("garbage", &config()),
        Err(AuthError::InvalidToken(_))
    ));
}

#[test]
fn expired_token_is_rejected() {
    let user = new_user("a@example.com", Role::Admin, None, "abc123", false, Timestamp::now()).unwrap();
    let issued = Timestamp::now() - SignedDuration::from_hours(2);
    let token = issue_token(&user, &config(), issued).unwrap();
    assert!(matches!(
        validate_token(&token, &config()),
        Err(AuthError::TokenExpired)
    ));
}

#[test]
fn lockout_after_max_attempts() {
    let policy = LockoutPolicy {
        max_attempts: 3,
        unlock_after: SignedDuration::from_mins(30),
    };
    let now = Timestamp::UNIX_EPOCH;
    let mut user = new_user("a@example.com", Role::Admin, None, "certa1", false, now).unwrap();

    assert!(matches!(
        attempt_login(&mut user, "errada", &policy, now),
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        attempt_login(&mut user, "errada", &policy, now),
        Err(AuthError::InvalidCredentials)
    ));
    assert_eq!(user.failed_attempts, 2);

    // Third failure locks.
    assert!(matches!(
        attempt_login(&mut user, "errada", &policy, now),
        Err(AuthError::Locked { .. })
    ));
    assert_eq!(user.locked_at, Some(now));
    assert!(policy.is_locked(&user, now));

    // Even the right password is refused while locked.
    let later = now + SignedDuration::from_mins(29);
    assert!(matches!(
        attempt_login(&mut user, "certa1", &policy, later),
        Err(AuthError::Locked { .. })
    ));

    // After the unlock interval the right password works and resets state.
    let unlocked = now + SignedDuration::from_mins(30);
    attempt_login(&mut user, "certa1", &policy, unlocked).unwrap();
    assert_eq!(user.failed_attempts, 0);
    assert_eq!(user.locked_at, None);
}

#[test]
fn success_resets_failure_count() {
    let policy = LockoutPolicy::default();
    let now = Timestamp::UNIX_EPOCH;
    let mut user = new_user("a@example.com", Role::Admin, None, "certa1", false, now).unwrap();
    let _ = attempt_login(&mut user, "errada", &policy, now);
    assert_eq!(user.failed_attempts, 1);
    attempt_login(&mut user, "certa1", &policy, now).unwrap();
    assert_eq!(user.failed_attempts, 0);
}
