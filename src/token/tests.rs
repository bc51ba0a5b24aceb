use super::*;
use serde_json::json;

const SECRET: &str = "test-token-secret";

fn authority() -> TokenAuthority {
    TokenAuthority::new(SECRET, Duration::minutes(60))
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

fn sign_raw(payload: serde_json::Value, secret: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &payload,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod issue_tests {
    use super::*;

    #[test]
    fn issue_then_validate_returns_subject() {
        let tokens = authority();
        let token = tokens.issue("ORG1").unwrap();

        assert_eq!(tokens.validate(Some(&bearer(&token))), Ok("ORG1".to_string()));
    }

    #[test]
    fn token_has_three_parts() {
        let token = authority().issue("ORG1").unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn claims_carry_ttl_and_issuer() {
        let tokens = authority();
        let now = Utc::now();
        let token = tokens.issue_at("ORG1", now).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let claims = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims;

        assert_eq!(claims.sub, "ORG1");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, now.timestamp() + 3600);
        assert_eq!(claims.iss.as_deref(), Some(ISSUER));
    }
}

#[cfg(test)]
mod issue_range_tests {
    use super::*;

    #[test]
    fn expiry_past_representable_time_is_an_error() {
        let tokens = TokenAuthority::new(SECRET, Duration::days(100_000_000));

        assert!(matches!(
            tokens.issue("ORG1"),
            Err(TokenIssueError::ExpiryOutOfRange)
        ));
    }

    #[test]
    fn one_year_ttl_issues() {
        let tokens = TokenAuthority::new(SECRET, Duration::days(365));
        let token = tokens.issue("ORG1").unwrap();

        assert_eq!(tokens.validate(Some(&bearer(&token))), Ok("ORG1".to_string()));
    }
}

#[cfg(test)]
mod validate_tests {
    use super::*;

    #[test]
    fn expired_token() {
        let tokens = authority();
        let token = tokens
            .issue_at("ORG1", Utc::now() - Duration::hours(2))
            .unwrap();

        assert_eq!(
            tokens.validate(Some(&bearer(&token))),
            Err(Unauthenticated::Expired)
        );
    }

    #[test]
    fn expiry_instant_is_exclusive() {
        let tokens = authority();
        let issued = Utc::now();
        let token = tokens.issue_at("ORG1", issued).unwrap();
        let header = bearer(&token);

        let just_before = issued + Duration::minutes(60) - Duration::seconds(1);
        assert_eq!(tokens.validate_at(Some(&header), just_before), Ok("ORG1".to_string()));

        let at_expiry = issued + Duration::minutes(60);
        assert_eq!(
            tokens.validate_at(Some(&header), at_expiry),
            Err(Unauthenticated::Expired)
        );
    }

    #[test]
    fn issued_in_future_is_invalid() {
        let tokens = authority();
        let now = Utc::now();
        let token = tokens.issue_at("ORG1", now + Duration::minutes(5)).unwrap();

        assert_eq!(
            tokens.validate_at(Some(&bearer(&token)), now),
            Err(Unauthenticated::Invalid)
        );
    }

    #[test]
    fn missing_header() {
        assert_eq!(authority().validate(None), Err(Unauthenticated::Missing));
    }

    #[test]
    fn header_without_bearer_prefix() {
        let tokens = authority();
        let token = tokens.issue("ORG1").unwrap();

        assert_eq!(tokens.validate(Some(&token)), Err(Unauthenticated::Missing));
        assert_eq!(
            tokens.validate(Some(&format!("Token {}", token))),
            Err(Unauthenticated::Missing)
        );
        // Scheme is matched exactly
        assert_eq!(
            tokens.validate(Some(&format!("bearer {}", token))),
            Err(Unauthenticated::Missing)
        );
    }

    #[test]
    fn empty_bearer_token() {
        assert_eq!(
            authority().validate(Some("Bearer    ")),
            Err(Unauthenticated::Invalid)
        );
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let tokens = authority();
        let token = tokens.issue("ORG1").unwrap();
        let header = format!("Bearer {}  ", token);

        assert_eq!(tokens.validate(Some(&header)), Ok("ORG1".to_string()));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = TokenAuthority::new("other-secret", Duration::minutes(60))
            .issue("ORG1")
            .unwrap();

        assert_eq!(
            authority().validate(Some(&bearer(&token))),
            Err(Unauthenticated::Invalid)
        );
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert_eq!(
            authority().validate(Some("Bearer not.a.jwt")),
            Err(Unauthenticated::Invalid)
        );
    }

    #[test]
    fn missing_required_claims_are_invalid() {
        let now = Utc::now().timestamp();
        let tokens = authority();

        let no_iat = sign_raw(json!({"sub": "ORG1", "exp": now + 600}), SECRET);
        let no_exp = sign_raw(json!({"sub": "ORG1", "iat": now}), SECRET);
        let no_sub = sign_raw(json!({"iat": now, "exp": now + 600}), SECRET);

        for token in [no_iat, no_exp, no_sub] {
            assert_eq!(
                tokens.validate(Some(&bearer(&token))),
                Err(Unauthenticated::Invalid)
            );
        }
    }

    #[test]
    fn empty_subject_is_invalid() {
        let now = Utc::now().timestamp();
        let token = sign_raw(json!({"sub": "", "iat": now, "exp": now + 600}), SECRET);

        assert_eq!(
            authority().validate(Some(&bearer(&token))),
            Err(Unauthenticated::Invalid)
        );
    }

    #[test]
    fn issuer_is_not_required() {
        let now = Utc::now().timestamp();
        let token = sign_raw(json!({"sub": "ORG9", "iat": now, "exp": now + 600}), SECRET);

        assert_eq!(
            authority().validate(Some(&bearer(&token))),
            Ok("ORG9".to_string())
        );
    }

    #[test]
    fn unauthenticated_messages() {
        assert_eq!(Unauthenticated::Missing.to_string(), "missing bearer token");
        assert_eq!(Unauthenticated::Expired.to_string(), "token expired");
        assert_eq!(Unauthenticated::Invalid.to_string(), "invalid token");
    }
}
