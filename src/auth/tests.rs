use super::*;
use crate::credentials::XorCipher;
use crate::directory::InMemoryDirectory;
use chrono::Duration;

const SALT: &str = "SALT123";

fn authenticator() -> Authenticator {
    let verifier = CredentialVerifier::new(XorCipher::new("test-cipher-key"));
    let directory = InMemoryDirectory::new();

    for (id, number, stored) in [
        ("ORG1", "111", verifier.seal(SALT, "hunter2")),
        ("ORG2", "222", verifier.seal("", "plainpass")),
        ("ORG3", "333", "legacy plain".to_string()),
        ("ORG4", "444", verifier.seal("OLDSALT", "hunter2")),
    ] {
        directory
            .insert(Organization {
                org_id: id.to_string(),
                org_name: format!("{} name", id),
                business_number: number.to_string(),
                password_hash: stored,
            })
            .unwrap();
    }

    Authenticator::new(
        Arc::new(directory),
        verifier,
        TokenAuthority::new("test-token-secret", Duration::minutes(60)),
        SALT,
    )
}

#[cfg(test)]
mod authorization_header_tests {
    use super::*;

    #[test]
    fn present_header() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc".parse().unwrap());
        assert_eq!(authorization_header(&headers), Some("Bearer abc"));
    }

    #[test]
    fn missing_header() {
        assert_eq!(authorization_header(&HeaderMap::new()), None);
    }

    #[test]
    fn non_utf8_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            axum::http::HeaderValue::from_bytes(b"Bearer \xff").unwrap(),
        );
        assert_eq!(authorization_header(&headers), None);
    }
}

#[cfg(test)]
mod login_tests {
    use super::*;

    #[test]
    fn salted_login_issues_token() {
        let auth = authenticator();
        let session = auth.login("111", "hunter2").unwrap();

        assert_eq!(session.org_id, "ORG1");
        assert_eq!(session.org_name, "ORG1 name");
        assert_eq!(session.business_number, "111");

        let header = format!("Bearer {}", session.token);
        assert_eq!(auth.authenticate(Some(&header)), Ok("ORG1".to_string()));
    }

    #[test]
    fn unsalted_login() {
        let auth = authenticator();
        assert_eq!(auth.login("222", "plainpass").unwrap().org_id, "ORG2");
    }

    #[test]
    fn plaintext_login() {
        let auth = authenticator();
        assert_eq!(auth.login("333", "legacy plain").unwrap().org_id, "ORG3");
    }

    #[test]
    fn wrong_password() {
        let auth = authenticator();
        assert!(matches!(
            auth.login("111", "wrong"),
            Err(LoginError::PasswordMismatch)
        ));
        assert!(matches!(
            auth.login("333", "legacy"),
            Err(LoginError::PasswordMismatch)
        ));
    }

    #[test]
    fn salt_mismatch() {
        let auth = authenticator();
        assert!(matches!(
            auth.login("444", "hunter2"),
            Err(LoginError::SaltMismatch)
        ));
    }

    #[test]
    fn unknown_business_number() {
        let auth = authenticator();
        assert!(matches!(
            auth.login("999", "hunter2"),
            Err(LoginError::UnknownBusiness)
        ));
    }

    #[test]
    fn empty_fields_rejected() {
        let auth = authenticator();
        assert!(matches!(auth.login("", "hunter2"), Err(LoginError::MissingCredentials)));
        assert!(matches!(auth.login("111", ""), Err(LoginError::MissingCredentials)));
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;

    #[test]
    fn current_organization_from_token() {
        let auth = authenticator();
        let token = auth.tokens().issue("ORG2").unwrap();

        let org = auth
            .current_organization(Some(&format!("Bearer {}", token)))
            .unwrap();
        assert_eq!(org.business_number, "222");
    }

    #[test]
    fn token_for_removed_organization() {
        let auth = authenticator();
        let token = auth.tokens().issue("GONE").unwrap();

        assert_eq!(
            auth.current_organization(Some(&format!("Bearer {}", token))),
            Err(SessionError::UnknownOrganization)
        );
    }

    #[test]
    fn missing_token() {
        let auth = authenticator();
        assert_eq!(
            auth.current_organization(None),
            Err(SessionError::Unauthenticated(Unauthenticated::Missing))
        );
    }
}
