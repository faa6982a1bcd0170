use crate::config::TenantConfig;
use crate::error::{Error, Result};
use serde::Deserialize;

pub const TOKEN_PATH: &str = "/services/oauth2/token";

/// OAuth username-password grant for a tenant's connected app.
pub struct PasswordGrant<'a> {
    tenant: &'a TenantConfig,
    password: String,
}

impl<'a> PasswordGrant<'a> {
    pub fn new(tenant: &'a TenantConfig) -> Self {
        // The security token is appended to the password for API logins.
        let password = format!("{}{}", tenant.password, tenant.security_token);
        Self { tenant, password }
    }

    /// Form fields for the token request.
    pub fn form(&self) -> [(&str, &str); 5] {
        [
            ("grant_type", "password"),
            ("client_id", self.tenant.consumer_key.as_str()),
            ("client_secret", self.tenant.consumer_secret.as_str()),
            ("username", self.tenant.username.as_str()),
            ("password", self.password.as_str()),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Bearer token handed out by the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Pull the access token out of a token endpoint response body.
    pub fn from_response(status: u16, body: &str) -> Result<Self> {
        let response: TokenResponse = serde_json::from_str(body).map_err(|_| {
            Error::Authentication(format!("token endpoint returned {}: {}", status, body))
        })?;

        match response {
            TokenResponse {
                access_token: Some(token),
                ..
            } if !token.is_empty() => Ok(Self(token)),
            TokenResponse {
                error: Some(error),
                error_description,
                ..
            } => Err(Error::Authentication(match error_description {
                Some(description) => format!("{}: {}", error, description),
                None => error,
            })),
            _ => Err(Error::Authentication(format!(
                "token endpoint returned {} without an access token: {}",
                status, body
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialStore;

    fn tenant() -> TenantConfig {
        CredentialStore::from_json(
            r#"{"acme": {
                "username": "integration@acme.com", "password": "pw",
                "securityToken": "TOKEN", "consumerKey": "key",
                "consumerSecret": "secret", "salesforceURL": "acme.my.salesforce.com"
            }}"#,
        )
        .unwrap()
        .tenant("acme")
        .unwrap()
    }

    #[test]
    fn test_password_grant_form() {
        let tenant = tenant();
        let grant = PasswordGrant::new(&tenant);
        let form = grant.form();

        assert!(form.contains(&("grant_type", "password")));
        assert!(form.contains(&("client_id", "key")));
        assert!(form.contains(&("client_secret", "secret")));
        assert!(form.contains(&("username", "integration@acme.com")));
        assert!(form.contains(&("password", "pwTOKEN")));
    }

    #[test]
    fn test_token_accepted() {
        let token = AccessToken::from_response(
            200,
            r#"{"access_token":"00Dxx!AQ","instance_url":"https://acme.my.salesforce.com","token_type":"Bearer"}"#,
        )
        .unwrap();
        assert_eq!(token.as_str(), "00Dxx!AQ");
        assert_eq!(format!("{:?}", token), "AccessToken(***)");
    }

    #[test]
    fn test_oauth_error() {
        let err = AccessToken::from_response(
            400,
            r#"{"error":"invalid_grant","error_description":"authentication failure"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
        assert_eq!(
            err.to_string(),
            "authentication failed: invalid_grant: authentication failure"
        );
    }

    #[test]
    fn test_empty_or_missing_token() {
        assert!(matches!(
            AccessToken::from_response(200, r#"{"access_token":""}"#),
            Err(Error::Authentication(_))
        ));
        assert!(matches!(
            AccessToken::from_response(200, r#"{"token_type":"Bearer"}"#),
            Err(Error::Authentication(_))
        ));
        assert!(matches!(
            AccessToken::from_response(503, "<html>Service Unavailable</html>"),
            Err(Error::Authentication(_))
        ));
    }
}
