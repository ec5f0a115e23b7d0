use aeos_auth::{AuthSession, Authenticator, User};

use super::error::ServiceError;

pub async fn register(
    authenticator: &Authenticator,
    email: &str,
    password: &str,
    name: Option<&str>,
) -> Result<User, ServiceError> {
    Ok(authenticator
        .register_with_password(email, password, name)
        .await?)
}

pub async fn login(
    authenticator: &Authenticator,
    email: &str,
    password: &str,
) -> Result<(User, AuthSession), ServiceError> {
    Ok(authenticator.login_with_password(email, password).await?)
}

pub async fn logout(authenticator: &Authenticator, token: &str) -> Result<(), ServiceError> {
    Ok(authenticator.revoke_session(token).await?)
}
