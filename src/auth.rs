use async_trait::async_trait;
use pgwire::api::auth::{AuthSource, LoginInfo, Password};
use pgwire::error::PgWireResult;

/// Every session authenticates with the shared secret; identity and role come
/// from the login user name, not the password.
#[derive(Debug)]
pub struct VenuedAuthSource {
    secret: String,
}

impl VenuedAuthSource {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }
}

#[async_trait]
impl AuthSource for VenuedAuthSource {
    async fn get_password(&self, _login: &LoginInfo) -> PgWireResult<Password> {
        Ok(Password::new(None, self.secret.as_bytes().to_vec()))
    }
}
