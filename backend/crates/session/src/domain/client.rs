//! Session Client Trait
//!
//! Interface to the hosted auth service. Implementation is in the
//! infrastructure layer.

use crate::domain::cookie_bridge::CookieBridge;
use crate::domain::user::AuthenticatedUser;
use crate::error::SessionResult;

/// Session client trait
///
/// Every operation receives the request's [`CookieBridge`]; whatever the
/// client wants the browser to store is staged there, never returned.
#[trait_variant::make(SessionClient: Send)]
pub trait LocalSessionClient {
    /// Validate (and refresh when due) the session carried by the cookies
    ///
    /// `Ok(None)` means no usable session. `Err` is reserved for failures to
    /// reach or understand the auth service.
    async fn get_user(&self, cookies: &mut CookieBridge) -> SessionResult<Option<AuthenticatedUser>>;

    /// Trade a one-time auth code (OAuth / magic link callback) for a session
    async fn exchange_code_for_session(
        &self,
        code: &str,
        cookies: &mut CookieBridge,
    ) -> SessionResult<AuthenticatedUser>;

    /// Revoke the current session and stage removal of its cookies
    async fn sign_out(&self, cookies: &mut CookieBridge) -> SessionResult<()>;
}
