pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;

use actix_web::HttpRequest;
use uuid::Uuid;

/// Header carrying the opaque session token issued at login.
pub const SESSION_HEADER: &str = "X-Session-Token";

pub(crate) fn session_token(req: &HttpRequest) -> Option<Uuid> {
    req.headers()
        .get(SESSION_HEADER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
