pub mod admin;
pub mod auth;
pub mod content;
pub mod health;
pub mod payments;
pub mod profile;

pub use admin::*;
pub use auth::*;
pub use content::*;
pub use health::*;
pub use payments::*;
pub use profile::*;

use worker::{Response, Result};

use crate::responses::ApiResponse;
use crate::utils::PortalError;

/// Turns a `PortalError` into the JSON error envelope with its status.
pub(crate) fn error_response(err: &PortalError) -> Result<Response> {
    let response = ApiResponse::<()>::error(err.message.clone());
    Ok(Response::from_json(&response)?.with_status(err.status_code()))
}
