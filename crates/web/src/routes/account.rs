//! Account route handlers.
//!
//! These routes sit behind the access gate.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::middleware::RequireUser;

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub name: String,
    pub email: String,
}

/// Display account overview page.
pub async fn index(RequireUser(user): RequireUser) -> impl IntoResponse {
    AccountIndexTemplate {
        name: user.name,
        email: user.email.into_inner(),
    }
}
