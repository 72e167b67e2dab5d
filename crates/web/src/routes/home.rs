//! Home page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::middleware::MaybeUser;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub name: Option<String>,
}

/// Display the home page, greeting the user if one is signed in.
pub async fn home(MaybeUser(user): MaybeUser) -> impl IntoResponse {
    HomeTemplate {
        name: user.map(|u| u.name),
    }
}
