pub mod auth_admin;
pub mod mailer;
