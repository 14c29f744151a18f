pub mod auth;
pub mod smtp_mailer;
pub mod storage;
pub mod translation;
