pub mod audit_log;
pub mod donation;
pub mod expense;
pub mod festival;
pub mod image;
pub mod invitation;
pub mod organization;
pub mod setting;
pub mod user;
