use async_trait::async_trait;
use lettre::address::AddressError;
use std::fmt;

mod smtp_impl;
#[cfg(test)]
mod mock_mailer;

#[cfg(test)]
pub use mock_mailer::MockMailer;
pub use smtp_impl::{SmtpMailer, SmtpSettings};

#[derive(Debug)]
pub enum MailError {
    Other(String),
    InvalidEmailAddress(String),
    SendError(String),
    EnvVarMissing(String),
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailError::Other(e) => write!(f, "Error: {}", e),
            MailError::InvalidEmailAddress(e) => write!(f, "Invalid Address: {}", e),
            MailError::SendError(e) => write!(f, "Send error: {}", e),
            MailError::EnvVarMissing(e) => write!(f, "Env Var Missing: {}", e),
        }
    }
}

impl std::error::Error for MailError {}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        MailError::SendError(err.to_string())
    }
}

impl From<lettre::error::Error> for MailError {
    fn from(err: lettre::error::Error) -> Self {
        MailError::SendError(err.to_string())
    }
}

impl From<AddressError> for MailError {
    fn from(e: AddressError) -> Self {
        MailError::InvalidEmailAddress(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationEmail {
    pub to: String,
    pub organization_name: String,
    pub role: String,
    pub accept_url: String,
    pub expires_in_days: i64,
}

impl InvitationEmail {
    pub fn subject(&self) -> String {
        format!("You're invited to join {}", self.organization_name)
    }

    pub fn body(&self) -> String {
        format!(
            "You've been invited to help manage {} as {}.\n\nOpen this link to accept: {}\n\nThis link expires in {} days.",
            self.organization_name, self.role, self.accept_url, self.expires_in_days
        )
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_invitation_email(&self, invitation: &InvitationEmail) -> Result<(), MailError>;
}
