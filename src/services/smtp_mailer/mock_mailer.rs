use crate::services::smtp_mailer::{InvitationEmail, MailError, Mailer};
use async_trait::async_trait;
use std::sync::Mutex;

/// Records invitations instead of sending them.
#[derive(Debug, Default)]
pub struct MockMailer {
    pub sent_invitations: Mutex<Vec<InvitationEmail>>,
    pub fail_send: bool,
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_invitation_email(&self, invitation: &InvitationEmail) -> Result<(), MailError> {
        if self.fail_send {
            return Err(MailError::Other("mock failure".into()));
        }
        self.sent_invitations
            .lock()
            .unwrap()
            .push(invitation.clone());
        Ok(())
    }
}
