pub mod guarded_editor;
pub mod invitation_accept;
pub mod invitations;
pub mod onboarding;
