pub mod email;
pub mod slug;
pub mod token;
