//! Process-wide client state. Every context starts from the local store
//! snapshot and writes the store before its in-memory copy, so a failed
//! write leaves both unchanged.

pub mod festival;
pub mod local_store;
pub mod organization;
pub mod organization_access;
pub mod preferences;
pub mod session;
