//! Pure derivations the screens render. Nothing here talks to the UI
//! toolkit.

pub mod activity_feed;
pub mod currency;
pub mod dashboard;
pub mod donation_card;
pub mod navigation;
