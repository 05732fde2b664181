// Session client modules
//
// One signed HTTP client for the whole subscriber API. Transport and token
// handling sit in `client`; endpoint groups are inherent methods in the
// other files.

pub mod account;
pub mod client;
pub mod forpost;
pub mod login;

pub use client::SessionClient;
