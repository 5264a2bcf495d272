pub mod activity;
pub mod snapshot;
pub mod user;
