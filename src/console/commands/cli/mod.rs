pub(crate) mod context;

pub mod account;
pub mod admin;
pub mod library;
pub mod payments;
pub mod playlists;
pub mod songs;
pub mod team;

pub use context::CommandContext;
