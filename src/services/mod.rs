pub mod access;
pub mod download;
pub mod playlist_order;
pub mod session;
