mod account;
mod admin;
mod payment;
mod playlist;
mod song;
mod team;
pub mod timestamp;

pub use account::*;
pub use admin::*;
pub use payment::*;
pub use playlist::*;
pub use song::*;
pub use team::*;
