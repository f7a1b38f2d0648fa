pub mod assignment;
pub mod channel;
pub mod error;
pub mod ids;
pub mod message;
pub mod schedule;
pub mod user;
