pub mod application;
pub mod dispute;
pub mod interview;
pub mod job;
pub mod notification;
pub mod social;
pub mod user;
