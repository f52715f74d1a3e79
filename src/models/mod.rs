pub mod category;
pub mod datetime;
pub mod event;
pub mod user;
