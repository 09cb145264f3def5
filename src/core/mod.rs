//! Generic state utilities shared by the admin handlers: list-store CRUD,
//! form validation and submit sequencing, media upload batching, and
//! self-expiring notices.

pub mod crud;
pub mod form;
pub mod toast;
pub mod upload;
