pub mod auth;
pub mod blog;
pub mod dashboard;
pub mod enquiry;
pub mod machine;
pub mod media;
pub mod part;
pub mod upload;
