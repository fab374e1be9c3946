pub mod admin;
pub mod blog;
pub mod enquiry;
pub mod machine;
pub mod part;
