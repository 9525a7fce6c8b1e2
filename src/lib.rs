//! Asset gallery functions: an uploader that stores files and their detected
//! labels in a bucket, and a reader that returns the stored label documents.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
