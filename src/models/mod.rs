// src/models/mod.rs

pub mod note;
pub mod question;
pub mod result;
pub mod user;
