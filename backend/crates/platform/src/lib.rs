//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random tokens, SHA-256, Base64)
//! - Password hashing (Argon2id)
//! - Cookie management

pub mod cookie;
pub mod crypto;
pub mod password;
