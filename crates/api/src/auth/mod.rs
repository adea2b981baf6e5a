//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT access tokens and refresh-token helpers.
//! - [`reset`] -- password-reset links built on signed, stateless tokens.

pub mod jwt;
pub mod password;
pub mod reset;
