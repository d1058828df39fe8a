//! Credential primitives: Argon2id hashing in [`password`], token issuance
//! and verification in [`jwt`].

pub mod jwt;
pub mod password;
