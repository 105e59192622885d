// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Salted SHA-256 credential hasher.
//!
//! Stored form is `{salt}${hex-digest}`. The hashing scheme is pluggable at
//! the `CredentialHasher` seam; swapping in a stronger KDF does not touch the
//! auth service.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::access::CredentialHasher;

#[derive(Default)]
pub struct Sha256CredentialHasher;

impl Sha256CredentialHasher {
    pub fn new() -> Self {
        Self
    }

    fn digest(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl CredentialHasher for Sha256CredentialHasher {
    fn hash(&self, password: &str) -> String {
        let salt = Uuid::new_v4().simple().to_string();
        let digest = Self::digest(&salt, password);
        format!("{salt}${digest}")
    }

    fn verify(&self, password: &str, hashed: &str) -> bool {
        match hashed.split_once('$') {
            Some((salt, digest)) => Self::digest(salt, password) == digest,
            None => false,
        }
    }
}
