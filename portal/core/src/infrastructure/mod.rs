// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod db;
pub mod file_store;
pub mod hasher;
pub mod mailer;
pub mod repositories;

pub use db::Database;
pub use file_store::{InMemoryFileStore, LocalFileStore};
pub use hasher::Sha256CredentialHasher;
pub use mailer::LogMailer;
