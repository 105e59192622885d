// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! ATRIUM portal core
//!
//! Domain, services and persistence for the data-access application
//! workflow: researchers file applications, administrators review them, and
//! every state change lands in an append-only audit trail.
//!
//! # Architecture
//!
//! - **domain** — aggregates, the status state machine, visibility policy,
//!   access gate, repository traits
//! - **application** — services wiring the domain to its collaborators
//! - **infrastructure** — in-memory and PostgreSQL repositories, file store,
//!   credential hasher, mailer

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
