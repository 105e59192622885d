// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod applications;
pub mod attachments;
pub mod auth;
pub mod stores;
pub mod users;

// Re-export services for convenience
pub use applications::{ApplicationDetail, ApplicationService};
pub use attachments::AttachmentService;
pub use auth::{AuthService, IssuedToken, RegisterUser};
pub use stores::PortalStores;
pub use users::{UserDirectoryService, UserUpdate};
