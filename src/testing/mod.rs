//! Testing utilities for code built on the account core.
//!
//! The mocks live next to the traits they implement:
//!
//! - [`MockOrderClient`](crate::order::client::test::MockOrderClient)
//! - [`ScriptedConfirmationSurface`](crate::order::decision::test::ScriptedConfirmationSurface)
//! - [`RecordingAuditLogger`](crate::order::audit::test::RecordingAuditLogger)
//! - [`StaticSubscriptionSource`](crate::source::test::StaticSubscriptionSource)
//!
//! This module adds fixtures for subscription records.
//!
//! # Example
//!
//! ```rust,ignore
//! use tideway_account::testing::RecordFixture;
//!
//! let record = RecordFixture::periodic("1", now)
//!     .quota_gb(100)
//!     .used_gb(95)
//!     .depleted()
//!     .build();
//! ```

mod fixtures;

pub use fixtures::{GB, RecordFixture};
