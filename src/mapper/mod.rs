//! Pure translation between typed state and the API's wire shapes.
//!
//! Nothing in here performs I/O. Controllers feed responses in and request
//! bodies out; every function is deterministic over its inputs, which is
//! what keeps the merge rules unit-testable without a server.

pub mod custom_status;
pub mod webhook;
