//! End-to-end integration tests for Hemolink
//!
//! These tests wire the session store, the authenticated executor and the
//! blood request lifecycle together against a wiremock server to verify the
//! refresh-and-retry contract and the donor-side state machine.
//!
//! The tests live in `tests/`; shared setup is in `tests/common.rs`.
