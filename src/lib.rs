// Library target exists for the integration tests under tests/.
// The binary entry point is main.rs; this file re-declares the module tree so
// that tests can drive `quizr::session::*` and `quizr::source::*` directly.
// Some code is only exercised through the binary, so suppress dead_code warnings.
#![allow(dead_code)]

pub mod app;
pub mod config;
pub mod event;
pub mod session;
pub mod source;
pub mod store;
pub mod ui;
