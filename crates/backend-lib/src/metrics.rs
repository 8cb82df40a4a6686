// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const LOGIN: &str = "auth.login";
pub const PASSWORD_CHANGED: &str = "auth.password_changed";
pub const REHASH_FLAGGED: &str = "auth.rehash_flagged";
pub const CLOCK_IN: &str = "clock.in";
pub const CLOCK_OUT: &str = "clock.out";
pub const STORAGE_CONFLICT: &str = "storage.conflict";
