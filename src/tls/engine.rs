//! Raw engine surface
//!
//! The safe `openssl` API covers most context configuration. The calls
//! below are the ones it leaves out: session timeout and cache size
//! control, the cumulative session counters, trust loading with a CA
//! directory, the default password hook slot and verify read-back. Several
//! of them are C macros over `SSL_CTX_ctrl`, so they are reimplemented
//! here with the matching control codes.

use std::ffi::{c_char, c_int, c_long, c_void};
use std::ptr;

use log::info;
use once_cell::sync::OnceCell;
use openssl::error::ErrorStack;
use openssl_sys as ffi;

/// Signature of the engine's PEM password hook.
pub(crate) type PasswordCallback =
    unsafe extern "C" fn(buf: *mut c_char, size: c_int, rwflag: c_int, userdata: *mut c_void) -> c_int;

extern "C" {
    fn SSL_CTX_set_timeout(ctx: *mut ffi::SSL_CTX, t: c_long) -> c_long;
    fn SSL_CTX_get_timeout(ctx: *const ffi::SSL_CTX) -> c_long;
    fn SSL_CTX_get_verify_mode(ctx: *const ffi::SSL_CTX) -> c_int;
    fn SSL_CTX_get_verify_depth(ctx: *const ffi::SSL_CTX) -> c_int;
    fn SSL_CTX_set_default_passwd_cb(ctx: *mut ffi::SSL_CTX, cb: Option<PasswordCallback>);
    fn SSL_CTX_set_default_passwd_cb_userdata(ctx: *mut ffi::SSL_CTX, userdata: *mut c_void);
    fn SSL_get1_supported_ciphers(ssl: *mut ffi::SSL) -> *mut ffi::OPENSSL_STACK;
}

// Control codes behind the SSL_CTX_sess_* macros
const SSL_CTRL_SESS_NUMBER: c_int = 20;
const SSL_CTRL_SESS_CONNECT: c_int = 21;
const SSL_CTRL_SESS_CONNECT_GOOD: c_int = 22;
const SSL_CTRL_SESS_CONNECT_RENEGOTIATE: c_int = 23;
const SSL_CTRL_SESS_ACCEPT: c_int = 24;
const SSL_CTRL_SESS_ACCEPT_GOOD: c_int = 25;
const SSL_CTRL_SESS_ACCEPT_RENEGOTIATE: c_int = 26;
const SSL_CTRL_SESS_HIT: c_int = 27;
const SSL_CTRL_SESS_CB_HIT: c_int = 28;
const SSL_CTRL_SESS_MISSES: c_int = 29;
const SSL_CTRL_SESS_TIMEOUTS: c_int = 30;
const SSL_CTRL_SESS_CACHE_FULL: c_int = 31;
const SSL_CTRL_SET_SESS_CACHE_SIZE: c_int = 42;
const SSL_CTRL_GET_SESS_CACHE_SIZE: c_int = 43;
const SSL_CTRL_GET_SESS_CACHE_MODE: c_int = 45;

/// Session counters kept by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionCounter {
    Number,
    Connect,
    ConnectGood,
    ConnectRenegotiate,
    Accept,
    AcceptGood,
    AcceptRenegotiate,
    Hits,
    CallbackHits,
    Misses,
    Timeouts,
    CacheFull,
}

impl SessionCounter {
    fn ctrl(self) -> c_int {
        match self {
            SessionCounter::Number => SSL_CTRL_SESS_NUMBER,
            SessionCounter::Connect => SSL_CTRL_SESS_CONNECT,
            SessionCounter::ConnectGood => SSL_CTRL_SESS_CONNECT_GOOD,
            SessionCounter::ConnectRenegotiate => SSL_CTRL_SESS_CONNECT_RENEGOTIATE,
            SessionCounter::Accept => SSL_CTRL_SESS_ACCEPT,
            SessionCounter::AcceptGood => SSL_CTRL_SESS_ACCEPT_GOOD,
            SessionCounter::AcceptRenegotiate => SSL_CTRL_SESS_ACCEPT_RENEGOTIATE,
            SessionCounter::Hits => SSL_CTRL_SESS_HIT,
            SessionCounter::CallbackHits => SSL_CTRL_SESS_CB_HIT,
            SessionCounter::Misses => SSL_CTRL_SESS_MISSES,
            SessionCounter::Timeouts => SSL_CTRL_SESS_TIMEOUTS,
            SessionCounter::CacheFull => SSL_CTRL_SESS_CACHE_FULL,
        }
    }
}

/// Engine build information, resolved once per process.
#[derive(Debug, Clone)]
pub struct EngineInfo {
    /// Human readable version string, e.g. "OpenSSL 3.0.13 30 Jan 2024"
    pub version: String,
    /// Numeric version as reported by `OpenSSL_version_num`
    pub number: i64,
}

/// Initialize the engine and return its build information.
pub fn engine_info() -> &'static EngineInfo {
    static INSTANCE: OnceCell<EngineInfo> = OnceCell::new();
    INSTANCE.get_or_init(|| {
        openssl::init();
        let info = EngineInfo {
            version: openssl::version::version().to_string(),
            number: openssl::version::number(),
        };
        info!("Using TLS engine: {}", info.version);
        info
    })
}

/// Reason string of the first queued engine error.
pub(crate) fn reason(stack: &ErrorStack) -> String {
    stack
        .errors()
        .iter()
        .find_map(|error| error.reason())
        .map(str::to_owned)
        .unwrap_or_else(|| "unknown error".to_string())
}

/// # Safety
///
/// `ctx` must point to a live `SSL_CTX`.
pub(crate) unsafe fn set_timeout(ctx: *mut ffi::SSL_CTX, seconds: c_long) -> c_long {
    SSL_CTX_set_timeout(ctx, seconds)
}

/// # Safety
///
/// `ctx` must point to a live `SSL_CTX`.
pub(crate) unsafe fn timeout(ctx: *mut ffi::SSL_CTX) -> c_long {
    SSL_CTX_get_timeout(ctx)
}

/// # Safety
///
/// `ctx` must point to a live `SSL_CTX`.
pub(crate) unsafe fn verify_mode(ctx: *mut ffi::SSL_CTX) -> c_int {
    SSL_CTX_get_verify_mode(ctx)
}

/// # Safety
///
/// `ctx` must point to a live `SSL_CTX`.
pub(crate) unsafe fn set_verify_depth(ctx: *mut ffi::SSL_CTX, depth: c_int) {
    ffi::SSL_CTX_set_verify_depth(ctx, depth)
}

/// # Safety
///
/// `ctx` must point to a live `SSL_CTX`.
pub(crate) unsafe fn verify_depth(ctx: *mut ffi::SSL_CTX) -> c_int {
    SSL_CTX_get_verify_depth(ctx)
}

/// Returns the previous cache size.
///
/// # Safety
///
/// `ctx` must point to a live `SSL_CTX`.
pub(crate) unsafe fn set_session_cache_size(ctx: *mut ffi::SSL_CTX, size: c_long) -> c_long {
    ffi::SSL_CTX_ctrl(ctx, SSL_CTRL_SET_SESS_CACHE_SIZE, size, ptr::null_mut())
}

/// # Safety
///
/// `ctx` must point to a live `SSL_CTX`.
pub(crate) unsafe fn session_cache_size(ctx: *mut ffi::SSL_CTX) -> c_long {
    ffi::SSL_CTX_ctrl(ctx, SSL_CTRL_GET_SESS_CACHE_SIZE, 0, ptr::null_mut())
}

/// # Safety
///
/// `ctx` must point to a live `SSL_CTX`.
pub(crate) unsafe fn session_cache_mode(ctx: *mut ffi::SSL_CTX) -> c_long {
    ffi::SSL_CTX_ctrl(ctx, SSL_CTRL_GET_SESS_CACHE_MODE, 0, ptr::null_mut())
}

/// # Safety
///
/// `ctx` must point to a live `SSL_CTX`.
pub(crate) unsafe fn session_counter(ctx: *mut ffi::SSL_CTX, counter: SessionCounter) -> c_long {
    ffi::SSL_CTX_ctrl(ctx, counter.ctrl(), 0, ptr::null_mut())
}

/// Number of ciphers `ssl` could offer, after the protocol range and
/// security level are applied. Zero when no protocol version is left.
///
/// # Safety
///
/// `ssl` must point to a live `SSL`.
pub(crate) unsafe fn supported_cipher_count(ssl: *mut ffi::SSL) -> usize {
    let ciphers = SSL_get1_supported_ciphers(ssl);
    if ciphers.is_null() {
        return 0;
    }
    let count = ffi::OPENSSL_sk_num(ciphers);
    ffi::OPENSSL_sk_free(ciphers);
    usize::try_from(count).unwrap_or(0)
}

/// Load trust material. Either pointer may be null.
///
/// # Safety
///
/// `ctx` must point to a live `SSL_CTX`; non-null paths must be
/// NUL-terminated strings that outlive the call.
pub(crate) unsafe fn load_verify_locations(
    ctx: *mut ffi::SSL_CTX,
    ca_file: *const c_char,
    ca_path: *const c_char,
) -> Result<(), ErrorStack> {
    if ffi::SSL_CTX_load_verify_locations(ctx, ca_file, ca_path) == 1 {
        Ok(())
    } else {
        Err(ErrorStack::get())
    }
}

/// Install or clear the default password hook.
///
/// # Safety
///
/// `ctx` must point to a live `SSL_CTX`; `userdata` must stay valid for as
/// long as the hook is installed.
pub(crate) unsafe fn set_password_hook(
    ctx: *mut ffi::SSL_CTX,
    callback: Option<PasswordCallback>,
    userdata: *mut c_void,
) {
    SSL_CTX_set_default_passwd_cb(ctx, callback);
    SSL_CTX_set_default_passwd_cb_userdata(ctx, userdata);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_info_is_cached() {
        let first = engine_info();
        let second = engine_info();
        assert!(std::ptr::eq(first, second));
        assert!(!first.version.is_empty());
    }

    #[test]
    fn counters_map_to_distinct_controls() {
        let counters = [
            SessionCounter::Number,
            SessionCounter::Connect,
            SessionCounter::ConnectGood,
            SessionCounter::ConnectRenegotiate,
            SessionCounter::Accept,
            SessionCounter::AcceptGood,
            SessionCounter::AcceptRenegotiate,
            SessionCounter::Hits,
            SessionCounter::CallbackHits,
            SessionCounter::Misses,
            SessionCounter::Timeouts,
            SessionCounter::CacheFull,
        ];
        let codes: Vec<_> = counters.iter().map(|counter| counter.ctrl()).collect();
        assert_eq!(codes, (20..=31).collect::<Vec<_>>());
    }

    #[test]
    fn reason_of_empty_stack() {
        let _ = ErrorStack::get();
        assert_eq!(reason(&ErrorStack::get()), "unknown error");
    }
}
