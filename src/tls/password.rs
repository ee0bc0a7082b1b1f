//! Passphrase supply for encrypted private keys
//!
//! The engine exposes a single password hook slot per context. A
//! [`PasswordStrategy`] is resolved before the key is loaded, installed into
//! that slot for the duration of one load through [`PasswordHook`], and
//! removed again when the guard drops, whatever the outcome of the load.

use std::ffi::{c_char, c_int, c_void};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::slice;

use log::{debug, warn};
use openssl_sys as ffi;

use super::engine;

/// How the passphrase for a private key is obtained.
///
/// Passphrases are raw bytes; the engine does not require them to be UTF-8.
pub enum PasswordStrategy<'a> {
    /// No passphrase; encrypted keys fail to load
    NoPassword,
    /// Fixed passphrase
    Static(Vec<u8>),
    /// Ask the callback each time the engine needs a passphrase. `None`
    /// means "no answer" and makes decryption fail.
    OnDemand(Box<dyn FnMut() -> Option<Vec<u8>> + 'a>),
}

impl<'a> PasswordStrategy<'a> {
    /// Build an on-demand strategy from a closure answering with anything
    /// that converts to bytes (`String`, `Vec<u8>`, ...).
    pub fn on_demand<F, S>(mut callback: F) -> Self
    where
        F: FnMut() -> Option<S> + 'a,
        S: Into<Vec<u8>>,
    {
        PasswordStrategy::OnDemand(Box::new(move || callback().map(Into::into)))
    }

    /// Strategy name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PasswordStrategy::NoPassword => "none",
            PasswordStrategy::Static(_) => "static",
            PasswordStrategy::OnDemand(_) => "on-demand",
        }
    }

    /// Write the passphrase into `buf`, truncated to its length, and return
    /// the number of bytes written. Zero means no passphrase.
    pub fn supply(&mut self, buf: &mut [u8]) -> usize {
        match self {
            PasswordStrategy::NoPassword => 0,
            PasswordStrategy::Static(secret) => copy_truncated(secret, buf),
            PasswordStrategy::OnDemand(callback) => match callback() {
                Some(secret) => copy_truncated(&secret, buf),
                None => 0,
            },
        }
    }
}

impl Default for PasswordStrategy<'_> {
    fn default() -> Self {
        PasswordStrategy::NoPassword
    }
}

impl From<&str> for PasswordStrategy<'_> {
    fn from(secret: &str) -> Self {
        PasswordStrategy::Static(secret.as_bytes().to_vec())
    }
}

impl From<String> for PasswordStrategy<'_> {
    fn from(secret: String) -> Self {
        PasswordStrategy::Static(secret.into_bytes())
    }
}

impl From<&[u8]> for PasswordStrategy<'_> {
    fn from(secret: &[u8]) -> Self {
        PasswordStrategy::Static(secret.to_vec())
    }
}

impl From<Vec<u8>> for PasswordStrategy<'_> {
    fn from(secret: Vec<u8>) -> Self {
        PasswordStrategy::Static(secret)
    }
}

impl<T> From<Option<T>> for PasswordStrategy<'_>
where
    T: Into<Vec<u8>>,
{
    fn from(secret: Option<T>) -> Self {
        match secret {
            Some(secret) => PasswordStrategy::Static(secret.into()),
            None => PasswordStrategy::NoPassword,
        }
    }
}

impl fmt::Debug for PasswordStrategy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the secret itself
        f.debug_tuple("PasswordStrategy").field(&self.kind()).finish()
    }
}

fn copy_truncated(secret: &[u8], buf: &mut [u8]) -> usize {
    let len = secret.len().min(buf.len());
    buf[..len].copy_from_slice(&secret[..len]);
    len
}

/// Hook handed to the engine. `userdata` is the `PasswordStrategy` installed
/// by [`PasswordHook::install`].
unsafe extern "C" fn password_trampoline(
    buf: *mut c_char,
    size: c_int,
    _rwflag: c_int,
    userdata: *mut c_void,
) -> c_int {
    if buf.is_null() || userdata.is_null() || size <= 0 {
        return 0;
    }

    let strategy = &mut *(userdata as *mut PasswordStrategy<'_>);
    let buf = slice::from_raw_parts_mut(buf as *mut u8, size as usize);

    // Unwinding across the engine's C frames is undefined behaviour
    match panic::catch_unwind(AssertUnwindSafe(|| strategy.supply(buf))) {
        Ok(len) => {
            debug!("Password hook supplied {} bytes ({})", len, strategy.kind());
            len as c_int
        }
        Err(_) => {
            warn!("Password callback panicked; reporting no passphrase");
            0
        }
    }
}

/// Installs a strategy into the context's password hook slot and clears the
/// slot on drop.
pub(crate) struct PasswordHook<'s, 'a> {
    ctx: *mut ffi::SSL_CTX,
    _strategy: std::marker::PhantomData<&'s mut PasswordStrategy<'a>>,
}

impl<'s, 'a> PasswordHook<'s, 'a> {
    /// # Safety
    ///
    /// `ctx` must point to a live `SSL_CTX` that outlives the returned guard.
    pub(crate) unsafe fn install(ctx: *mut ffi::SSL_CTX, strategy: &'s mut PasswordStrategy<'a>) -> Self {
        let userdata = strategy as *mut PasswordStrategy<'a> as *mut c_void;
        engine::set_password_hook(ctx, Some(password_trampoline), userdata);
        PasswordHook { ctx, _strategy: std::marker::PhantomData }
    }
}

impl Drop for PasswordHook<'_, '_> {
    fn drop(&mut self) {
        // SAFETY: `install` requires the context to outlive the guard
        unsafe { engine::set_password_hook(self.ctx, None, ptr::null_mut()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_password_supplies_nothing() {
        let mut buf = [0u8; 16];
        assert_eq!(PasswordStrategy::NoPassword.supply(&mut buf), 0);
    }

    #[test]
    fn static_password_is_copied() {
        let mut buf = [0u8; 16];
        let mut strategy = PasswordStrategy::from("hunter2");
        assert_eq!(strategy.supply(&mut buf), 7);
        assert_eq!(&buf[..7], b"hunter2");
    }

    #[test]
    fn long_password_is_truncated() {
        let mut buf = [0u8; 4];
        let mut strategy = PasswordStrategy::from("correct horse");
        assert_eq!(strategy.supply(&mut buf), 4);
        assert_eq!(&buf, b"corr");
    }

    #[test]
    fn on_demand_is_asked_every_time() {
        let mut calls = 0;
        {
            let mut strategy = PasswordStrategy::on_demand(|| {
                calls += 1;
                Some("pw")
            });
            let mut buf = [0u8; 8];
            assert_eq!(strategy.supply(&mut buf), 2);
            assert_eq!(strategy.supply(&mut buf), 2);
        }
        assert_eq!(calls, 2);
    }

    #[test]
    fn on_demand_without_answer_supplies_nothing() {
        let mut buf = [0u8; 8];
        let mut strategy = PasswordStrategy::on_demand(|| None::<Vec<u8>>);
        assert_eq!(strategy.supply(&mut buf), 0);
    }

    #[test]
    fn trampoline_rejects_null_arguments() {
        let mut buf = [0 as c_char; 8];
        let rc = unsafe { password_trampoline(buf.as_mut_ptr(), 8, 0, ptr::null_mut()) };
        assert_eq!(rc, 0);
    }

    #[test]
    fn trampoline_bridges_strategy() {
        let mut strategy = PasswordStrategy::from("secret");
        let mut buf = [0 as c_char; 8];
        let userdata = &mut strategy as *mut PasswordStrategy<'_> as *mut c_void;
        let rc = unsafe { password_trampoline(buf.as_mut_ptr(), 8, 0, userdata) };
        assert_eq!(rc, 6);
        assert_eq!(buf[0] as u8, b's');
    }

    #[test]
    fn trampoline_swallows_panics() {
        let mut strategy = PasswordStrategy::on_demand(|| -> Option<String> { panic!("prompt failed") });
        let mut buf = [0 as c_char; 8];
        let userdata = &mut strategy as *mut PasswordStrategy<'_> as *mut c_void;
        let rc = unsafe { password_trampoline(buf.as_mut_ptr(), 8, 0, userdata) };
        assert_eq!(rc, 0);
    }

    #[test]
    fn non_utf8_password_is_copied_verbatim() {
        let mut buf = [0u8; 8];
        let mut strategy = PasswordStrategy::from(&b"caf\xe9"[..]);
        assert_eq!(strategy.supply(&mut buf), 4);
        assert_eq!(&buf[..4], b"caf\xe9");

        let mut strategy = PasswordStrategy::on_demand(|| Some(b"caf\xe9".to_vec()));
        assert_eq!(strategy.supply(&mut buf), 4);
        assert_eq!(&buf[..4], b"caf\xe9");
    }

    #[test]
    fn debug_hides_secret() {
        let strategy = PasswordStrategy::from("hunter2");
        assert!(!format!("{:?}", strategy).contains("hunter2"));
    }
}
