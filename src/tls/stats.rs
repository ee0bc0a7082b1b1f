//! Session statistics snapshot

use std::ffi::c_long;
use std::fmt;

use openssl_sys as ffi;
use serde::Serialize;

use super::engine::{self, SessionCounter};

/// Cumulative session counters read from the engine at one point in time.
///
/// Field names follow the engine's `SSL_CTX_sess_*` accessors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Sessions currently in the cache
    pub number: u64,
    /// Client handshakes started
    pub connect: u64,
    /// Client handshakes completed
    pub connect_good: u64,
    /// Client renegotiations started
    pub connect_renegotiate: u64,
    /// Server handshakes started
    pub accept: u64,
    /// Server handshakes completed
    pub accept_good: u64,
    /// Server renegotiations started
    pub accept_renegotiate: u64,
    /// Sessions reused from the cache
    pub hits: u64,
    /// Sessions found through an external lookup callback
    pub cb_hits: u64,
    /// Session ids not found in the cache
    pub misses: u64,
    /// Cached sessions that had expired
    pub timeouts: u64,
    /// Sessions evicted because the cache was full
    pub cache_full: u64,
}

impl SessionStats {
    /// # Safety
    ///
    /// `ctx` must point to a live `SSL_CTX`.
    pub(crate) unsafe fn read(ctx: *mut ffi::SSL_CTX) -> Self {
        let read = |counter| counter_value(engine::session_counter(ctx, counter));
        SessionStats {
            number: read(SessionCounter::Number),
            connect: read(SessionCounter::Connect),
            connect_good: read(SessionCounter::ConnectGood),
            connect_renegotiate: read(SessionCounter::ConnectRenegotiate),
            accept: read(SessionCounter::Accept),
            accept_good: read(SessionCounter::AcceptGood),
            accept_renegotiate: read(SessionCounter::AcceptRenegotiate),
            hits: read(SessionCounter::Hits),
            cb_hits: read(SessionCounter::CallbackHits),
            misses: read(SessionCounter::Misses),
            timeouts: read(SessionCounter::Timeouts),
            cache_full: read(SessionCounter::CacheFull),
        }
    }

    /// Counters as `(name, value)` pairs, in engine order.
    pub fn entries(&self) -> [(&'static str, u64); 12] {
        [
            ("number", self.number),
            ("connect", self.connect),
            ("connect_good", self.connect_good),
            ("connect_renegotiate", self.connect_renegotiate),
            ("accept", self.accept),
            ("accept_good", self.accept_good),
            ("accept_renegotiate", self.accept_renegotiate),
            ("hits", self.hits),
            ("cb_hits", self.cb_hits),
            ("misses", self.misses),
            ("timeouts", self.timeouts),
            ("cache_full", self.cache_full),
        ]
    }
}

fn counter_value(raw: c_long) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.entries() {
            writeln!(f, "{:<20} {}", name, value)?;
        }
        Ok(())
    }
}
