//! TLS context handle
//!
//! [`TlsContext`] owns the engine's native context and the state the
//! engine does not track itself (operating mode, committed verify policy).
//! Every setter either updates both or neither. Destruction is idempotent
//! and also runs on drop.

use std::ffi::{c_int, c_long, CString};
use std::fmt;
use std::path::Path;
use std::ptr;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use foreign_types_shared::ForeignTypeRef;
use log::{debug, info, warn};
use openssl::ssl::{
    Ssl, SslContext, SslContextBuilder, SslContextRef, SslFiletype, SslOptions, SslSessionCacheMode,
    SslVerifyMode,
};
use openssl_sys as ffi;

use crate::common::{ContextError, Result};
use super::engine;
use super::flags::FlagToken;
use super::password::{PasswordHook, PasswordStrategy};
use super::protocol::Protocol;
use super::stats::SessionStats;
use super::tables::{OPTION_FLAGS, SESSION_CACHE_FLAGS, VERIFY_FLAGS};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Role the context will be used for. Never inferred from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextMode {
    /// Not configured yet
    #[default]
    Unset,
    /// Initiates handshakes
    Client,
    /// Accepts handshakes
    Server,
}

impl ContextMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextMode::Unset => "unset",
            ContextMode::Client => "client",
            ContextMode::Server => "server",
        }
    }
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextMode {
    type Err = ContextError;

    /// Only `"client"` and `"server"` are accepted; `Unset` cannot be set.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "client" => Ok(ContextMode::Client),
            "server" => Ok(ContextMode::Server),
            _ => Err(ContextError::InvalidMode(s.to_string())),
        }
    }
}

/// TLS context under configuration
///
/// # Example
///
/// ```no_run
/// use tls_context::TlsContext;
///
/// # fn main() -> tls_context::Result<()> {
/// let mut ctx = TlsContext::create("tlsv1_2")?;
/// ctx.set_mode("server")?;
/// ctx.load_certificate_chain("server.crt")?;
/// ctx.load_private_key("server.key", "secret")?;
/// ctx.set_verify_policy(["peer", "fail_if_no_peer_cert"])?;
/// ctx.set_protocol_options(["no_sslv3", "no_compression"])?;
/// let acceptor_ctx = ctx.into_ssl_context()?;
/// # drop(acceptor_ctx);
/// # Ok(())
/// # }
/// ```
pub struct TlsContext {
    id: u64,
    engine: Option<SslContextBuilder>,
    protocol: Protocol,
    mode: ContextMode,
    verify_policy: SslVerifyMode,
}

impl TlsContext {
    /// Allocate a context for the protocol named by `protocol`.
    ///
    /// Fails with `InvalidProtocol` for unknown tokens, before anything is
    /// allocated, and with `ResourceExhausted` when the engine cannot
    /// allocate its native context.
    pub fn create(protocol: &str) -> Result<Self> {
        let protocol = Protocol::from_str(protocol)?;
        Self::with_protocol(protocol)
    }

    /// Allocate a context for an already-resolved protocol.
    pub fn with_protocol(protocol: Protocol) -> Result<Self> {
        engine::engine_info();

        let mut builder = SslContextBuilder::new(protocol.method())
            .map_err(|e| ContextError::ResourceExhausted(engine::reason(&e)))?;

        if let Some(version) = protocol.pinned_version() {
            builder
                .set_min_proto_version(Some(version))
                .and_then(|()| builder.set_max_proto_version(Some(version)))
                .map_err(|e| {
                    warn!("Engine cannot pin {}: {}", protocol, engine::reason(&e));
                    ContextError::InvalidProtocol(protocol.to_string())
                })?;
        }

        // SAFETY: the builder was just allocated
        let verify_bits = unsafe { engine::verify_mode(builder.as_ptr()) };
        let ctx = TlsContext {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            engine: Some(builder),
            protocol,
            mode: ContextMode::Unset,
            verify_policy: SslVerifyMode::from_bits_retain(verify_bits),
        };

        info!("Created {}", ctx);
        Ok(ctx)
    }

    fn builder(&mut self) -> Result<&mut SslContextBuilder> {
        self.engine.as_mut().ok_or(ContextError::Closed)
    }

    fn raw(&self) -> Result<*mut ffi::SSL_CTX> {
        self.engine.as_ref().map(|b| b.as_ptr()).ok_or(ContextError::Closed)
    }

    /// Load trusted CA certificates from a PEM file, a hashed directory, or both.
    pub fn load_trust_locations(
        &mut self,
        ca_file: Option<&Path>,
        ca_dir: Option<&Path>,
    ) -> Result<()> {
        let ctx = self.raw()?;
        let ca_file_c = ca_file
            .map(|p| path_to_cstring(p, ContextError::TrustLoadFailed))
            .transpose()?;
        let ca_dir_c = ca_dir
            .map(|p| path_to_cstring(p, ContextError::TrustLoadFailed))
            .transpose()?;

        // SAFETY: the context is live and both strings outlive the call
        let loaded = unsafe {
            engine::load_verify_locations(
                ctx,
                ca_file_c.as_ref().map_or(ptr::null(), |s| s.as_ptr()),
                ca_dir_c.as_ref().map_or(ptr::null(), |s| s.as_ptr()),
            )
        };

        match loaded {
            Ok(()) => {
                debug!("Loaded CA locations (file: {:?}, dir: {:?})", ca_file, ca_dir);
                Ok(())
            }
            Err(e) => {
                let reason = engine::reason(&e);
                warn!("Engine rejected CA locations: {}", reason);
                Err(ContextError::TrustLoadFailed(reason))
            }
        }
    }

    /// Load the certificate chain (leaf first) from a PEM file.
    pub fn load_certificate_chain<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        path_to_cstring(path, ContextError::CertLoadFailed)?;
        self.builder()?
            .set_certificate_chain_file(path)
            .map_err(|e| {
                let reason = engine::reason(&e);
                warn!("Engine rejected certificate {}: {}", path.display(), reason);
                ContextError::CertLoadFailed(reason)
            })?;

        debug!("Loaded certificate chain from {}", path.display());
        Ok(())
    }

    /// Load a PEM private key, decrypting it with `password` if needed.
    ///
    /// The password hook is installed only for the duration of this call.
    pub fn load_private_key<'a, P, S>(&mut self, path: P, password: S) -> Result<()>
    where
        P: AsRef<Path>,
        S: Into<PasswordStrategy<'a>>,
    {
        let path = path.as_ref();
        let mut strategy: PasswordStrategy<'a> = password.into();
        let ctx = self.raw()?;
        path_to_cstring(path, ContextError::KeyLoadFailed)?;
        let builder = self.builder()?;

        let loaded = {
            // SAFETY: the builder (and its context) outlives the hook guard
            let _hook = unsafe { PasswordHook::install(ctx, &mut strategy) };
            builder.set_private_key_file(path, SslFiletype::PEM)
        };

        match loaded {
            Ok(()) => {
                debug!("Loaded private key from {} (password: {})", path.display(), strategy.kind());
                Ok(())
            }
            Err(e) => {
                let reason = engine::reason(&e);
                warn!("Engine rejected private key {}: {}", path.display(), reason);
                Err(ContextError::KeyLoadFailed(reason))
            }
        }
    }

    /// Check that the loaded private key matches the loaded certificate.
    pub fn check_private_key(&self) -> Result<()> {
        let builder = self.engine.as_ref().ok_or(ContextError::Closed)?;
        builder
            .check_private_key()
            .map_err(|e| ContextError::KeyMismatch(engine::reason(&e)))
    }

    /// Set the cipher list used for TLS 1.2 and below. Not validated locally.
    pub fn set_cipher_list(&mut self, list: &str) -> Result<()> {
        if list.contains('\0') {
            return Err(ContextError::CipherListRejected(
                "cipher list contains a NUL byte".to_string(),
            ));
        }
        self.builder()?
            .set_cipher_list(list)
            .map_err(|e| {
                let reason = engine::reason(&e);
                warn!("Engine rejected cipher list '{}': {}", list, reason);
                ContextError::CipherListRejected(reason)
            })?;

        debug!("Cipher list set to '{}'", list);
        Ok(())
    }

    /// Set the maximum certificate chain depth. Bounds are the engine's.
    pub fn set_verify_depth(&mut self, depth: i32) -> Result<()> {
        let ctx = self.raw()?;
        // SAFETY: the context is live
        unsafe { engine::set_verify_depth(ctx, depth as c_int) };
        debug!("Verify depth set to {}", depth);
        Ok(())
    }

    /// Current verify depth as reported by the engine.
    pub fn verify_depth(&self) -> Result<i32> {
        let ctx = self.raw()?;
        // SAFETY: the context is live
        Ok(unsafe { engine::verify_depth(ctx) })
    }

    /// Replace the verification policy with the union of `tokens`.
    ///
    /// Tokens: `none`, `peer`, `client_once`, `fail_if_no_peer_cert`. An
    /// empty sequence leaves the policy untouched.
    pub fn set_verify_policy<'t, I, T>(&mut self, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<FlagToken<'t>>,
    {
        let builder = self.engine.as_mut().ok_or(ContextError::Closed)?;
        let policy = &mut self.verify_policy;
        VERIFY_FLAGS.commit(tokens, |mask| {
            builder.set_verify(mask);
            *policy = mask;
            debug!("Verify policy set to {:?}", mask);
        })?;
        Ok(())
    }

    /// Committed verification policy.
    pub fn verify_policy(&self) -> SslVerifyMode {
        self.verify_policy
    }

    /// Add the options named by `tokens` to the engine's option mask.
    ///
    /// Options accumulate across calls; an empty sequence is a no-op.
    pub fn set_protocol_options<'t, I, T>(&mut self, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<FlagToken<'t>>,
    {
        let builder = self.builder()?;
        OPTION_FLAGS.commit(tokens, |mask| {
            let combined = builder.set_options(mask);
            debug!("Protocol options now {:?}", combined);
        })?;
        Ok(())
    }

    /// Current engine option mask.
    pub fn options(&self) -> Result<SslOptions> {
        let builder = self.engine.as_ref().ok_or(ContextError::Closed)?;
        Ok(builder.options())
    }

    /// Set the operating mode. Re-setting overwrites the previous mode.
    pub fn set_mode(&mut self, mode: &str) -> Result<()> {
        self.raw()?;
        let mode = ContextMode::from_str(mode)?;
        if self.mode != ContextMode::Unset && self.mode != mode {
            debug!("Mode of {} changed from {} to {}", self, self.mode, mode);
        }
        self.mode = mode;
        Ok(())
    }

    /// Configured operating mode.
    pub fn mode(&self) -> ContextMode {
        self.mode
    }

    /// Protocol the context was created for.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Set the session timeout in seconds and return the previous value.
    pub fn set_timeout(&mut self, seconds: i64) -> Result<i64> {
        let ctx = self.raw()?;
        // SAFETY: the context is live
        let previous = unsafe { engine::set_timeout(ctx, seconds as c_long) };
        debug!("Session timeout set to {}s (was {}s)", seconds, previous);
        Ok(previous as i64)
    }

    /// Current session timeout in seconds.
    pub fn timeout(&self) -> Result<i64> {
        let ctx = self.raw()?;
        // SAFETY: the context is live
        Ok(unsafe { engine::timeout(ctx) } as i64)
    }

    /// Set the session id context that keeps this context's cached sessions
    /// apart from other contexts in the same process.
    pub fn set_session_id_context(&mut self, sid_ctx: &[u8]) -> Result<()> {
        self.builder()?
            .set_session_id_context(sid_ctx)
            .map_err(|e| {
                let reason = engine::reason(&e);
                warn!("Engine rejected session id context: {}", reason);
                ContextError::SessionIdRejected(reason)
            })?;

        debug!("Session id context set ({} bytes)", sid_ctx.len());
        Ok(())
    }

    /// Replace the session cache mode with the union of `tokens`.
    ///
    /// `true` stands for `both`, `false` for `off`. An empty sequence leaves
    /// the mode untouched.
    pub fn set_session_cache_mode<'t, I, T>(&mut self, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<FlagToken<'t>>,
    {
        let builder = self.builder()?;
        SESSION_CACHE_FLAGS.commit(tokens, |mask| {
            let previous = builder.set_session_cache_mode(mask);
            debug!("Session cache mode set to {:?} (was {:?})", mask, previous);
        })?;
        Ok(())
    }

    /// Current session cache mode as reported by the engine.
    pub fn session_cache_mode(&self) -> Result<SslSessionCacheMode> {
        let ctx = self.raw()?;
        // SAFETY: the context is live
        let bits = unsafe { engine::session_cache_mode(ctx) };
        Ok(SslSessionCacheMode::from_bits_retain(bits))
    }

    /// Set the maximum number of cached sessions.
    pub fn set_session_cache_size(&mut self, entries: i64) -> Result<()> {
        let ctx = self.raw()?;
        // SAFETY: the context is live
        unsafe { engine::set_session_cache_size(ctx, entries as c_long) };
        debug!("Session cache size set to {}", entries);
        Ok(())
    }

    /// Maximum number of cached sessions.
    pub fn session_cache_size(&self) -> Result<i64> {
        let ctx = self.raw()?;
        // SAFETY: the context is live
        Ok(unsafe { engine::session_cache_size(ctx) } as i64)
    }

    /// Snapshot of the engine's cumulative session counters.
    pub fn stats(&self) -> Result<SessionStats> {
        let ctx = self.raw()?;
        // SAFETY: the context is live
        Ok(unsafe { SessionStats::read(ctx) })
    }

    /// Number of cipher suites a client handshake from this context could
    /// offer with its current protocol range, cipher list and security
    /// level.
    ///
    /// Zero means no handshake can succeed. Creation alone does not tell:
    /// an engine built without SSLv3 still accepts a context pinned to it.
    pub fn usable_ciphers(&self) -> Result<usize> {
        let ctx = self.as_context_ref().ok_or(ContextError::Closed)?;
        let mut ssl = Ssl::new(ctx).map_err(|e| ContextError::ResourceExhausted(engine::reason(&e)))?;
        ssl.set_connect_state();
        // SAFETY: `ssl` is live for the duration of the call
        Ok(unsafe { engine::supported_cipher_count(ssl.as_ptr()) })
    }

    /// Raw engine context for the handshake layer; `None` once destroyed.
    ///
    /// The pointer is only valid while this handle is alive and open.
    pub fn as_ptr(&self) -> Option<*mut ffi::SSL_CTX> {
        self.engine.as_ref().map(|b| b.as_ptr())
    }

    /// Borrow the engine context as a shared reference.
    pub fn as_context_ref(&self) -> Option<&SslContextRef> {
        self.engine
            .as_ref()
            // SAFETY: the builder owns a live SSL_CTX for as long as it is borrowed
            .map(|b| unsafe { SslContextRef::from_ptr(b.as_ptr()) })
    }

    /// Finish configuration and hand the engine context over.
    pub fn into_ssl_context(mut self) -> Result<SslContext> {
        let builder = self.engine.take().ok_or(ContextError::Closed)?;
        info!("Context #{} handed over ({} mode)", self.id, self.mode);
        Ok(builder.build())
    }

    /// Release the engine context. Further calls are no-ops.
    pub fn close(&mut self) {
        if let Some(builder) = self.engine.take() {
            drop(builder);
            info!("Destroyed context #{}", self.id);
        }
    }

    /// Whether [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.engine.is_none()
    }

    /// Process-unique handle id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Diagnostic description; never fails.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TlsContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_ptr() {
            Some(ptr) => write!(f, "SSL context #{}: {:p}", self.id, ptr),
            None => write!(f, "SSL context #{}: closed", self.id),
        }
    }
}

impl fmt::Debug for TlsContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsContext")
            .field("id", &self.id)
            .field("protocol", &self.protocol)
            .field("mode", &self.mode)
            .field("verify_policy", &self.verify_policy)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Drop for TlsContext {
    fn drop(&mut self) {
        self.close();
    }
}

/// The engine takes paths as C strings; reject what cannot become one
/// before it is handed over.
fn path_to_cstring<E>(path: &Path, error: E) -> Result<CString>
where
    E: Fn(String) -> ContextError,
{
    let text = path
        .to_str()
        .ok_or_else(|| error(format!("path is not valid UTF-8: {}", path.display())))?;
    CString::new(text).map_err(|_| error(format!("path contains a NUL byte: {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("client".parse::<ContextMode>().unwrap(), ContextMode::Client);
        assert_eq!("server".parse::<ContextMode>().unwrap(), ContextMode::Server);
        assert!(matches!("unset".parse::<ContextMode>(), Err(ContextError::InvalidMode(_))));
        assert!(matches!("Server".parse::<ContextMode>(), Err(ContextError::InvalidMode(_))));
    }

    #[test]
    fn test_new_context_is_unset() {
        let ctx = TlsContext::create("sslv23").unwrap();
        assert_eq!(ctx.mode(), ContextMode::Unset);
        assert_eq!(ctx.protocol(), Protocol::SslV23);
        assert!(!ctx.is_closed());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = TlsContext::create("tls").unwrap();
        let b = TlsContext::create("tls").unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_describe_after_close() {
        let mut ctx = TlsContext::create("sslv23").unwrap();
        assert!(ctx.describe().starts_with("SSL context #"));
        ctx.close();
        assert!(ctx.describe().ends_with("closed"));
    }

    #[test]
    fn test_path_with_nul_is_rejected() {
        let err = path_to_cstring(Path::new("ca\0.pem"), ContextError::TrustLoadFailed).unwrap_err();
        assert!(matches!(err, ContextError::TrustLoadFailed(_)));

        let err = path_to_cstring(Path::new("a\0b.key"), ContextError::KeyLoadFailed).unwrap_err();
        assert!(err.to_string().contains("NUL byte"));
    }
}
