//! Flag vocabularies for verification, protocol options and session caching.

use openssl::ssl::{SslOptions, SslSessionCacheMode, SslVerifyMode};

use super::flags::{FlagDomain, FlagTable};

/// `SSL_VERIFY_CLIENT_ONCE`; not exposed as a named constant by the `openssl` crate.
pub const VERIFY_CLIENT_ONCE: SslVerifyMode = SslVerifyMode::from_bits_retain(0x04);

/// Peer verification policy.
pub static VERIFY_FLAGS: FlagTable<SslVerifyMode> = FlagTable::new(
    FlagDomain::Verify,
    &[
        ("none", SslVerifyMode::NONE),
        ("peer", SslVerifyMode::PEER),
        ("client_once", VERIFY_CLIENT_ONCE),
        ("fail_if_no_peer_cert", SslVerifyMode::FAIL_IF_NO_PEER_CERT),
    ],
);

/// Protocol quirk and hardening options.
pub static OPTION_FLAGS: FlagTable<SslOptions> = FlagTable::new(
    FlagDomain::Options,
    &[
        ("all", SslOptions::ALL),
        ("allow_unsafe_legacy_renegotiation", SslOptions::ALLOW_UNSAFE_LEGACY_RENEGOTIATION),
        ("cipher_server_preference", SslOptions::CIPHER_SERVER_PREFERENCE),
        ("cookie_exchange", SslOptions::COOKIE_EXCHANGE),
        ("dont_insert_empty_fragments", SslOptions::DONT_INSERT_EMPTY_FRAGMENTS),
        ("no_compression", SslOptions::NO_COMPRESSION),
        ("no_query_mtu", SslOptions::NO_QUERY_MTU),
        ("no_session_resumption_on_renegotiation", SslOptions::NO_SESSION_RESUMPTION_ON_RENEGOTIATION),
        ("no_sslv2", SslOptions::NO_SSLV2),
        ("no_sslv3", SslOptions::NO_SSLV3),
        ("no_ticket", SslOptions::NO_TICKET),
        ("no_tlsv1", SslOptions::NO_TLSV1),
        ("no_tlsv1_1", SslOptions::NO_TLSV1_1),
        ("no_tlsv1_2", SslOptions::NO_TLSV1_2),
        ("no_tlsv1_3", SslOptions::NO_TLSV1_3),
        ("single_dh_use", SslOptions::SINGLE_DH_USE),
        ("single_ecdh_use", SslOptions::SINGLE_ECDH_USE),
        ("tls_rollback_bug", SslOptions::TLS_ROLLBACK_BUG),
    ],
);

/// Session cache mode. `true` means both sides, `false` means off.
pub static SESSION_CACHE_FLAGS: FlagTable<SslSessionCacheMode> = FlagTable::with_switch(
    FlagDomain::SessionCache,
    &[
        ("off", SslSessionCacheMode::OFF),
        ("client", SslSessionCacheMode::CLIENT),
        ("server", SslSessionCacheMode::SERVER),
        ("both", SslSessionCacheMode::BOTH),
        ("no_auto_clear", SslSessionCacheMode::NO_AUTO_CLEAR),
        ("no_internal_lookup", SslSessionCacheMode::NO_INTERNAL_LOOKUP),
        ("no_internal_store", SslSessionCacheMode::NO_INTERNAL_STORE),
        ("no_internal", SslSessionCacheMode::NO_INTERNAL),
    ],
    SslSessionCacheMode::BOTH,
    SslSessionCacheMode::OFF,
);
