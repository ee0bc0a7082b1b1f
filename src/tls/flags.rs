//! Token-to-bitmask aggregation
//!
//! Callers describe flag sets as loose textual tokens (`"peer"`,
//! `"no_sslv3"`, ...) and, for the session cache, plain booleans. Every flag
//! domain resolves through the same [`FlagTable`] and the same
//! validate-then-commit routine: all tokens are resolved first, and the
//! commit closure only runs when every one of them is known.

use std::fmt;
use std::ops::BitOr;

use crate::common::ContextError;

/// Bitmask type a [`FlagTable`] resolves to.
pub trait FlagBits: Copy + BitOr<Output = Self> + fmt::Debug {
    /// The mask with no bits set.
    fn none() -> Self;
}

macro_rules! impl_flag_bits {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FlagBits for $ty {
                #[inline]
                fn none() -> Self {
                    <$ty>::empty()
                }
            }
        )*
    };
}

impl_flag_bits!(
    openssl::ssl::SslVerifyMode,
    openssl::ssl::SslOptions,
    openssl::ssl::SslSessionCacheMode,
);

/// The flag domain a table belongs to; selects the error reported for an
/// unknown token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagDomain {
    /// Peer verification policy
    Verify,
    /// Protocol quirk options
    Options,
    /// Session cache mode
    SessionCache,
}

impl fmt::Display for FlagDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verify => write!(f, "verify"),
            Self::Options => write!(f, "options"),
            Self::SessionCache => write!(f, "session cache mode"),
        }
    }
}

/// A caller-supplied flag token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagToken<'a> {
    /// Textual flag name
    Name(&'a str),
    /// Boolean shorthand, only meaningful for tables with a switch pair
    Switch(bool),
}

impl<'a> From<&'a str> for FlagToken<'a> {
    fn from(name: &'a str) -> Self {
        FlagToken::Name(name)
    }
}

impl<'a> From<&'a String> for FlagToken<'a> {
    fn from(name: &'a String) -> Self {
        FlagToken::Name(name.as_str())
    }
}

impl From<bool> for FlagToken<'_> {
    fn from(on: bool) -> Self {
        FlagToken::Switch(on)
    }
}

impl fmt::Display for FlagToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagToken::Name(name) => f.write_str(name),
            FlagToken::Switch(on) => write!(f, "{}", on),
        }
    }
}

/// A token that did not resolve against its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidToken {
    pub domain: FlagDomain,
    pub token: String,
    /// 1-based position in the token sequence
    pub position: usize,
}

impl fmt::Display for InvalidToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} token '{}' at #{}", self.domain, self.token, self.position)
    }
}

impl std::error::Error for InvalidToken {}

impl From<InvalidToken> for ContextError {
    fn from(err: InvalidToken) -> Self {
        let InvalidToken { domain, token, position } = err;
        match domain {
            FlagDomain::Verify => ContextError::InvalidVerifyOption { token, position },
            FlagDomain::Options => ContextError::InvalidOption { token, position },
            FlagDomain::SessionCache => ContextError::InvalidCacheMode { token, position },
        }
    }
}

/// Static, read-only mapping from flag name to bits for one domain.
#[derive(Debug)]
pub struct FlagTable<F: 'static> {
    domain: FlagDomain,
    entries: &'static [(&'static str, F)],
    /// Bits for `true` and `false` tokens, when the domain accepts booleans
    switch: Option<(F, F)>,
}

impl<F: FlagBits> FlagTable<F> {
    pub const fn new(domain: FlagDomain, entries: &'static [(&'static str, F)]) -> Self {
        Self { domain, entries, switch: None }
    }

    pub const fn with_switch(
        domain: FlagDomain,
        entries: &'static [(&'static str, F)],
        on: F,
        off: F,
    ) -> Self {
        Self { domain, entries, switch: Some((on, off)) }
    }

    /// Resolve one token. Names are matched exactly.
    pub fn lookup(&self, token: FlagToken<'_>) -> Option<F> {
        match token {
            FlagToken::Name(name) => self
                .entries
                .iter()
                .find(|(candidate, _)| *candidate == name)
                .map(|(_, bits)| *bits),
            FlagToken::Switch(on) => self
                .switch
                .map(|(on_bits, off_bits)| if on { on_bits } else { off_bits }),
        }
    }

    /// Flag names accepted by this table, in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    /// Whether boolean tokens are accepted.
    pub fn accepts_switch(&self) -> bool {
        self.switch.is_some()
    }

    /// OR together every token, or report the first unknown one.
    ///
    /// Returns `Ok(None)` for an empty sequence so that callers can leave
    /// existing state untouched instead of committing an empty mask.
    pub fn aggregate<'t, I, T>(&self, tokens: I) -> Result<Option<F>, InvalidToken>
    where
        I: IntoIterator<Item = T>,
        T: Into<FlagToken<'t>>,
    {
        let mut combined: Option<F> = None;
        for (index, token) in tokens.into_iter().enumerate() {
            let token = token.into();
            let bits = self.lookup(token).ok_or_else(|| InvalidToken {
                domain: self.domain,
                token: token.to_string(),
                position: index + 1,
            })?;
            combined = Some(combined.map_or(bits, |acc| acc | bits));
        }
        Ok(combined)
    }

    /// Validate every token, then hand the combined mask to `commit`.
    ///
    /// `commit` runs at most once and never after a failed lookup. Returns
    /// whether it ran.
    pub fn commit<'t, I, T, C>(&self, tokens: I, commit: C) -> Result<bool, InvalidToken>
    where
        I: IntoIterator<Item = T>,
        T: Into<FlagToken<'t>>,
        C: FnOnce(F),
    {
        match self.aggregate(tokens)? {
            Some(mask) => {
                commit(mask);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
