//! Host method table for context objects

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use log::debug;

use crate::common::{ContextError, Result};
use crate::tls::{FlagToken, PasswordStrategy, SessionStats, TlsContext};

use super::error::{BindingError, BindingResult};
use super::value::HostValue;

/// Method names a context object answers to
pub const METHODS: [&str; 17] = [
    "locations",
    "loadcert",
    "loadkey",
    "setcipher",
    "setdepth",
    "setverify",
    "setoptions",
    "setmode",
    "settimeout",
    "setsessionidcontext",
    "setsessioncachemode",
    "setcachesize",
    "getcachesize",
    "stats",
    "rawcontext",
    "__gc",
    "__tostring",
];

/// Outcome of [`create`]
#[derive(Debug)]
pub enum Created {
    Context(ContextObject),
    /// `(nil, message)`
    Failed(Vec<HostValue>),
}

/// Host-facing constructor: `create(protocol)`.
pub fn create(args: &[HostValue]) -> BindingResult<Created> {
    let args = Args::new("create", args, 1);
    let protocol = args.string(0)?;

    Ok(match TlsContext::create(protocol) {
        Ok(ctx) => Created::Context(ContextObject::new(ctx)),
        Err(e) => {
            debug!("create({}) failed: {}", protocol, e);
            Created::Failed(vec![HostValue::Nil, HostValue::from(e.to_string())])
        }
    })
}

/// A context as seen by the host
#[derive(Debug)]
pub struct ContextObject {
    ctx: TlsContext,
}

impl ContextObject {
    pub fn new(ctx: TlsContext) -> Self {
        ContextObject { ctx }
    }

    pub fn context(&self) -> &TlsContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut TlsContext {
        &mut self.ctx
    }

    /// Dispatch `method` with `args` (the object itself excluded).
    ///
    /// Successful calls return `true` or the requested value. Validation
    /// and engine failures return `(false, message)`.
    pub fn call(&mut self, method: &str, args: &[HostValue]) -> BindingResult<Vec<HostValue>> {
        let args = Args::new(method, args, 2);
        let ctx = &mut self.ctx;

        let outcome = match method {
            "locations" => {
                let ca_file = args.opt_string(0)?.map(Path::new);
                let ca_dir = args.opt_string(1)?.map(Path::new);
                done(ctx.load_trust_locations(ca_file, ca_dir))
            }
            "loadcert" => done(ctx.load_certificate_chain(args.string(0)?)),
            "loadkey" => {
                let path = args.string(0)?;
                let password = args.password(1)?;
                done(ctx.load_private_key(path, password))
            }
            "setcipher" => done(ctx.set_cipher_list(args.string(0)?)),
            "setdepth" => {
                let depth = args.integer(0)?;
                let depth = i32::try_from(depth)
                    .map_err(|_| args.bad(0, "number has no integer representation"))?;
                done(ctx.set_verify_depth(depth))
            }
            "setverify" => done(ctx.set_verify_policy(args.strings(0)?)),
            "setoptions" => done(ctx.set_protocol_options(args.strings(0)?)),
            "setmode" => done(ctx.set_mode(args.string(0)?)),
            "settimeout" => ctx.set_timeout(args.integer(0)?).map(HostValue::Integer),
            "setsessionidcontext" => done(ctx.set_session_id_context(args.bytes(0)?)),
            "setsessioncachemode" => done(ctx.set_session_cache_mode(args.cache_tokens(0)?)),
            "setcachesize" => done(ctx.set_session_cache_size(args.integer(0)?)),
            "getcachesize" => ctx.session_cache_size().map(HostValue::Integer),
            "stats" => ctx.stats().map(stats_table),
            "rawcontext" => Ok(ctx
                .as_ptr()
                .map_or(HostValue::Nil, |ptr| HostValue::LightPointer(ptr.cast()))),
            "__gc" => {
                ctx.close();
                return Ok(Vec::new());
            }
            "__tostring" => Ok(HostValue::from(ctx.describe())),
            _ => return Err(BindingError::UnknownMethod(method.to_string())),
        };

        Ok(match outcome {
            Ok(value) => vec![value],
            Err(e) => {
                debug!("{}:{} failed: {}", ctx, method, e);
                vec![HostValue::Boolean(false), HostValue::from(e.to_string())]
            }
        })
    }
}

impl fmt::Display for ContextObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.ctx, f)
    }
}

fn done(result: Result<()>) -> Result<HostValue> {
    result.map(|()| HostValue::Boolean(true))
}

fn stats_table(stats: SessionStats) -> HostValue {
    let fields: BTreeMap<String, HostValue> = stats
        .entries()
        .into_iter()
        .map(|(name, value)| {
            (name.to_string(), HostValue::Integer(i64::try_from(value).unwrap_or(i64::MAX)))
        })
        .collect();
    HostValue::Table(fields)
}

/// Positional argument access with host-style error reporting
struct Args<'v> {
    method: &'v str,
    values: &'v [HostValue],
    /// Host position of `values[0]`
    offset: usize,
}

impl<'v> Args<'v> {
    fn new(method: &'v str, values: &'v [HostValue], offset: usize) -> Self {
        Args { method, values, offset }
    }

    fn bad(&self, index: usize, message: impl Into<String>) -> BindingError {
        BindingError::bad_argument(self.method, index + self.offset, message)
    }

    fn kind(&self, index: usize) -> &'static str {
        self.values.get(index).map_or("no value", HostValue::kind)
    }

    fn string(&self, index: usize) -> BindingResult<&'v str> {
        match self.values.get(index) {
            Some(HostValue::Str(bytes)) => std::str::from_utf8(bytes)
                .map_err(|_| self.bad(index, "string is not valid UTF-8")),
            _ => Err(self.bad(index, format!("string expected, got {}", self.kind(index)))),
        }
    }

    fn opt_string(&self, index: usize) -> BindingResult<Option<&'v str>> {
        match self.values.get(index) {
            None | Some(HostValue::Nil) => Ok(None),
            Some(_) => self.string(index).map(Some),
        }
    }

    fn bytes(&self, index: usize) -> BindingResult<&'v [u8]> {
        match self.values.get(index) {
            Some(HostValue::Str(bytes)) => Ok(bytes),
            _ => Err(self.bad(index, format!("string expected, got {}", self.kind(index)))),
        }
    }

    fn integer(&self, index: usize) -> BindingResult<i64> {
        match self.values.get(index) {
            Some(HostValue::Integer(n)) => Ok(*n),
            _ => Err(self.bad(index, format!("number expected, got {}", self.kind(index)))),
        }
    }

    /// Every argument from `from` on, as strings.
    fn strings(&self, from: usize) -> BindingResult<Vec<&'v str>> {
        (from..self.values.len()).map(|index| self.string(index)).collect()
    }

    fn cache_tokens(&self, from: usize) -> BindingResult<Vec<FlagToken<'v>>> {
        (from..self.values.len())
            .map(|index| match &self.values[index] {
                HostValue::Boolean(on) => Ok(FlagToken::Switch(*on)),
                HostValue::Str(_) => self.string(index).map(FlagToken::Name),
                other => Err(self.bad(index, format!("string or boolean expected, got {}", other.kind()))),
            })
            .collect()
    }

    /// nil, a string, or a function returning the passphrase.
    fn password(&self, index: usize) -> BindingResult<PasswordStrategy<'static>> {
        match self.values.get(index) {
            None | Some(HostValue::Nil) => Ok(PasswordStrategy::NoPassword),
            Some(HostValue::Str(bytes)) => Ok(PasswordStrategy::Static(bytes.clone())),
            Some(HostValue::Function(prompt)) => {
                let prompt = prompt.clone();
                // Anything but a string answer means "no passphrase"
                Ok(PasswordStrategy::on_demand(move || match prompt.call() {
                    HostValue::Str(bytes) => Some(bytes),
                    _ => None,
                }))
            }
            Some(other) => Err(self.bad(
                index,
                ContextError::InvalidPasswordArgument(other.kind().to_string()).to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object() -> ContextObject {
        match create(&[HostValue::from("sslv23")]).unwrap() {
            Created::Context(object) => object,
            Created::Failed(values) => panic!("create failed: {:?}", values),
        }
    }

    #[test]
    fn test_create_invalid_protocol() {
        match create(&[HostValue::from("tlsv9")]).unwrap() {
            Created::Failed(values) => {
                assert_eq!(values[0], HostValue::Nil);
                assert!(values[1].as_str().unwrap().contains("invalid protocol"));
            }
            Created::Context(_) => panic!("unexpected context"),
        }
    }

    #[test]
    fn test_create_requires_string() {
        let err = create(&[]).unwrap_err();
        assert_eq!(err, BindingError::bad_argument("create", 1, "string expected, got no value"));
    }

    #[test]
    fn test_setmode() {
        let mut obj = object();
        assert_eq!(obj.call("setmode", &["server".into()]).unwrap(), vec![HostValue::Boolean(true)]);

        let result = obj.call("setmode", &["proxy".into()]).unwrap();
        assert_eq!(result[0], HostValue::Boolean(false));
        assert!(result[1].as_str().unwrap().contains("invalid mode"));
    }

    #[test]
    fn test_password_argument_kinds() {
        let mut obj = object();
        let err = obj
            .call("loadkey", &["key.pem".into(), HostValue::Table(BTreeMap::new())])
            .unwrap_err();
        match err {
            BindingError::BadArgument { position, message, .. } => {
                assert_eq!(position, 3);
                assert!(message.contains("invalid callback value"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_cache_mode_argument_kinds() {
        let mut obj = object();
        assert_eq!(
            obj.call("setsessioncachemode", &["server".into(), false.into()]).unwrap(),
            vec![HostValue::Boolean(true)]
        );
        assert!(obj.call("setsessioncachemode", &[HostValue::from(1)]).is_err());
    }

    #[test]
    fn test_unknown_method() {
        let mut obj = object();
        assert_eq!(
            obj.call("handshake", &[]).unwrap_err(),
            BindingError::UnknownMethod("handshake".into())
        );
    }

    #[test]
    fn test_gc_is_idempotent() {
        let mut obj = object();
        assert!(obj.call("__gc", &[]).unwrap().is_empty());
        assert!(obj.call("__gc", &[]).unwrap().is_empty());
        assert_eq!(obj.call("rawcontext", &[]).unwrap(), vec![HostValue::Nil]);
        let text = obj.call("__tostring", &[]).unwrap();
        assert!(text[0].as_str().unwrap().starts_with("SSL context #"));
    }
}
