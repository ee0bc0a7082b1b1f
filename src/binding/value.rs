//! Dynamically typed values exchanged with an embedding host

use std::collections::BTreeMap;
use std::ffi::c_void;
use std::fmt;
use std::rc::Rc;

/// Zero-argument host function, e.g. a passphrase prompt
#[derive(Clone)]
pub struct HostFunction(Rc<dyn Fn() -> HostValue>);

impl HostFunction {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> HostValue + 'static,
    {
        HostFunction(Rc::new(f))
    }

    pub fn call(&self) -> HostValue {
        (self.0)()
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostFunction({:p})", Rc::as_ptr(&self.0))
    }
}

impl PartialEq for HostFunction {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A host value
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Nil,
    Boolean(bool),
    Integer(i64),
    /// Byte string; not required to be UTF-8
    Str(Vec<u8>),
    Function(HostFunction),
    Table(BTreeMap<String, HostValue>),
    /// Borrowed native pointer, never owned by the host
    LightPointer(*mut c_void),
}

impl HostValue {
    /// Host type name, as used in argument errors.
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Nil => "nil",
            HostValue::Boolean(_) => "boolean",
            HostValue::Integer(_) => "number",
            HostValue::Str(_) => "string",
            HostValue::Function(_) => "function",
            HostValue::Table(_) => "table",
            HostValue::LightPointer(_) => "lightuserdata",
        }
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn() -> HostValue + 'static,
    {
        HostValue::Function(HostFunction::new(f))
    }

    /// String contents, if this is a UTF-8 string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    /// Field of a table value.
    pub fn get(&self, key: &str) -> Option<&HostValue> {
        match self {
            HostValue::Table(fields) => fields.get(key),
            _ => None,
        }
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Boolean(b)
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        HostValue::Integer(n)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Str(s.as_bytes().to_vec())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Str(s.into_bytes())
    }
}

impl From<&[u8]> for HostValue {
    fn from(bytes: &[u8]) -> Self {
        HostValue::Str(bytes.to_vec())
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Nil => f.write_str("nil"),
            HostValue::Boolean(b) => write!(f, "{}", b),
            HostValue::Integer(n) => write!(f, "{}", n),
            HostValue::Str(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            HostValue::Function(func) => write!(f, "{:?}", func),
            HostValue::Table(fields) => write!(f, "table: {} fields", fields.len()),
            HostValue::LightPointer(ptr) => write!(f, "lightuserdata: {:p}", *ptr),
        }
    }
}
