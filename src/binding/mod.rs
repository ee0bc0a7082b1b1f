//! Host binding module
//!
//! Exposes a [`TlsContext`](crate::TlsContext) to a dynamically typed
//! embedding host (a scripting runtime, a plugin ABI) as an object with a
//! method table. Arguments and results are [`HostValue`]s.
//!
//! # Example
//!
//! ```
//! use tls_context::binding::{create, Created, HostValue};
//!
//! # fn main() -> Result<(), tls_context::binding::BindingError> {
//! let Created::Context(mut ctx) = create(&["sslv23".into()])? else {
//!     panic!("engine could not allocate a context");
//! };
//! let result = ctx.call("setmode", &["client".into()])?;
//! assert_eq!(result, vec![HostValue::Boolean(true)]);
//! ctx.call("__gc", &[])?;
//! # Ok(())
//! # }
//! ```

mod error;
mod methods;
mod value;

pub use error::{BindingError, BindingResult};
pub use methods::{create, ContextObject, Created, METHODS};
pub use value::{HostFunction, HostValue};
