//! Service binding discovery for bpdeps.
//!
//! A binding is an operator-supplied bundle of named entries with a type
//! and an optional provider. Dependency mirrors and checksum mappings are
//! configured through bindings of type `dependency-mirror` and
//! `dependency-mapping`.
//!
//! The resolution pipeline only depends on the [`BindingResolver`] trait;
//! [`FsBindingResolver`] is the default implementation that scans the
//! platform binding root. Environment variables are read through
//! [`ConfigSource`].

#![expect(
    clippy::missing_errors_doc,
    reason = "Error documentation to be added incrementally"
)]

mod binding;
mod config;
mod error;
mod resolver;

pub use binding::{Binding, Entry};
pub use config::{ConfigSource, ProcessEnv, StaticEnv};
pub use error::{Error, Result};
pub use resolver::{
    BindingResolver, CNB_BINDINGS, FsBindingResolver, SERVICE_BINDING_ROOT, StaticBindingResolver,
};
