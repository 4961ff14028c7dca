// src/engine/mod.rs

//! Restart loops for dux.
//!
//! - [`supervisor`] drives an OS command through a [`ProcessRunner`]:
//!   start, wait on a [`Trigger`], stop the whole process group, repeat.
//! - [`reload`] does the same for an in-process function whose result
//!   implements [`Closer`].
//!
//! Both loops check the top-level cancellation token before every
//! iteration, so no extra run is started once shutdown has been requested.
//!
//! [`ProcessRunner`]: crate::exec::ProcessRunner
//! [`Trigger`]: crate::watch::Trigger

pub mod reload;
pub mod supervisor;

pub use reload::{Closer, Reloader};
pub use supervisor::{Supervisor, SupervisorReport};
