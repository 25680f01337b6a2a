//! PowerShell module, command and parameter-set introspection.
//!
//! This crate runs the interpreter through a [`CommandRunner`], tokenizes its
//! text output and builds the structured model defined in `psform-core`.
//!
//! # Main entry points
//!
//! - [`Introspector`] — `list_modules`, `list_commands` and
//!   `get_command_details` against configured interpreters.
//! - [`parameters::parse_command_details`] — parse pre-captured
//!   parameter-set output without running anything.
//! - [`ListingCache`] / [`ListingSnapshot`] — caller-owned listing state for
//!   display layers.
//!
//! # Example
//!
//! ```
//! use psform_core::Form;
//! use psform_discovery::parameters::parse_command_details;
//!
//! let raw = "\
//! Name|Name,String[], |Force,SwitchParameter, ErrorAction,ActionPreference,Stop;Continue
//! Id|Id,Int32[], |Force,SwitchParameter,
//! ";
//!
//! let details = parse_command_details(raw);
//! let set = details.display_set().unwrap();
//! assert_eq!(set.set_name, "Id");
//!
//! let form = Form::new("Stop-Process", set);
//! assert_eq!(form.fields[0].parameter_name, "Id");
//! assert!(form.fields[0].required);
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod introspector;
pub mod listing;
pub mod modules;
pub mod output;
pub mod parameters;
pub mod query;
pub mod runner;
pub mod tokenizer;

pub use error::{ConfigError, IntrospectionError, InvocationError, Result};
pub use introspector::Introspector;
pub use listing::{CaptureOptions, ListingCache, ListingSnapshot};
pub use runner::{CancelToken, CommandRunner, ProcessRunner, ScriptedRunner};
