//! Search and hierarchical browsing.
//!
//! - [`tokens`]: short stand-ins for long names inside action ids
//! - [`action`]: the `kind:param1:param2:page` action id codec
//! - [`view`]: views, buttons and page arithmetic
//! - [`engine`]: query resolution and action dispatch

pub mod action;
pub mod engine;
pub mod tokens;
pub mod view;

pub use action::{Action, ActionCodec, ActionError};
pub use engine::{NavigationEngine, Outcome};
pub use tokens::TokenCache;
pub use view::{Button, ButtonRow, PageDescriptor, View};
