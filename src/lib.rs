//! Behaviors for the store admin pages, running on a small deterministic DOM.
//!
//! A [`Page`] is loaded from server-rendered HTML, behaviors are attached with
//! [`install_all`] (or the individual `install_*` functions), and user actions
//! such as [`Page::submit`] or [`Page::type_keys`] drive them. Timers run on a
//! virtual clock advanced with [`Page::advance_time`].
//!
//! ```
//! use admin_page::{Page, install_all};
//!
//! let mut page = Page::from_html(r#"<form id="f"><input id="name" required></form>"#)?;
//! install_all(&mut page)?;
//! page.submit("#f")?;
//! page.assert_text("#name + .error-msg", "This field is required")?;
//! # Ok::<(), admin_page::Error>(())
//! ```

mod controls;
mod conventions;
mod dom;
mod error;
mod events;
mod html;
mod page;
mod pricing;
mod regex;
mod scheduler;
mod selector;
mod trace;

pub use controls::{ControlsReport, install_all, install_page_controls, install_sidebar, resolve_href};
pub use conventions::Conventions;
pub use dom::NodeId;
pub use error::{Error, Result};
pub use events::{EventState, Handler};
pub use page::Page;
pub use pricing::{calculate_price, format_currency};
pub use scheduler::{PendingTimer, TimerId, TimerTask};
