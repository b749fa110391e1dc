//! Page behaviors and the setup routines that attach them.
//!
//! Each setup routine registers its listeners once against the elements present
//! when it runs, mirroring a document-ready initializer.

pub(crate) mod flash;
mod language;
mod phone;
mod quantity;
mod sidebar;
mod validation;

pub use sidebar::resolve_href;

use crate::dom::NodeId;
use crate::error::Result;
use crate::events::{EventState, Handler, Listener};
use crate::page::Page;

/// Wires flash timers, form validation, phone filtering, quantity clamping and the
/// language switch. Returns a summary of what was attached.
pub fn install_page_controls(page: &mut Page) -> Result<ControlsReport> {
    let flash_messages = flash::schedule_existing_flashes(page)?;

    let forms = page.select_all(&page.conventions.form_selector)?;
    attach(page, &forms, "submit", Handler::ValidateRequired);

    let phone_inputs = page.select_all(&page.conventions.phone_input_selector)?;
    attach(page, &phone_inputs, "input", Handler::FilterPhone);

    let quantity_inputs = page.select_all(&page.conventions.quantity_input_selector)?;
    attach(page, &quantity_inputs, "change", Handler::ClampQuantity);

    let language_links = page.select_all(&page.conventions.language_link_selector)?;
    attach(
        page,
        &language_links,
        "click",
        Handler::ActivateLanguage {
            group: language_links.clone(),
        },
    );

    let report = ControlsReport {
        flash_messages,
        forms: forms.len(),
        phone_inputs: phone_inputs.len(),
        quantity_inputs: quantity_inputs.len(),
        language_links: language_links.len(),
    };
    page.trace_line(format!("[controls] installed {report:?}"));
    Ok(report)
}

/// Makes every sidebar link owned by a single navigation-logging click listener.
/// Returns the number of links processed.
pub fn install_sidebar(page: &mut Page) -> Result<usize> {
    sidebar::rebind_sidebar_links(page)
}

/// Runs both initializers in page-load order.
pub fn install_all(page: &mut Page) -> Result<(ControlsReport, usize)> {
    let controls = install_page_controls(page)?;
    let sidebar_links = install_sidebar(page)?;
    Ok((controls, sidebar_links))
}

/// How many elements each behavior was attached to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlsReport {
    pub flash_messages: usize,
    pub forms: usize,
    pub phone_inputs: usize,
    pub quantity_inputs: usize,
    pub language_links: usize,
}

fn attach(page: &mut Page, nodes: &[NodeId], event: &str, handler: Handler) {
    for node in nodes {
        page.listeners.add(
            *node,
            event,
            Listener {
                capture: false,
                handler: handler.clone(),
            },
        );
    }
}

impl Page {
    pub(crate) fn run_handler(&mut self, handler: &Handler, event: &mut EventState) -> Result<()> {
        match handler {
            Handler::LogNavigation => sidebar::log_navigation(self, event),
            Handler::ValidateRequired => validation::validate_required(self, event),
            Handler::FilterPhone => phone::filter_phone(self, event),
            Handler::ClampQuantity => quantity::clamp_quantity(self, event),
            Handler::ActivateLanguage { group } => language::activate_language(self, event, group),
            Handler::Log(line) => {
                self.console_log(line.clone());
                Ok(())
            }
            Handler::PreventDefault => {
                event.prevent_default();
                Ok(())
            }
        }
    }
}
