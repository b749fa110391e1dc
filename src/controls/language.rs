use crate::dom::NodeId;
use crate::error::Result;
use crate::events::EventState;
use crate::page::Page;

/// Moves the active marker to the clicked link. Navigation is left alone.
pub(crate) fn activate_language(
    page: &mut Page,
    event: &mut EventState,
    group: &[NodeId],
) -> Result<()> {
    for link in group {
        if page.dom.element(*link).is_some() {
            page.dom.class_remove(*link, &page.conventions.active_class)?;
        }
    }
    page.dom
        .class_add(event.current_target, &page.conventions.active_class)?;
    Ok(())
}
