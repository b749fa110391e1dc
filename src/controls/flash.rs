use crate::dom::NodeId;
use crate::error::Result;
use crate::page::Page;
use crate::scheduler::{TimerId, TimerTask};

/// Queues the fade-then-remove sequence for every flash message already on the page.
pub(crate) fn schedule_existing_flashes(page: &mut Page) -> Result<usize> {
    let flashes = page.select_all(&page.conventions.flash_selector)?;
    let delay = page.conventions.flash_dismiss_delay_ms;
    for flash in &flashes {
        page.schedule(delay, TimerTask::FadeFlash(*flash));
    }
    Ok(flashes.len())
}

pub(crate) fn run_flash_task(page: &mut Page, task: TimerTask) -> Result<()> {
    match task {
        TimerTask::FadeFlash(flash) => {
            page.dom.style_set(flash, "opacity", "0")?;
            page.dom.style_set(flash, "transform", "translateX(100%)")?;
            let fade = page.conventions.flash_fade_ms;
            page.schedule(fade, TimerTask::RemoveFlash(flash));
            Ok(())
        }
        TimerTask::RemoveFlash(flash) => {
            let label = page.trace_node_label(flash);
            page.remove_node(flash)?;
            page.trace_line(format!("[flash] removed {label}"));
            Ok(())
        }
    }
}

/// Appends the "required fields" banner to the flash container and queues its removal.
pub(crate) fn show_validation_flash(page: &mut Page) -> Result<(NodeId, TimerId)> {
    let container = flash_container(page)?;

    let flash = page.dom.create_detached_element("div");
    page.dom.set_attr(flash, "class", "flash error")?;
    let icon = page.dom.create_detached_element("span");
    page.dom.set_attr(icon, "class", "material-icons")?;
    let icon_name = page.conventions.validation_flash_icon.clone();
    page.dom.set_text_content(icon, &icon_name)?;
    page.dom.append_child(flash, icon)?;
    let text = format!(" {}", page.conventions.validation_flash_text);
    page.dom.create_text(flash, text);
    page.dom.append_child(container, flash)?;

    let lifetime = page.conventions.validation_flash_lifetime_ms;
    let timer = page.schedule(lifetime, TimerTask::RemoveFlash(flash));
    let label = page.trace_node_label(flash);
    page.trace_line(format!("[flash] created {label} timer={timer}"));
    Ok((flash, timer))
}

fn flash_container(page: &mut Page) -> Result<NodeId> {
    let selector = page.conventions.flash_container_selector();
    if let Some(existing) = page.dom.query_selector(&selector)? {
        return Ok(existing);
    }

    let container = page.dom.create_detached_element("div");
    page.dom
        .set_attr(container, "class", &page.conventions.flash_container_class)?;
    for (name, value) in [
        ("position", "fixed"),
        ("top", "80px"),
        ("right", "20px"),
        ("z-index", "1000"),
        ("max-width", "400px"),
    ] {
        page.dom.style_set(container, name, value)?;
    }
    let host = page.dom.body().unwrap_or(page.dom.root);
    page.dom.append_child(host, container)?;
    let label = page.trace_node_label(container);
    page.trace_line(format!("[flash] created container {label}"));
    Ok(container)
}
