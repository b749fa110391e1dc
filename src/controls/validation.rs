use super::flash;
use crate::dom::NodeId;
use crate::error::Result;
use crate::events::EventState;
use crate::page::Page;

/// Checks every required field under the submitted form. Blocks the submit and
/// raises a flash when any of them is blank.
pub(crate) fn validate_required(page: &mut Page, event: &mut EventState) -> Result<()> {
    let form = event.current_target;
    let fields = page
        .dom
        .query_selector_all_from(form, &page.conventions.required_selector)?;

    let mut invalid = 0usize;
    for field in fields {
        let value = page.dom.value(field)?;
        if value.trim().is_empty() {
            invalid += 1;
            page.dom
                .style_set(field, "border-color", &page.conventions.error_color)?;
            ensure_error_marker(page, field)?;
        } else {
            page.dom
                .style_set(field, "border-color", &page.conventions.valid_border_color)?;
            remove_error_marker(page, field)?;
        }
    }

    if invalid > 0 {
        event.prevent_default();
        let label = page.trace_node_label(form);
        page.trace_event_line(format!("[validation] blocked submit form={label} invalid={invalid}"));
        flash::show_validation_flash(page)?;
    }
    Ok(())
}

fn ensure_error_marker(page: &mut Page, field: NodeId) -> Result<NodeId> {
    if let Some(marker) = page.error_markers.get(&field).copied() {
        if page.dom.is_connected(marker) {
            return Ok(marker);
        }
        page.error_markers.remove(&field);
    }

    let marker = match server_rendered_marker(page, field) {
        Some(existing) => existing,
        None => create_error_marker(page)?,
    };
    page.dom.insert_after(field, marker)?;
    page.error_markers.insert(field, marker);
    Ok(marker)
}

fn remove_error_marker(page: &mut Page, field: NodeId) -> Result<()> {
    let marker = page
        .error_markers
        .remove(&field)
        .or_else(|| server_rendered_marker(page, field));
    if let Some(marker) = marker {
        if page.dom.parent(marker).is_some() {
            page.remove_node(marker)?;
        }
    }
    Ok(())
}

// A marker the server rendered right after the field, not yet claimed by another field.
fn server_rendered_marker(page: &Page, field: NodeId) -> Option<NodeId> {
    let sibling = page.dom.next_element_sibling(field)?;
    if !page
        .dom
        .class_contains(sibling, &page.conventions.error_marker_class)
    {
        return None;
    }
    if page.error_markers.values().any(|owned| *owned == sibling) {
        return None;
    }
    Some(sibling)
}

fn create_error_marker(page: &mut Page) -> Result<NodeId> {
    let marker = page.dom.create_detached_element("div");
    page.dom
        .set_attr(marker, "class", &page.conventions.error_marker_class)?;
    page.dom
        .style_set(marker, "color", &page.conventions.error_color)?;
    page.dom.style_set(marker, "font-size", "0.85rem")?;
    page.dom.style_set(marker, "margin-top", "5px")?;
    page.dom
        .set_text_content(marker, &page.conventions.required_field_text)?;
    Ok(marker)
}

#[cfg(test)]
mod tests {
    use crate::controls::install_page_controls;
    use crate::error::Result;
    use crate::page::Page;

    fn form_page(body: &str) -> Result<Page> {
        let mut page = Page::from_html(&format!("<body><form id=\"f\">{body}</form></body>"))?;
        install_page_controls(&mut page)?;
        Ok(page)
    }

    #[test]
    fn blank_field_gets_marker_and_blocks_submit() -> Result<()> {
        let mut page = form_page(r#"<input id="name" required value="  ">"#)?;
        page.submit("#f")?;
        assert!(page.submissions().is_empty());
        page.assert_style("#name", "border-color", "#f44336")?;
        page.assert_text("#name + .error-msg", "This field is required")?;
        page.assert_style(".error-msg", "color", "#f44336")?;
        page.assert_style(".error-msg", "font-size", "0.85rem")?;
        page.assert_style(".error-msg", "margin-top", "5px")?;
        page.assert_count(".flash.error", 1)?;
        Ok(())
    }

    #[test]
    fn repeated_failures_keep_a_single_marker() -> Result<()> {
        let mut page = form_page(r#"<input id="name" required>"#)?;
        page.submit("#f")?;
        page.submit("#f")?;
        page.submit("#f")?;
        page.assert_count(".error-msg", 1)?;
        page.assert_count(".flash.error", 3)?;
        Ok(())
    }

    #[test]
    fn fixing_the_field_removes_marker_and_submits() -> Result<()> {
        let mut page = form_page(r#"<input id="name" required>"#)?;
        page.submit("#f")?;
        page.type_text("#name", "Murugan")?;
        page.submit("#f")?;
        page.assert_missing(".error-msg")?;
        page.assert_style("#name", "border-color", "#ddd")?;
        assert_eq!(page.submissions().len(), 1);
        Ok(())
    }

    #[test]
    fn unrelated_sibling_is_neither_blocking_nor_removed() -> Result<()> {
        let mut page = form_page(r#"<input id="name" required><small id="hint">As on ID card</small>"#)?;
        page.submit("#f")?;
        page.assert_text("#name + .error-msg", "This field is required")?;
        page.assert_exists(".error-msg + #hint")?;

        page.type_text("#name", "x")?;
        page.submit("#f")?;
        page.assert_exists("#name + #hint")?;
        page.assert_missing(".error-msg")?;
        Ok(())
    }

    #[test]
    fn marker_removed_elsewhere_is_recreated() -> Result<()> {
        let mut page = form_page(r#"<input id="name" required>"#)?;
        page.submit("#f")?;
        page.remove(".error-msg")?;
        page.submit("#f")?;
        page.assert_count(".error-msg", 1)?;
        Ok(())
    }

    #[test]
    fn server_rendered_marker_is_adopted() -> Result<()> {
        let mut page = form_page(
            r#"<input id="a" required><div class="error-msg" id="server">This field is required</div><input id="b" required>"#,
        )?;
        page.submit("#f")?;
        page.assert_count(".error-msg", 2)?;
        page.assert_exists("#a + #server")?;

        page.type_text("#a", "ok")?;
        page.submit("#f")?;
        page.assert_missing("#server")?;
        page.assert_exists("#b + .error-msg")?;
        Ok(())
    }

    #[test]
    fn checkbox_without_value_attribute_reads_on() -> Result<()> {
        let mut page = form_page(r#"<input id="agree" type="checkbox" required checked><button id="go">Go</button>"#)?;
        assert_eq!(page.value_of("#agree")?, "on");
        page.click("#go")?;
        assert_eq!(page.submissions().len(), 1);
        page.assert_missing(".error-msg")?;
        Ok(())
    }

    #[test]
    fn only_descendants_of_the_submitted_form_are_checked() -> Result<()> {
        let mut page = Page::from_html(
            r#"<form id="one"><input required id="x"></form><form id="two"><input id="y" required value="v"></form>"#,
        )?;
        install_page_controls(&mut page)?;
        page.submit("#two")?;
        assert_eq!(page.submissions().len(), 1);
        page.assert_missing(".error-msg")?;
        page.assert_style("#x", "border-color", "")?;
        Ok(())
    }
}
