use crate::error::Result;
use crate::events::EventState;
use crate::page::Page;

/// Strips everything but ASCII digits and caps the length.
pub(crate) fn filter_phone(page: &mut Page, event: &mut EventState) -> Result<()> {
    let input = event.current_target;
    let value = page.dom.value(input)?;
    let digits = page.non_digit.replace_all(&value, "")?;
    let filtered = digits
        .chars()
        .take(page.conventions.phone_max_digits)
        .collect::<String>();
    if filtered != value {
        page.dom.set_value(input, &filtered)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::controls::install_page_controls;
    use crate::error::Result;
    use crate::page::Page;

    fn phone_page() -> Result<Page> {
        let mut page = Page::from_html(r#"<input type="tel" id="phone"><input id="plain">"#)?;
        install_page_controls(&mut page)?;
        Ok(page)
    }

    #[test]
    fn typing_keeps_only_the_first_ten_digits() -> Result<()> {
        let mut page = phone_page()?;
        page.type_keys("#phone", "12-34 abc56789012")?;
        page.assert_value("#phone", "1234567890")?;
        Ok(())
    }

    #[test]
    fn pasted_value_is_filtered_in_one_pass() -> Result<()> {
        let mut page = phone_page()?;
        page.type_text("#phone", "+91 (984) 012-3456")?;
        page.assert_value("#phone", "9198401234")?;
        Ok(())
    }

    #[test]
    fn non_ascii_digits_are_dropped() -> Result<()> {
        let mut page = phone_page()?;
        page.type_text("#phone", "٣4５6")?;
        page.assert_value("#phone", "46")?;
        Ok(())
    }

    #[test]
    fn input_type_matches_regardless_of_case() -> Result<()> {
        let mut page = Page::from_html(r#"<input type="TEL" id="upper"><input type="Number" id="qty" max="5">"#)?;
        install_page_controls(&mut page)?;
        page.type_text("#upper", "98-40")?;
        page.assert_value("#upper", "9840")?;
        page.commit_value("#qty", "9")?;
        page.assert_value("#qty", "5")?;
        Ok(())
    }

    #[test]
    fn other_inputs_are_untouched() -> Result<()> {
        let mut page = phone_page()?;
        page.type_text("#plain", "12-34")?;
        page.assert_value("#plain", "12-34")?;
        Ok(())
    }
}
