use crate::error::{Error, Result};
use crate::selector::parse_selector_groups;

/// Markup conventions and timings the page behaviors rely on.
///
/// Defaults match the admin templates: Material-style flash banners in the top
/// right corner, `#f44336` error red, five second auto-dismiss.
#[derive(Debug, Clone, PartialEq)]
pub struct Conventions {
    pub sidebar_link_selector: String,
    pub flash_selector: String,
    pub flash_container_class: String,
    pub form_selector: String,
    pub required_selector: String,
    pub phone_input_selector: String,
    pub quantity_input_selector: String,
    pub language_link_selector: String,
    pub active_class: String,
    pub error_marker_class: String,

    pub flash_dismiss_delay_ms: i64,
    pub flash_fade_ms: i64,
    pub validation_flash_lifetime_ms: i64,

    pub error_color: String,
    pub valid_border_color: String,
    pub required_field_text: String,
    pub validation_flash_text: String,
    pub validation_flash_icon: String,

    pub phone_max_digits: usize,
    pub quantity_default_min: i64,
    pub quantity_default_max: i64,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            sidebar_link_selector: ".sidebar .nav-link".into(),
            flash_selector: ".flash".into(),
            flash_container_class: "flash-messages".into(),
            form_selector: "form".into(),
            required_selector: "[required]".into(),
            phone_input_selector: r#"input[type="tel"]"#.into(),
            quantity_input_selector: r#"input[type="number"]"#.into(),
            language_link_selector: ".language-switch a".into(),
            active_class: "active".into(),
            error_marker_class: "error-msg".into(),

            flash_dismiss_delay_ms: 5000,
            flash_fade_ms: 300,
            validation_flash_lifetime_ms: 5000,

            error_color: "#f44336".into(),
            valid_border_color: "#ddd".into(),
            required_field_text: "This field is required".into(),
            validation_flash_text: "Please fill in all required fields".into(),
            validation_flash_icon: "error".into(),

            phone_max_digits: 10,
            quantity_default_min: 1,
            quantity_default_max: 999,
        }
    }
}

impl Conventions {
    pub(crate) fn flash_container_selector(&self) -> String {
        format!(".{}", self.flash_container_class)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for selector in [
            &self.sidebar_link_selector,
            &self.flash_selector,
            &self.form_selector,
            &self.required_selector,
            &self.phone_input_selector,
            &self.quantity_input_selector,
            &self.language_link_selector,
        ] {
            parse_selector_groups(selector)?;
        }
        parse_selector_groups(&self.flash_container_selector())?;

        for (name, delay) in [
            ("flash_dismiss_delay_ms", self.flash_dismiss_delay_ms),
            ("flash_fade_ms", self.flash_fade_ms),
            ("validation_flash_lifetime_ms", self.validation_flash_lifetime_ms),
        ] {
            if delay < 0 {
                return Err(Error::Runtime(format!(
                    "{name} must be non-negative (got {delay})"
                )));
            }
        }

        if self.quantity_default_min > self.quantity_default_max {
            return Err(Error::Runtime(format!(
                "quantity_default_min ({}) exceeds quantity_default_max ({})",
                self.quantity_default_min, self.quantity_default_max
            )));
        }
        Ok(())
    }
}
