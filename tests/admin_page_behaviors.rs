use admin_page::{
    Conventions, Error, Handler, Page, TimerTask, calculate_price, format_currency, install_all,
    install_page_controls, install_sidebar,
};

const PRODUCT_FORM_HTML: &str = r#"
<body>
  <aside class="sidebar">
    <a class="nav-link" href="/admin/products">Products</a>
    <a class="nav-link" href="orders?status=open">Orders</a>
  </aside>
  <div class="flash-messages">
    <div class="flash success" id="saved">Product saved</div>
  </div>
  <div class="language-switch">
    <a id="lang-en" class="active" href="?lang=en">EN</a>
    <a id="lang-ta" href="?lang=ta">TA</a>
  </div>
  <form id="product" action="/admin/products" method="post">
    <input id="name" name="name" required>
    <textarea id="notes" name="notes" required></textarea>
    <input id="phone" type="tel" name="supplier_phone">
    <input id="qty" type="number" name="stock" min="1" max="10">
    <button id="save" type="submit">Save</button>
  </form>
</body>
"#;

fn product_page() -> admin_page::Result<Page> {
    let mut page = Page::from_html_with_url("http://shop.test/admin/dashboard", PRODUCT_FORM_HTML)?;
    page.set_trace_stderr(false);
    install_all(&mut page)?;
    Ok(page)
}

#[test]
fn each_failed_submit_adds_one_flash_but_markers_stay_single() -> admin_page::Result<()> {
    let mut page = product_page()?;
    for attempt in 1..=3 {
        page.click("#save")?;
        page.assert_count(".flash.error", attempt)?;
    }
    page.assert_count(".error-msg", 2)?;
    page.assert_text("#name + .error-msg", "This field is required")?;
    page.assert_text("#notes + .error-msg", "This field is required")?;
    assert!(page.submissions().is_empty());
    Ok(())
}

#[test]
fn valid_form_submits_and_clears_markers() -> admin_page::Result<()> {
    let mut page = product_page()?;
    page.click("#save")?;
    page.type_text("#name", "Brass lamp")?;
    page.type_text("#notes", "Hand polished")?;
    page.click("#save")?;

    page.assert_missing(".error-msg")?;
    page.assert_style("#name", "border-color", "#ddd")?;
    page.assert_style("#notes", "border-color", "#ddd")?;
    assert_eq!(page.submissions().len(), 1);
    page.assert_count(".flash.error", 1)?;
    Ok(())
}

#[test]
fn only_the_blank_field_is_flagged() -> admin_page::Result<()> {
    let mut page = product_page()?;
    page.type_text("#name", "Brass lamp")?;
    page.submit("#product")?;
    page.assert_style("#name", "border-color", "#ddd")?;
    page.assert_style("#notes", "border-color", "#f44336")?;
    page.assert_count(".error-msg", 1)?;
    page.assert_exists("#notes + .error-msg")?;
    Ok(())
}

#[test]
fn phone_input_keeps_ten_digits() -> admin_page::Result<()> {
    let mut page = product_page()?;
    page.type_keys("#phone", "12-34 abc56789012")?;
    page.assert_value("#phone", "1234567890")?;
    Ok(())
}

#[test]
fn quantity_is_clamped_on_change() -> admin_page::Result<()> {
    let mut page = product_page()?;
    for (typed, expected) in [("0", "1"), ("15", "10"), ("abc", "1"), ("4", "4")] {
        page.commit_value("#qty", typed)?;
        page.assert_value("#qty", expected)?;
    }
    Ok(())
}

#[test]
fn server_flash_fades_then_disappears() -> admin_page::Result<()> {
    let mut page = product_page()?;
    let timers = page.pending_timers();
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0].due_at, 5000);
    assert!(matches!(timers[0].task, TimerTask::FadeFlash(_)));

    page.advance_time(4999)?;
    page.assert_style("#saved", "opacity", "")?;
    page.advance_time(1)?;
    page.assert_style("#saved", "opacity", "0")?;
    page.assert_style("#saved", "transform", "translateX(100%)")?;

    page.advance_time(299)?;
    page.assert_exists("#saved")?;
    page.advance_time(1)?;
    page.assert_missing("#saved")?;
    assert!(page.pending_timers().is_empty());
    Ok(())
}

#[test]
fn validation_flash_is_removed_without_fading() -> admin_page::Result<()> {
    let mut page = product_page()?;
    page.remove("#saved")?;
    page.advance_time(1000)?;
    page.click("#save")?;

    page.advance_time_to(5999)?;
    page.assert_exists(".flash.error")?;
    page.assert_style(".flash.error", "opacity", "")?;
    page.advance_time_to(6000)?;
    page.assert_missing(".flash.error")?;
    page.assert_exists(".flash-messages")?;
    Ok(())
}

#[test]
fn validation_flash_container_is_created_when_missing() -> admin_page::Result<()> {
    let mut page = Page::from_html(r#"<body><form id="f"><input required id="x"></form></body>"#)?;
    install_page_controls(&mut page)?;
    page.submit("#f")?;
    page.assert_style(".flash-messages", "position", "fixed")?;
    page.assert_text(".flash-messages > .flash.error > .material-icons", "error")?;
    page.assert_text(".flash.error", "error Please fill in all required fields")?;
    Ok(())
}

#[test]
fn removing_a_flash_cancels_its_timers() -> admin_page::Result<()> {
    let mut page = product_page()?;
    page.remove("#saved")?;
    assert!(page.pending_timers().is_empty());
    page.flush()?;

    page.click("#save")?;
    assert_eq!(page.pending_timers().len(), 1);
    page.remove(".flash-messages")?;
    assert!(page.pending_timers().is_empty());
    Ok(())
}

#[test]
fn cleared_timer_leaves_flash_in_place() -> admin_page::Result<()> {
    let mut page = product_page()?;
    let fade = page.pending_timers()[0].id;
    assert!(page.clear_timer(fade));
    assert!(!page.clear_timer(fade));
    page.advance_time(60_000)?;
    page.assert_exists("#saved")?;
    page.assert_style("#saved", "opacity", "")?;
    Ok(())
}

#[test]
fn language_switch_moves_active_class() -> admin_page::Result<()> {
    let mut page = product_page()?;
    page.click("#lang-ta")?;
    page.assert_class("#lang-ta", "active", true)?;
    page.assert_class("#lang-en", "active", false)?;
    page.click("#lang-en")?;
    page.assert_class("#lang-en", "active", true)?;
    page.assert_class("#lang-ta", "active", false)?;
    Ok(())
}

#[test]
fn sidebar_links_log_resolved_destinations_once() -> admin_page::Result<()> {
    let mut page = product_page()?;
    page.add_listener(".nav-link", "click", Handler::Log("legacy handler".into()))?;
    assert_eq!(install_sidebar(&mut page)?, 2);
    assert_eq!(page.listener_count(".sidebar .nav-link", "click")?, 1);

    page.take_console_logs();
    page.click(r#"a[href="/admin/products"]"#)?;
    page.click(r#".nav-link + .nav-link"#)?;
    assert_eq!(
        page.console_logs(),
        [
            "Navigating to: http://shop.test/admin/products",
            "Navigating to: http://shop.test/admin/orders?status=open",
        ]
    );
    Ok(())
}

#[test]
fn unload_stops_everything() -> admin_page::Result<()> {
    let mut page = product_page()?;
    page.unload();
    assert!(page.pending_timers().is_empty());
    assert_eq!(page.total_listeners(), 0);
    assert!(matches!(page.click("#save"), Err(Error::Runtime(_))));
    page.advance_time(10_000)?;
    page.assert_exists("#saved")?;
    Ok(())
}

#[test]
fn trace_records_timer_and_flash_activity() -> admin_page::Result<()> {
    let mut page = Page::from_html(r#"<div class="flash" id="note">Hi</div>"#)?;
    page.set_trace_stderr(false);
    page.enable_trace(true);
    install_page_controls(&mut page)?;
    page.flush()?;

    let logs = page.take_trace_logs();
    assert!(logs.iter().any(|line| {
        line == "[timer] schedule id=1 task=fade_flash target=div#note.flash due_at=5000"
    }));
    assert!(logs.iter().any(|line| line == "[flash] removed div#note.flash"));
    assert_eq!(page.now_ms(), 5300);
    Ok(())
}

#[test]
fn custom_conventions_change_timings_and_limits() -> admin_page::Result<()> {
    let mut page = Page::from_html(r#"<div class="notice" id="n">x</div><input type="tel" id="p">"#)?;
    page.set_conventions(Conventions {
        flash_selector: ".notice".into(),
        flash_dismiss_delay_ms: 1000,
        flash_fade_ms: 100,
        phone_max_digits: 4,
        ..Conventions::default()
    })?;
    install_page_controls(&mut page)?;

    page.type_text("#p", "98765")?;
    page.assert_value("#p", "9876")?;
    page.advance_time(1100)?;
    page.assert_missing("#n")?;
    Ok(())
}

#[test]
fn pricing_helpers() {
    assert_eq!(calculate_price(250, 3), 750);
    assert_eq!(format_currency(calculate_price(250, 3)), "₹750");
    assert_eq!(format_currency(125000), "₹1,25,000");
    assert_eq!(format_currency(calculate_price(f64::NAN, 2.0)), "₹NaN");
}
