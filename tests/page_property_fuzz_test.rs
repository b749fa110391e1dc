use admin_page::{Page, install_all};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseResult};

const PAGE_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/page_property_fuzz_test.txt";
const DEFAULT_PAGE_PROPTEST_CASES: u32 = 128;

const CUSTOMER_FORM_HTML: &str = r#"
<body>
  <div class="flash-messages"><div class="flash info" id="welcome">Welcome back</div></div>
  <form id="customer">
    <input id="name" required>
    <input id="phone" type="tel" required>
    <input id="qty" type="number" min="2" max="40">
    <button id="save">Save</button>
  </form>
</body>
"#;

#[derive(Clone, Debug)]
enum FormAction {
    TypeName(String),
    TypePhone(String),
    CommitQuantity(String),
    Submit,
    Advance(i64),
}

fn page_proptest_cases() -> u32 {
    std::env::var("ADMIN_PAGE_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_PAGE_PROPTEST_CASES)
}

fn field_text_strategy() -> BoxedStrategy<String> {
    vec(
        prop_oneof![
            Just('a'),
            Just('z'),
            Just('0'),
            Just('5'),
            Just('9'),
            Just(' '),
            Just('-'),
            Just('+'),
            Just('.'),
            Just('('),
            Just('٣'),
            Just('\t'),
        ],
        0..=16,
    )
    .prop_map(|chars| chars.into_iter().collect())
    .boxed()
}

fn form_action_strategy() -> BoxedStrategy<FormAction> {
    prop_oneof![
        3 => field_text_strategy().prop_map(FormAction::TypeName),
        3 => field_text_strategy().prop_map(FormAction::TypePhone),
        2 => field_text_strategy().prop_map(FormAction::CommitQuantity),
        3 => Just(FormAction::Submit),
        2 => (0i64..=6000).prop_map(FormAction::Advance),
    ]
    .boxed()
}

fn run_action(page: &mut Page, action: &FormAction) -> admin_page::Result<()> {
    match action {
        FormAction::TypeName(value) => page.type_text("#name", value),
        FormAction::TypePhone(value) => page.type_text("#phone", value),
        FormAction::CommitQuantity(value) => page.commit_value("#qty", value),
        FormAction::Submit => page.click("#save"),
        FormAction::Advance(ms) => page.advance_time(*ms),
    }
}

fn failed(err: admin_page::Error) -> proptest::test_runner::TestCaseError {
    proptest::test_runner::TestCaseError::fail(format!("{err:?}"))
}

fn assert_form_invariants(actions: &[FormAction]) -> TestCaseResult {
    let mut page = Page::from_html(CUSTOMER_FORM_HTML).map_err(failed)?;
    page.set_trace_stderr(false);
    install_all(&mut page).map_err(failed)?;

    let mut rejected = 0usize;
    for (step, action) in actions.iter().enumerate() {
        let before = page.submissions().len();
        let flashes_before = page.count(".flash.error").map_err(failed)?;
        run_action(&mut page, action).map_err(failed)?;

        let phone = page.value_of("#phone").map_err(failed)?;
        prop_assert!(
            phone.len() <= 10 && phone.bytes().all(|b| b.is_ascii_digit()),
            "phone not filtered after step {step}: {phone:?}"
        );

        let qty = page.value_of("#qty").map_err(failed)?;
        if matches!(action, FormAction::CommitQuantity(_)) {
            let parsed = qty.parse::<i64>();
            prop_assert!(
                matches!(parsed, Ok(n) if (2..=40).contains(&n)),
                "quantity out of range after step {step}: {qty:?}"
            );
        }

        let markers = page.count(".error-msg").map_err(failed)?;
        prop_assert!(markers <= 2, "duplicate markers after step {step}: {markers}");

        if matches!(action, FormAction::Submit) {
            let accepted = page.submissions().len() > before;
            let flashes_after = page.count(".flash.error").map_err(failed)?;
            if accepted {
                prop_assert_eq!(markers, 0);
                prop_assert_eq!(flashes_after, flashes_before);
            } else {
                rejected += 1;
                prop_assert!(markers >= 1);
                prop_assert_eq!(flashes_after, flashes_before + 1);
            }
        }
    }

    let submits = actions
        .iter()
        .filter(|action| matches!(action, FormAction::Submit))
        .count();
    prop_assert_eq!(page.submissions().len() + rejected, submits);
    page.flush().map_err(failed)?;
    prop_assert!(page.pending_timers().is_empty());
    prop_assert_eq!(page.count(".flash").map_err(failed)?, 0);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: page_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(PAGE_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn form_actions_keep_page_invariants(actions in vec(form_action_strategy(), 1..=24)) {
        assert_form_invariants(&actions)?;
    }

    #[test]
    fn phone_filter_keeps_leading_ascii_digits(input in "\\PC{0,32}") {
        let mut page = Page::from_html(r#"<input type="tel" id="p">"#).map_err(failed)?;
        install_all(&mut page).map_err(failed)?;
        page.type_text("#p", &input).map_err(failed)?;
        let expected = input.chars().filter(char::is_ascii_digit).take(10).collect::<String>();
        prop_assert_eq!(page.value_of("#p").map_err(failed)?, expected);
    }
}
