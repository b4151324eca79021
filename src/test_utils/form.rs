use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

/// Get the form posting to `action`, skipping any other forms on the page
/// such as the per-row delete forms.
#[track_caller]
pub(crate) fn must_get_form_with_action<'a>(html: &'a Html, action: &str) -> ElementRef<'a> {
    html.select(&Selector::parse("form").unwrap())
        .find(|form| form.value().attr("action") == Some(action))
        .unwrap_or_else(|| panic!("No form found with action \"{action}\""))
}

#[track_caller]
pub(crate) fn assert_form_endpoint(form: &ElementRef<'_>, endpoint: &str) {
    let action = form
        .value()
        .attr("action")
        .expect("action attribute missing");

    assert_eq!(
        action, endpoint,
        "want form with attribute action=\"{endpoint}\", got {action:?}"
    );

    let method = form.value().attr("method").unwrap_or_default();
    assert_eq!(
        method.to_lowercase(),
        "post",
        "want form with method=\"post\", got {method:?}"
    );
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    for input in form.select(&Selector::parse("input").unwrap()) {
        let input_name = input.value().attr("name").unwrap_or_default();

        if input_name == name {
            let input_type = input.value().attr("type").unwrap_or_default();
            let input_required = input.value().attr("required");

            assert_eq!(
                input_type, type_,
                "want input with type \"{type_}\", got {input_type:?}"
            );

            assert!(
                input_required.is_some(),
                "want input with name {name} to have the required attribute but got none"
            );

            return;
        }
    }

    panic!("No input found with name \"{name}\" and type \"{type_}\"");
}

#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    for input in form.select(&Selector::parse("input").unwrap()) {
        let input_name = input.value().attr("name").unwrap_or_default();

        if input_name == name {
            let input_type = input.value().attr("type").unwrap_or_default();
            let input_value = input.value().attr("value").unwrap_or_default();

            assert_eq!(
                input_type, type_,
                "want input with type \"{type_}\", got {input_type:?}"
            );
            assert_eq!(
                input_value, value,
                "want input with value \"{value}\", got {input_value:?}"
            );

            return;
        }
    }

    panic!("No input found with name \"{name}\" and type \"{type_}\"");
}

/// Assert that `form` has a select with `name` whose options are exactly
/// `want_options` in order.
#[track_caller]
pub(crate) fn assert_form_select(form: &ElementRef<'_>, name: &str, want_options: &[&str]) {
    for select in form.select(&Selector::parse("select").unwrap()) {
        let select_name = select.value().attr("name").unwrap_or_default();

        if select_name == name {
            let got_options = select
                .select(&Selector::parse("option").unwrap())
                .map(|option| {
                    option.text().collect::<Vec<_>>().join("").trim().to_owned()
                })
                .collect::<Vec<_>>();

            assert_eq!(
                got_options, want_options,
                "want select \"{name}\" with options {want_options:?}, got {got_options:?}"
            );

            return;
        }
    }

    panic!("No select found with name \"{name}\"");
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let submit_button = form
        .select(&Selector::parse("button").unwrap())
        .next()
        .expect("No button found");

    assert_eq!(
        submit_button.value().attr("type").unwrap_or_default(),
        "submit",
        "want submit button with type=\"submit\""
    );
}

#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want_error_message: &str) {
    let p = Selector::parse("p").unwrap();
    let error_message = form
        .select(&p)
        .next()
        .expect("No error message found")
        .text()
        .collect::<Vec<_>>()
        .join("");
    let got_error_message = error_message.trim();

    assert_eq!(want_error_message, got_error_message);
}
