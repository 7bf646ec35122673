use scraper::{ElementRef, Selector};

/// The first form in `html`.
#[track_caller]
pub(crate) fn must_get_form(html: &scraper::Html) -> ElementRef<'_> {
    let selector = Selector::parse("form").unwrap();

    html.select(&selector)
        .next()
        .unwrap_or_else(|| panic!("want a form in the document, got:\n{}", html.html()))
}

/// Check that `element` sends its request to `endpoint` with the HTMX `attribute`, e.g. "hx-post".
#[track_caller]
pub(crate) fn assert_hx_endpoint(element: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let got = element.value().attr(attribute);

    assert_eq!(
        got,
        Some(endpoint),
        "want {attribute}=\"{endpoint}\" on <{}>",
        element.value().name()
    );
}

/// Check that `form` has a required input called `name` of type `input_type`.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, input_type: &str) {
    let selector = Selector::parse(&format!("input[name='{name}']")).unwrap();
    let input = form
        .select(&selector)
        .next()
        .unwrap_or_else(|| panic!("want an input named \"{name}\""));

    assert_eq!(
        input.value().attr("type"),
        Some(input_type),
        "want input \"{name}\" to have type \"{input_type}\""
    );
    assert!(
        input.value().attr("required").is_some(),
        "want input \"{name}\" to be required"
    );
}

/// Check that `form` can be submitted with a button.
#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let selector = Selector::parse("button[type='submit']").unwrap();

    assert!(
        form.select(&selector).next().is_some(),
        "want a submit button in the form"
    );
}
