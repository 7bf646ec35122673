//! Alert messages that are swapped into the page's alert container by HTMX.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A success or error message shown to the user after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message without details.
    SuccessSimple {
        /// The headline of the alert.
        message: String,
    },
    /// An error message with an explanation of what to do next.
    Error {
        /// The headline of the alert.
        message: String,
        /// Extra information shown below the headline.
        details: String,
    },
    /// An error message without details.
    ErrorSimple {
        /// The headline of the alert.
        message: String,
    },
}

impl Alert {
    fn parts(&self) -> (bool, &str, Option<&str>) {
        match self {
            Alert::SuccessSimple { message } => (true, message, None),
            Alert::Error { message, details } => (false, message, Some(details)),
            Alert::ErrorSimple { message } => (false, message, None),
        }
    }

    /// Render the alert as an HTML fragment.
    pub fn into_markup(self) -> Markup {
        let (is_success, message, details) = self.parts();

        let style = if is_success {
            "p-4 mb-4 text-sm rounded-lg border shadow-lg text-green-800 \
            border-green-300 bg-green-50 dark:bg-gray-800 dark:text-green-400 \
            dark:border-green-800"
        } else {
            "p-4 mb-4 text-sm rounded-lg border shadow-lg text-red-800 \
            border-red-300 bg-red-50 dark:bg-gray-800 dark:text-red-400 \
            dark:border-red-800"
        };

        html! {
            div role="alert" class=(style)
            {
                div class="flex items-start justify-between gap-4"
                {
                    div
                    {
                        p class="font-semibold" { (message) }

                        @if let Some(details) = details.filter(|details| !details.is_empty())
                        {
                            p class="mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="font-bold cursor-pointer"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }

    /// Render the alert as an HTML response body.
    pub fn into_html(self) -> Html<String> {
        Html(self.into_markup().into_string())
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;
    use scraper::Selector;

    use crate::{alert::Alert, test_utils::parse_html_fragment};

    #[tokio::test]
    async fn renders_message_and_details() {
        let alert = Alert::Error {
            message: "Could not save".to_owned(),
            details: "Try again".to_owned(),
        };

        let html = parse_html_fragment(alert.into_response()).await;

        let selector = Selector::parse("div[role=alert] p").unwrap();
        let text: Vec<String> = html
            .select(&selector)
            .map(|p| p.text().collect::<String>())
            .collect();
        assert_eq!(text, ["Could not save", "Try again"]);
    }

    #[tokio::test]
    async fn simple_alert_has_no_details() {
        let alert = Alert::SuccessSimple {
            message: "Deleted".to_owned(),
        };

        let html = parse_html_fragment(alert.into_response()).await;

        let selector = Selector::parse("div[role=alert] p").unwrap();
        assert_eq!(html.select(&selector).count(), 1);
    }
}
