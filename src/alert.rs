//! Alert system for displaying error messages to users.
//!
//! Alerts are rendered as HTML fragments that HTMX swaps into the
//! `#alert-container` element of the base layout.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

const ERROR_STYLE: &str = "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
    dark:bg-gray-800 dark:text-red-400";

/// An error message with an optional line of details.
#[derive(Debug, Clone)]
pub struct Alert<'a> {
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> Alert<'a> {
    /// Create a new error alert
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self { message, details }
    }

    pub fn into_html(self) -> Markup {

        html! {
            div
                class=(ERROR_STYLE)
                role="alert"
                hx-swap-oob="innerHTML:#alert-container"
            {
                span class="font-medium" { (self.message) }

                @if !self.details.is_empty() {
                    " " (self.details)
                }

                button
                    type="button"
                    class="ms-2 underline"
                    onclick="this.parentElement.remove()"
                {
                    "Dismiss"
                }
            }
        }
    }

    /// Render the alert as a response with `status_code`.
    pub fn into_response_with_status(self, status_code: StatusCode) -> Response {
        (status_code, self.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn error_alert_has_message_and_details() {
        let markup = Alert::error("Could not save", "Try again.").into_html();
        let fragment = Html::parse_fragment(&markup.into_string());
        let selector = Selector::parse("div[role=alert]").unwrap();

        let alert = fragment.select(&selector).next().expect("no alert found");
        let text = alert.text().collect::<String>();

        assert!(text.contains("Could not save"));
        assert!(text.contains("Try again."));
        assert!(alert.value().attr("class").unwrap().contains("text-red-800"));
    }

    #[test]
    fn response_uses_given_status() {
        let response =
            Alert::error("Not found", "").into_response_with_status(StatusCode::NOT_FOUND);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
