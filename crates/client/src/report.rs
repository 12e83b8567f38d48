//! Turning responses and failures into what the page shows.

use senti_core::api::PredictResponse;
use senti_core::sentiment::{percent, SentimentLabel};
use senti_core::ConfigError;

use crate::client::ClientError;

pub const PROGRESS_WIDTH: usize = 30;

/// Display-ready view of one successful prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub positive_pct: String,
    pub negative_pct: String,
    pub text_length: usize,
    /// Positive probability clamped to `0.0..=1.0`, drives the progress bar.
    pub progress: f32,
    pub label: SentimentLabel,
}

impl Report {
    #[must_use]
    pub fn from_response(resp: &PredictResponse) -> Self {
        Self {
            positive_pct: percent(resp.positive),
            negative_pct: percent(resp.negative),
            text_length: resp.text_length,
            progress: resp.positive.clamp(0.0, 1.0),
            label: SentimentLabel::classify(resp.positive),
        }
    }
}

#[must_use]
pub fn progress_bar(progress: f32, width: usize) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((progress.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}

#[must_use]
pub fn render_report(report: &Report) -> String {
    format!(
        "Analysis complete\n  Positive     {}\n  Negative     {}\n  Text length  {}\n  {}\n  {} - {}\n",
        report.positive_pct,
        report.negative_pct,
        report.text_length,
        progress_bar(report.progress, PROGRESS_WIDTH),
        report.label.title(),
        report.label.message(),
    )
}

pub const CONNECT_HINT: &str = "Hint: start the backend with `senti serve`";

#[must_use]
pub fn render_error(err: &ClientError) -> String {
    match err {
        ClientError::Unauthorized => "API key error! Please check your API key.".to_string(),
        ClientError::Status(code) => format!("API error: {code}"),
        ClientError::Connect(_) => {
            format!("Could not connect to the backend server!\n{CONNECT_HINT}")
        }
        ClientError::Timeout => "The server did not respond. Please try again.".to_string(),
        ClientError::Decode(msg) | ClientError::Other(msg) => {
            format!("An unexpected error occurred: {msg}")
        }
    }
}

/// Shown instead of the page when the configuration cannot be loaded.
#[must_use]
pub fn render_config_error(err: &ConfigError) -> String {
    match err {
        ConfigError::MissingApiKey => {
            "API key not found! Run `senti setup` or set API_KEY.".to_string()
        }
        other => format!("Configuration error: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(positive: f32) -> PredictResponse {
        PredictResponse {
            negative: 1.0 - positive,
            positive,
            text_length: 12,
        }
    }

    #[test]
    fn report_percentages_and_label() {
        let report = Report::from_response(&response(0.8734));
        assert_eq!(report.positive_pct, "87.3%");
        assert_eq!(report.negative_pct, "12.7%");
        assert_eq!(report.text_length, 12);
        assert_eq!(report.label, SentimentLabel::VeryPositive);
    }

    #[test]
    fn report_label_boundaries() {
        for (positive, label) in [
            (0.60, SentimentLabel::Neutral),
            (0.61, SentimentLabel::VeryPositive),
            (0.40, SentimentLabel::Negative),
            (0.41, SentimentLabel::Neutral),
        ] {
            assert_eq!(Report::from_response(&response(positive)).label, label, "{positive}");
        }
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0, 4), "[░░░░]");
        assert_eq!(progress_bar(0.5, 4), "[██░░]");
        assert_eq!(progress_bar(1.0, 4), "[████]");
        assert_eq!(progress_bar(7.0, 4), "[████]");
    }

    #[test]
    fn rendered_report_contains_metrics() {
        let text = render_report(&Report::from_response(&response(0.25)));
        assert!(text.contains("25.0%"));
        assert!(text.contains("75.0%"));
        assert!(text.contains("Negative - "));
    }

    #[test]
    fn connect_and_timeout_messages_differ() {
        let connect = render_error(&ClientError::Connect("refused".into()));
        let timeout = render_error(&ClientError::Timeout);
        assert_ne!(connect, timeout);
        assert!(connect.contains("senti serve"));
        assert!(!timeout.contains("senti serve"));
    }

    #[test]
    fn status_error_includes_code() {
        assert_eq!(render_error(&ClientError::Status(500)), "API error: 500");
    }

    #[test]
    fn unauthorized_message_hides_body() {
        let msg = render_error(&ClientError::Unauthorized);
        assert!(msg.contains("API key"));
        assert!(!msg.contains("detail"));
    }

    #[test]
    fn missing_key_config_message() {
        assert!(render_config_error(&ConfigError::MissingApiKey).contains("API key not found"));
    }
}
