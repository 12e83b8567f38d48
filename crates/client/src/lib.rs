//! Client side of senti: call the inference service, render the result.

pub mod client;
pub mod page;
pub mod report;

pub use client::{ClientError, PredictClient, Predictor};
pub use page::{Page, PageInfo, EXAMPLES};
pub use report::{render_config_error, render_error, render_report, Report};
