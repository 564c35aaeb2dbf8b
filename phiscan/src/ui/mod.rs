//! Console presentation: themes, status messages and report rendering.

pub mod output_format;
pub mod report_view;
pub mod theme;
