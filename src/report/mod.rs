mod format;
mod html;

pub use format::{escape_html, format_amount, format_decimal, format_money, group_digits};
pub use html::{render_html, report_filename, ReportScenario};
