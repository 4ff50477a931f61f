use chrono::NaiveDateTime;
use crate::chart::{render_yearly_page, write_page};
use crate::config::Config;
use crate::errors::ChartError;
use crate::history::load_history;
use crate::series::build_yearly_series;

/// Loads the history, builds the per-year series and writes the chart page
///
/// # Arguments
///
/// * 'config' - input directory and output file
/// * 'generated_at' - timestamp shown as generation time
pub fn generate_chart(config: &Config, generated_at: NaiveDateTime) -> Result<(), ChartError> {
    let history = load_history(&config.input_dir);
    let series = build_yearly_series(&history);
    let html = render_yearly_page(&series, generated_at)?;

    write_page(&config.output, &html)
}
