use super::ui;
use crate::core::{PriceSeries, SeriesStatistics};
use crate::service::CachedDataService;
use anyhow::Result;
use comfy_table::Cell;

impl SeriesStatistics {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);

        table.add_row(vec![Cell::new("Samples"), Cell::new(self.samples)]);
        table.add_row(vec![Cell::new("Mean"), ui::number_cell(self.mean)]);
        table.add_row(vec![Cell::new("Std Dev"), ui::number_cell(self.std_dev)]);
        table.add_row(vec![Cell::new("Min"), ui::number_cell(self.min)]);
        table.add_row(vec![Cell::new("Max"), ui::number_cell(self.max)]);
        table.add_row(vec![Cell::new("Latest"), ui::number_cell(self.latest)]);
        table.add_row(vec![Cell::new("Change"), ui::number_cell(self.change)]);
        table.add_row(vec![
            Cell::new("Change %"),
            ui::change_cell(self.change_percent),
        ]);

        table.to_string()
    }
}

fn describe_window(series: &PriceSeries) -> Option<String> {
    let first = series.first()?;
    let last = series.last()?;
    Some(format!("{} .. {}", first.timestamp, last.timestamp))
}

pub async fn run(service: &CachedDataService, symbol: &str, window_minutes: u32) -> Result<()> {
    let pb = ui::new_spinner(&format!("Fetching {symbol}..."));
    let series = service.get_series(symbol, window_minutes).await;
    pb.finish_and_clear();

    println!(
        "Symbol: {} (last {} minutes)\n",
        ui::style_text(symbol, ui::StyleType::Title),
        window_minutes
    );

    match SeriesStatistics::from_series(&series) {
        Some(stats) => {
            println!("{}", stats.display_as_table());
            if let Some(window) = describe_window(&series) {
                println!("\n{}", ui::style_text(&window, ui::StyleType::Subtle));
            }
        }
        None => println!("No price data available for {symbol}."),
    }

    if service.is_using_fallback() {
        println!("\n{}", ui::fallback_notice());
    }
    Ok(())
}
