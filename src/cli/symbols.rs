use super::ui;
use crate::core::Symbol;
use crate::service::CachedDataService;
use anyhow::Result;
use comfy_table::Cell;

pub fn render_symbols(symbols: &[Symbol]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("#"), ui::header_cell("Symbol")]);
    for (i, symbol) in symbols.iter().enumerate() {
        table.add_row(vec![Cell::new(i + 1), Cell::new(symbol)]);
    }
    table.to_string()
}

pub async fn run(service: &CachedDataService) -> Result<()> {
    let pb = ui::new_spinner("Fetching symbols...");
    let symbols = service.get_symbol_list().await;
    pb.finish_and_clear();

    println!(
        "{} ({})\n",
        ui::style_text("Available symbols", ui::StyleType::Title),
        symbols.len()
    );
    println!("{}", render_symbols(&symbols));

    if service.is_using_fallback() {
        println!("\n{}", ui::fallback_notice());
    }
    Ok(())
}
