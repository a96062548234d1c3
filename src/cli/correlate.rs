use super::ui;
use crate::core::{CorrelationMatrix, CorrelationStrength, Symbol};
use crate::service::CachedDataService;
use anyhow::Result;
use comfy_table::Cell;

const TOP_PAIRS: usize = 5;

impl CorrelationMatrix {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        let mut header = vec![ui::header_cell("")];
        header.extend(self.symbols().iter().map(|s| ui::header_cell(s)));
        table.set_header(header);

        for a in self.symbols() {
            let mut row = vec![ui::header_cell(a)];
            row.extend(
                self.symbols()
                    .iter()
                    .map(|b| ui::correlation_cell(self.get(a, b).unwrap_or(0.0))),
            );
            table.add_row(row);
        }

        table.to_string()
    }

    /// Off-diagonal pairs ordered by absolute correlation, strongest first.
    pub fn strongest_pairs(&self, limit: usize) -> Vec<(Symbol, Symbol, f64)> {
        let symbols = self.symbols();
        let mut pairs: Vec<(Symbol, Symbol, f64)> = symbols
            .iter()
            .enumerate()
            .flat_map(move |(i, a)| {
                symbols[i + 1..].iter().map(move |b| {
                    (a.clone(), b.clone(), self.get(a, b).unwrap_or(0.0))
                })
            })
            .collect();
        pairs.sort_by(|x, y| y.2.abs().total_cmp(&x.2.abs()));
        pairs.truncate(limit);
        pairs
    }
}

fn render_pairs(pairs: &[(Symbol, Symbol, f64)]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Pair"),
        ui::header_cell("Correlation"),
        ui::header_cell("Strength"),
    ]);
    for (a, b, r) in pairs {
        table.add_row(vec![
            Cell::new(format!("{a} / {b}")),
            ui::correlation_cell(*r),
            Cell::new(CorrelationStrength::from_coefficient(*r)),
        ]);
    }
    table.to_string()
}

pub async fn run(
    service: &CachedDataService,
    symbols: &[Symbol],
    window_minutes: u32,
) -> Result<()> {
    let pb = ui::new_spinner(&format!("Fetching {} series...", symbols.len()));
    let series = service.get_many_series(symbols, window_minutes).await;
    pb.finish_and_clear();

    let missing: Vec<&str> = symbols
        .iter()
        .filter(|s| !series.contains_key(*s))
        .map(String::as_str)
        .collect();

    let matrix = CorrelationMatrix::build(symbols, &series);

    println!(
        "{} (last {} minutes)\n",
        ui::style_text("Correlation matrix", ui::StyleType::Title),
        window_minutes
    );
    println!("{}", matrix.display_as_table());

    let pairs = matrix.strongest_pairs(TOP_PAIRS);
    if !pairs.is_empty() {
        println!(
            "\n{}\n",
            ui::style_text("Strongest pairs", ui::StyleType::Label)
        );
        println!("{}", render_pairs(&pairs));
    }

    if !missing.is_empty() {
        println!(
            "\n{}",
            ui::style_text(
                &format!("No data for: {}", missing.join(", ")),
                ui::StyleType::Warning
            )
        );
    }
    if service.is_using_fallback() {
        println!("\n{}", ui::fallback_notice());
    }
    Ok(())
}
