use super::ui;
use crate::app::Controller;
use crate::core::currency::CurrencyCode;
use crate::core::rates::RateTable;
use anyhow::Result;
use chrono::Local;
use comfy_table::Cell;

/// Renders the rates of the configured currencies in `table`.
pub fn render(table: &RateTable, currencies: &[CurrencyCode], precision: usize) -> String {
    let mut output = ui::new_styled_table();
    output.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Per 1 {}", table.base())),
    ]);

    for code in currencies.iter().filter(|c| *c != table.base()) {
        let rate = table
            .get(code)
            .map_or_else(|| "N/A".to_string(), |r| format!("{r:.precision$}"));
        output.add_row(vec![Cell::new(code), ui::number_cell(rate)]);
    }

    let fetched = table.fetched_at().with_timezone(&Local);
    format!(
        "{}\n\n{}\n{}",
        ui::style_text(&format!("Exchange rates for {}", table.base()), ui::StyleType::Title),
        output,
        ui::style_text(
            &format!(
                "{} rates fetched at {}",
                table.len(),
                fetched.format("%Y-%m-%d %H:%M:%S")
            ),
            ui::StyleType::Subtle
        )
    )
}

pub async fn run(controller: &mut Controller, base: CurrencyCode) -> Result<()> {
    controller.select_from(base)?;

    let pb = ui::new_spinner("Fetching rates...");
    let result = controller.refresh_rates().await.cloned();
    pb.finish_and_clear();

    let settings = controller.settings();
    println!("{}", render(&result?, &settings.currencies, settings.precision));
    Ok(())
}
