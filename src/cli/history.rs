use super::ui;
use crate::app::Controller;
use crate::core::history::{ConversionRecord, DATE_FORMAT};
use comfy_table::Cell;

/// Renders records newest first. The slice is expected oldest first.
pub fn render(records: &[ConversionRecord], precision: usize) -> String {
    if records.is_empty() {
        return ui::style_text("No conversions found.", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Amount"),
        ui::header_cell("From"),
        ui::header_cell("To"),
        ui::header_cell("Result"),
    ]);

    for record in records.iter().rev() {
        table.add_row(vec![
            Cell::new(record.date.format(DATE_FORMAT)),
            ui::number_cell(record.amount.to_string()),
            Cell::new(&record.from_currency),
            Cell::new(&record.to_currency),
            ui::number_cell(format!("{:.precision$}", record.result)),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Conversion history", ui::StyleType::Title),
        table
    )
}

pub fn run(controller: &Controller, query: &str) {
    let records = controller.history(query);
    println!("{}", render(&records, controller.settings().precision));
}
