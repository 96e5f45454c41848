use super::ui;
use crate::app::Controller;
use crate::core::currency::CurrencyCode;
use crate::core::trend::TrendPoint;
use comfy_table::Cell;

const BAR_WIDTH: usize = 30;

pub fn render(points: &[TrendPoint], precision: usize) -> String {
    if points.is_empty() {
        return ui::style_text("No data to chart yet.", ui::StyleType::Subtle);
    }

    let max = points.iter().map(|p| p.mean).fold(0.0_f64, f64::max);
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Mean result"),
        ui::header_cell("Conversions"),
        ui::header_cell(""),
    ]);

    for point in points {
        table.add_row(vec![
            Cell::new(point.date),
            ui::number_cell(format!("{:.precision$}", point.mean)),
            ui::number_cell(point.count.to_string()),
            Cell::new(ui::bar(point.mean, max, BAR_WIDTH)).fg(comfy_table::Color::Green),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Result trend", ui::StyleType::Title),
        table
    )
}

pub fn run(controller: &Controller, from: Option<&CurrencyCode>, to: Option<&CurrencyCode>) {
    let points = controller.trend(from, to);
    println!("{}", render(&points, controller.settings().precision));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_render_points() {
        let points = vec![
            TrendPoint {
                date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                mean: 15.0,
                count: 2,
            },
            TrendPoint {
                date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
                mean: 7.5,
                count: 1,
            },
        ];
        let output = render(&points, 2);
        assert!(output.contains("2024-05-01"));
        assert!(output.contains("15.00"));
        assert!(output.contains("7.50"));
    }

    #[test]
    fn test_render_placeholder() {
        assert!(render(&[], 2).contains("No data to chart yet."));
    }
}
