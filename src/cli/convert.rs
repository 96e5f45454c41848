use super::ui;
use crate::app::{Controller, Outcome};
use crate::core::convert::Conversion;
use crate::core::currency::CurrencyCode;
use anyhow::Result;

pub fn render(conversion: &Conversion, precision: usize, history_warning: Option<&str>) -> String {
    let mut output = ui::style_text(&conversion.describe(precision), ui::StyleType::Result);
    if let Some(warning) = history_warning {
        output.push('\n');
        output.push_str(&ui::style_text(
            &format!("Conversion not saved: {warning}"),
            ui::StyleType::Warning,
        ));
    }
    output
}

/// Converts once and logs the result, for the `convert` subcommand.
pub async fn run(
    controller: &mut Controller,
    amount: &str,
    from: CurrencyCode,
    to: CurrencyCode,
) -> Result<()> {
    controller.select_from(from)?;
    controller.select_to(to)?;
    controller.set_amount(amount);

    let pb = ui::new_spinner("Fetching rates...");
    let outcome = controller.convert().await;
    pb.finish_and_clear();

    if let Outcome::Converted {
        conversion,
        history_warning,
    } = outcome?
    {
        println!(
            "{}",
            render(
                &conversion,
                controller.settings().precision,
                history_warning.as_deref()
            )
        );
    }
    Ok(())
}
