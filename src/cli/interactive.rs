//! Prompt loop driving the controller through its command table.

use super::{convert, history, rates, trend, ui};
use crate::app::{AppState, COMMANDS, CommandError, Controller, Outcome, find_command};
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

pub fn help_text() -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Command"), ui::header_cell("Description")]);
    for command in COMMANDS {
        let usage = if command.aliases.is_empty() {
            command.usage.to_string()
        } else {
            format!("{} ({})", command.usage, command.aliases.join(", "))
        };
        table.add_row(vec![usage, command.summary.to_string()]);
    }
    table.to_string()
}

pub fn status_line(state: &AppState) -> String {
    let amount = if state.amount.is_empty() {
        "-"
    } else {
        state.amount.as_str()
    };
    ui::style_text(
        &format!(
            "Amount: {amount}  {} -> {}",
            state.selection.from, state.selection.to
        ),
        ui::StyleType::Subtle,
    )
}

/// Text to print for a command outcome, if any.
pub fn render_outcome(outcome: &Outcome, controller: &Controller) -> Option<String> {
    let settings = controller.settings();
    match outcome {
        Outcome::Idle | Outcome::Quit => None,
        Outcome::Updated => Some(status_line(controller.state())),
        Outcome::Converted {
            conversion,
            history_warning,
        } => Some(convert::render(
            conversion,
            settings.precision,
            history_warning.as_deref(),
        )),
        Outcome::Rates(table) => Some(rates::render(table, &settings.currencies, settings.precision)),
        Outcome::History(records) => Some(history::render(records, settings.precision)),
        Outcome::Trend(points) => Some(trend::render(points, settings.precision)),
        Outcome::Currencies(codes) => Some(
            codes
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Outcome::Help => Some(help_text()),
    }
}

pub fn render_error(err: &CommandError) -> String {
    ui::style_text(&err.to_string(), ui::StyleType::Warning)
}

async fn dispatch_line(controller: &mut Controller, line: &str) -> Result<Outcome, CommandError> {
    let fetches = line
        .split_whitespace()
        .next()
        .and_then(find_command)
        .is_some_and(|c| c.fetches);

    if !fetches {
        return controller.dispatch(line).await;
    }
    let pb = ui::new_spinner("Fetching rates...");
    let outcome = controller.dispatch(line).await;
    pb.finish_and_clear();
    outcome
}

pub async fn run(controller: &mut Controller) -> Result<()> {
    println!(
        "{}\n{}",
        ui::style_text("Currency converter", ui::StyleType::Title),
        ui::style_text("Type 'help' for a list of commands.", ui::StyleType::Subtle)
    );

    let pb = ui::new_spinner("Fetching rates...");
    let diagnostic = controller.preload_rates().await;
    pb.finish_and_clear();
    if let Some(diagnostic) = diagnostic {
        println!("{}", ui::style_text(&diagnostic, ui::StyleType::Warning));
    }
    println!("{}", status_line(controller.state()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ui::style_text(">", ui::StyleType::Prompt));
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            debug!("End of input");
            break;
        };

        match dispatch_line(controller, &line).await {
            Ok(Outcome::Quit) => break,
            Ok(outcome) => {
                if let Some(text) = render_outcome(&outcome, controller) {
                    println!("{text}");
                }
            }
            Err(err) => {
                debug!(error = ?err, "Command failed");
                println!("{}", render_error(&err));
            }
        }
    }
    Ok(())
}
