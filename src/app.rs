//! Toolkit-independent application controller.
//!
//! The controller owns the [`AppState`] and talks to the rate provider
//! and the history store through their traits. Front ends feed it user
//! events either by calling its methods or through the [`COMMANDS`]
//! dispatch table, and render the returned [`Outcome`].

use crate::core::convert::{self, Conversion, ConversionError, Selection};
use crate::core::currency::{CurrencyCode, CurrencyCodeError, default_currencies};
use crate::core::history::{ConversionRecord, HistoryError, HistoryStore};
use crate::core::rates::{FetchError, RateProvider, RateTable};
use crate::core::recover::recover;
use crate::core::trend::{self, TrendPoint};
use chrono::{Local, NaiveDateTime, Timelike};
use futures::FutureExt;
use futures::future::BoxFuture;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct AppState {
    /// Amount as typed by the user; validated on conversion
    pub amount: String,
    pub selection: Selection,
    pub rates: Option<RateTable>,
    /// Result currently on display, cleared when it goes stale
    pub last_result: Option<Conversion>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub currencies: Vec<CurrencyCode>,
    pub precision: usize,
}

/// Everything a command can fail with. None of these end the session.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Currency(#[from] CurrencyCodeError),
    #[error("{0} is not one of the configured currencies")]
    Unsupported(CurrencyCode),
    #[error("Unknown command '{0}'. Type 'help' for a list of commands")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Idle,
    /// Input or selection changed
    Updated,
    Converted {
        conversion: Conversion,
        history_warning: Option<String>,
    },
    Rates(RateTable),
    History(Vec<ConversionRecord>),
    Trend(Vec<TrendPoint>),
    Currencies(Vec<CurrencyCode>),
    Help,
    Quit,
}

pub type CommandResult = Result<Outcome, CommandError>;

type Handler = for<'c> fn(&'c mut Controller, &'c [String]) -> BoxFuture<'c, CommandResult>;

pub struct Command {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub summary: &'static str,
    /// The command may call the rate provider
    pub fetches: bool,
    handler: Handler,
}

pub const COMMANDS: &[Command] = &[
    Command {
        name: "amount",
        aliases: &["a"],
        usage: "amount <VALUE>",
        summary: "Set the amount to convert",
        fetches: false,
        handler: cmd_amount,
    },
    Command {
        name: "from",
        aliases: &[],
        usage: "from <CODE>",
        summary: "Select the source currency",
        fetches: false,
        handler: cmd_from,
    },
    Command {
        name: "to",
        aliases: &[],
        usage: "to <CODE>",
        summary: "Select the target currency",
        fetches: false,
        handler: cmd_to,
    },
    Command {
        name: "swap",
        aliases: &["s"],
        usage: "swap",
        summary: "Swap source and target currencies",
        fetches: false,
        handler: cmd_swap,
    },
    Command {
        name: "convert",
        aliases: &["c"],
        usage: "convert [AMOUNT]",
        summary: "Convert the amount and log it to history",
        fetches: true,
        handler: cmd_convert,
    },
    Command {
        name: "refresh",
        aliases: &[],
        usage: "refresh",
        summary: "Fetch fresh rates for the source currency",
        fetches: true,
        handler: cmd_refresh,
    },
    Command {
        name: "rates",
        aliases: &[],
        usage: "rates",
        summary: "Show rates for the source currency",
        fetches: true,
        handler: cmd_rates,
    },
    Command {
        name: "history",
        aliases: &["h"],
        usage: "history [QUERY]",
        summary: "Show logged conversions, newest first",
        fetches: false,
        handler: cmd_history,
    },
    Command {
        name: "trend",
        aliases: &["t"],
        usage: "trend [FROM] [TO]",
        summary: "Show the daily mean of conversion results",
        fetches: false,
        handler: cmd_trend,
    },
    Command {
        name: "currencies",
        aliases: &["list"],
        usage: "currencies",
        summary: "List the available currencies",
        fetches: false,
        handler: cmd_currencies,
    },
    Command {
        name: "help",
        aliases: &["?"],
        usage: "help",
        summary: "Show this help",
        fetches: false,
        handler: cmd_help,
    },
    Command {
        name: "quit",
        aliases: &["exit", "q"],
        usage: "quit",
        summary: "Leave the converter",
        fetches: false,
        handler: cmd_quit,
    },
];

pub fn find_command(name: &str) -> Option<&'static Command> {
    let name = name.to_lowercase();
    COMMANDS
        .iter()
        .find(|c| c.name == name || c.aliases.contains(&name.as_str()))
}

fn cmd_amount<'c>(ctl: &'c mut Controller, args: &'c [String]) -> BoxFuture<'c, CommandResult> {
    async move {
        let [value] = args else {
            return Err(CommandError::Usage("amount <VALUE>"));
        };
        ctl.set_amount(value);
        Ok(Outcome::Updated)
    }
    .boxed()
}

fn cmd_from<'c>(ctl: &'c mut Controller, args: &'c [String]) -> BoxFuture<'c, CommandResult> {
    async move {
        let [code] = args else {
            return Err(CommandError::Usage("from <CODE>"));
        };
        ctl.select_from(code.parse::<CurrencyCode>()?)?;
        Ok(Outcome::Updated)
    }
    .boxed()
}

fn cmd_to<'c>(ctl: &'c mut Controller, args: &'c [String]) -> BoxFuture<'c, CommandResult> {
    async move {
        let [code] = args else {
            return Err(CommandError::Usage("to <CODE>"));
        };
        ctl.select_to(code.parse::<CurrencyCode>()?)?;
        Ok(Outcome::Updated)
    }
    .boxed()
}

fn cmd_swap<'c>(ctl: &'c mut Controller, _args: &'c [String]) -> BoxFuture<'c, CommandResult> {
    async move {
        ctl.swap();
        Ok(Outcome::Updated)
    }
    .boxed()
}

fn cmd_convert<'c>(ctl: &'c mut Controller, args: &'c [String]) -> BoxFuture<'c, CommandResult> {
    async move {
        match args {
            [] => {}
            [value] => ctl.set_amount(value),
            _ => return Err(CommandError::Usage("convert [AMOUNT]")),
        }
        ctl.convert().await
    }
    .boxed()
}

fn cmd_refresh<'c>(ctl: &'c mut Controller, _args: &'c [String]) -> BoxFuture<'c, CommandResult> {
    async move { Ok(Outcome::Rates(ctl.refresh_rates().await?.clone())) }.boxed()
}

fn cmd_rates<'c>(ctl: &'c mut Controller, _args: &'c [String]) -> BoxFuture<'c, CommandResult> {
    async move { Ok(Outcome::Rates(ctl.ensure_rates().await?.clone())) }.boxed()
}

fn cmd_history<'c>(ctl: &'c mut Controller, args: &'c [String]) -> BoxFuture<'c, CommandResult> {
    async move { Ok(Outcome::History(ctl.history(&args.join(" ")))) }.boxed()
}

fn cmd_trend<'c>(ctl: &'c mut Controller, args: &'c [String]) -> BoxFuture<'c, CommandResult> {
    async move {
        let (from, to) = match args {
            [] => (None, None),
            [from] => (Some(from.parse::<CurrencyCode>()?), None),
            [from, to] => (
                Some(from.parse::<CurrencyCode>()?),
                Some(to.parse::<CurrencyCode>()?),
            ),
            _ => return Err(CommandError::Usage("trend [FROM] [TO]")),
        };
        Ok(Outcome::Trend(ctl.trend(from.as_ref(), to.as_ref())))
    }
    .boxed()
}

fn cmd_currencies<'c>(ctl: &'c mut Controller, _args: &'c [String]) -> BoxFuture<'c, CommandResult> {
    async move { Ok(Outcome::Currencies(ctl.settings.currencies.clone())) }.boxed()
}

fn cmd_help<'c>(_ctl: &'c mut Controller, _args: &'c [String]) -> BoxFuture<'c, CommandResult> {
    async move { Ok(Outcome::Help) }.boxed()
}

fn cmd_quit<'c>(_ctl: &'c mut Controller, _args: &'c [String]) -> BoxFuture<'c, CommandResult> {
    async move { Ok(Outcome::Quit) }.boxed()
}

pub struct Controller {
    state: AppState,
    settings: Settings,
    provider: Box<dyn RateProvider>,
    history: Box<dyn HistoryStore>,
}

impl Controller {
    /// Creates a controller with the first configured currency as source
    /// and the second (or the first again) as target.
    pub fn new(
        settings: Settings,
        provider: Box<dyn RateProvider>,
        history: Box<dyn HistoryStore>,
    ) -> Self {
        let mut settings = settings;
        if settings.currencies.is_empty() {
            settings.currencies = default_currencies();
        }
        let from = settings.currencies[0].clone();
        let to = settings.currencies.get(1).unwrap_or(&from).clone();

        Self {
            state: AppState {
                amount: String::new(),
                selection: Selection::new(from, to),
                rates: None,
                last_result: None,
            },
            settings,
            provider,
            history,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Parses `line` and runs the matching command from [`COMMANDS`].
    pub async fn dispatch(&mut self, line: &str) -> CommandResult {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Outcome::Idle);
        };
        let command = find_command(name).ok_or_else(|| CommandError::Unknown(name.to_string()))?;
        let args: Vec<String> = words.map(str::to_string).collect();
        debug!(command = command.name, ?args, "Dispatching");
        (command.handler)(self, &args).await
    }

    /// Loads rates for the source currency, as done when the app starts.
    ///
    /// A failure leaves the rates empty and returns the diagnostic to show.
    pub async fn preload_rates(&mut self) -> Option<String> {
        let base = self.state.selection.from.clone();
        let loaded = recover(self.provider.fetch(&base).await.map(Some), "exchange rates");
        self.state.rates = loaded.value;
        loaded.diagnostic
    }

    pub fn set_amount(&mut self, input: &str) {
        self.state.amount = input.to_string();
    }

    pub fn select_from(&mut self, code: CurrencyCode) -> Result<(), CommandError> {
        self.ensure_supported(&code)?;
        self.state.selection.from = code;
        self.state.last_result = None;
        Ok(())
    }

    pub fn select_to(&mut self, code: CurrencyCode) -> Result<(), CommandError> {
        self.ensure_supported(&code)?;
        self.state.selection.to = code;
        self.state.last_result = None;
        Ok(())
    }

    /// Swaps the currencies and clears the displayed result. Rates are
    /// not refetched until the next conversion needs them.
    pub fn swap(&mut self) {
        self.state.selection.swap();
        self.state.last_result = None;
    }

    fn ensure_supported(&self, code: &CurrencyCode) -> Result<(), CommandError> {
        if self.settings.currencies.contains(code) {
            Ok(())
        } else {
            Err(CommandError::Unsupported(code.clone()))
        }
    }

    /// Returns the current rates, fetching them when missing or fetched
    /// for a different base.
    pub async fn ensure_rates(&mut self) -> Result<&RateTable, FetchError> {
        let table = match self.state.rates.take() {
            Some(table) if table.base() == &self.state.selection.from => table,
            _ => self.fetch_for_source().await?,
        };
        Ok(&*self.state.rates.insert(table))
    }

    pub async fn refresh_rates(&mut self) -> Result<&RateTable, FetchError> {
        self.state.rates = None;
        let table = self.fetch_for_source().await?;
        Ok(&*self.state.rates.insert(table))
    }

    async fn fetch_for_source(&self) -> Result<RateTable, FetchError> {
        let base = &self.state.selection.from;
        let table = self.provider.fetch(base).await?;
        info!(%base, count = table.len(), "Rates updated");
        Ok(table)
    }

    /// Converts the current amount and appends it to the history.
    ///
    /// Nothing is logged when the amount is invalid, the rates cannot be
    /// fetched, the target rate is missing or the result overflows.
    pub async fn convert(&mut self) -> CommandResult {
        self.state.last_result = None;
        convert::parse_amount(&self.state.amount)?;

        let rates = self.ensure_rates().await?.clone();
        let Selection { from, to } = &self.state.selection;
        let conversion = convert::convert(&self.state.amount, from, to, &rates)?;

        let record = ConversionRecord::from_conversion(&conversion, now());
        let history_warning = self.history.append(record).err().map(|e| e.to_string());
        self.state.last_result = Some(conversion.clone());

        Ok(Outcome::Converted {
            conversion,
            history_warning,
        })
    }

    pub fn history(&self, query: &str) -> Vec<ConversionRecord> {
        self.history.search(query.trim())
    }

    /// Daily means, optionally restricted to one source and/or target.
    pub fn trend(&self, from: Option<&CurrencyCode>, to: Option<&CurrencyCode>) -> Vec<TrendPoint> {
        let records: Vec<ConversionRecord> = self
            .history
            .load_all()
            .into_iter()
            .filter(|r| from.is_none_or(|c| &r.from_currency == c))
            .filter(|r| to.is_none_or(|c| &r.to_currency == c))
            .collect();
        trend::aggregate(&records)
    }
}

fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::FetchFailure;
    use crate::store::MemoryHistory;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl RateProvider for MockProvider {
        async fn fetch(&self, base: &CurrencyCode) -> Result<RateTable, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FetchError::new(
                    base,
                    FetchFailure::Transport("connection refused".into()),
                ));
            }
            let raw = match base.as_str() {
                "USD" => vec![("USD", 1.0), ("EUR", 0.9), ("RUB", 90.0)],
                "EUR" => vec![("EUR", 1.0), ("USD", 1.1)],
                _ => vec![],
            };
            Ok(RateTable::from_raw(base.clone(), Utc::now(), raw))
        }
    }

    struct Fixture {
        controller: Controller,
        calls: Arc<AtomicUsize>,
        history: MemoryHistory,
    }

    fn fixture(fail: bool) -> Fixture {
        let calls = Arc::new(AtomicUsize::new(0));
        let history = MemoryHistory::new();
        let provider = MockProvider {
            calls: Arc::clone(&calls),
            fail,
        };
        let settings = Settings {
            currencies: crate::core::currency::default_currencies(),
            precision: 4,
        };
        let controller = Controller::new(settings, Box::new(provider), Box::new(history.clone()));
        Fixture {
            controller,
            calls,
            history,
        }
    }

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_initial_selection_uses_configured_currencies() {
        let f = fixture(false);
        assert_eq!(f.controller.state().selection.from, code("USD"));
        assert_eq!(f.controller.state().selection.to, code("EUR"));
        assert!(f.controller.state().rates.is_none());
    }

    #[tokio::test]
    async fn test_convert_logs_record() {
        let mut f = fixture(false);
        let outcome = f.controller.dispatch("convert 100").await.unwrap();

        let Outcome::Converted {
            conversion,
            history_warning,
        } = outcome
        else {
            panic!("expected a conversion");
        };
        assert!((conversion.result - 90.0).abs() < 1e-9);
        assert!(history_warning.is_none());

        let records = f.history.load_all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].from_currency, code("USD"));
        assert_eq!(records[0].to_currency, code("EUR"));
        assert_eq!(records[0].amount, 100.0);
        assert_eq!(f.controller.state().last_result, Some(conversion));
    }

    #[tokio::test]
    async fn test_rates_are_reused_for_same_base() {
        let mut f = fixture(false);
        f.controller.dispatch("convert 1").await.unwrap();
        f.controller.dispatch("convert 2").await.unwrap();
        assert_eq!(f.calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.history.load_all().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_amount_is_not_logged() {
        let mut f = fixture(false);
        for input in ["-5", "abc"] {
            let err = f
                .controller
                .dispatch(&format!("convert {input}"))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                CommandError::Conversion(ConversionError::Input(_))
            ));
        }
        assert!(f.history.load_all().is_empty());
        assert_eq!(f.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_target_rate_is_not_logged() {
        let mut f = fixture(false);
        f.controller.dispatch("to GBP").await.unwrap();
        let err = f.controller.dispatch("convert 10").await.unwrap_err();
        assert!(matches!(
            err,
            CommandError::Conversion(ConversionError::RateUnavailable(ref c)) if c.as_str() == "GBP"
        ));
        assert!(f.history.load_all().is_empty());
        assert!(f.controller.state().last_result.is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_result_is_not_logged() {
        let mut f = fixture(false);
        f.controller.dispatch("convert 1").await.unwrap();

        f.controller.dispatch("to RUB").await.unwrap();
        let err = f.controller.dispatch("convert 1e308").await.unwrap_err();
        assert!(matches!(
            err,
            CommandError::Conversion(ConversionError::OutOfRange { .. })
        ));
        assert_eq!(f.history.load_all().len(), 1);
        assert!(f.controller.state().last_result.is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_not_logged() {
        let mut f = fixture(true);
        let err = f.controller.dispatch("convert 10").await.unwrap_err();
        assert!(matches!(err, CommandError::Fetch(_)));
        assert!(f.history.load_all().is_empty());
        assert!(f.controller.state().rates.is_none());
    }

    #[tokio::test]
    async fn test_preload_failure_returns_diagnostic() {
        let mut f = fixture(true);
        let diagnostic = f.controller.preload_rates().await.unwrap();
        assert!(diagnostic.starts_with("exchange rates: "));
        assert!(f.controller.state().rates.is_none());

        let mut ok = fixture(false);
        assert!(ok.controller.preload_rates().await.is_none());
        assert!(ok.controller.state().rates.is_some());
    }

    #[tokio::test]
    async fn test_swap_clears_result_and_refetches_on_next_convert() {
        let mut f = fixture(false);
        f.controller.dispatch("convert 10").await.unwrap();
        assert!(f.controller.state().last_result.is_some());

        f.controller.dispatch("swap").await.unwrap();
        assert!(f.controller.state().last_result.is_none());
        assert_eq!(f.calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.controller.state().selection.from, code("EUR"));

        let Outcome::Converted { conversion, .. } = f.controller.dispatch("convert").await.unwrap()
        else {
            panic!("expected a conversion");
        };
        assert_eq!(f.calls.load(Ordering::SeqCst), 2);
        assert_eq!(conversion.to, code("USD"));
        assert!((conversion.result - 11.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_selection_must_be_configured() {
        let mut f = fixture(false);
        let err = f.controller.dispatch("from CHF").await.unwrap_err();
        assert!(matches!(err, CommandError::Unsupported(_)));
        let err = f.controller.dispatch("to dollars").await.unwrap_err();
        assert!(matches!(err, CommandError::Currency(_)));
        assert_eq!(f.controller.state().selection.from, code("USD"));
    }

    #[tokio::test]
    async fn test_history_search_and_trend() {
        let mut f = fixture(false);
        f.controller.dispatch("convert 10").await.unwrap();
        f.controller.dispatch("to RUB").await.unwrap();
        f.controller.dispatch("convert 1").await.unwrap();

        let Outcome::History(records) = f.controller.dispatch("history rub").await.unwrap() else {
            panic!("expected history");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].to_currency, code("RUB"));

        let Outcome::Trend(points) = f.controller.dispatch("trend").await.unwrap() else {
            panic!("expected trend");
        };
        assert_eq!(points.len(), 1);
        assert!((points[0].mean - 49.5).abs() < 1e-9);

        let Outcome::Trend(points) = f.controller.dispatch("trend usd eur").await.unwrap() else {
            panic!("expected trend");
        };
        assert!((points[0].mean - 9.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_dispatch_table() {
        let mut f = fixture(false);
        assert!(matches!(f.controller.dispatch("   ").await, Ok(Outcome::Idle)));
        assert!(matches!(f.controller.dispatch("Q").await, Ok(Outcome::Quit)));
        assert!(matches!(
            f.controller.dispatch("fly").await,
            Err(CommandError::Unknown(_))
        ));
        assert!(matches!(
            f.controller.dispatch("amount").await,
            Err(CommandError::Usage(_))
        ));
        f.controller.dispatch("a 12,5").await.unwrap();
        assert_eq!(f.controller.state().amount, "12,5");

        for command in COMMANDS {
            assert!(find_command(command.name).is_some());
            assert!(command.usage.starts_with(command.name));
        }
    }
}
