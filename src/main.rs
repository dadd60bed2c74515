use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use cellview::app::{App, AppConfig};
use cellview::demos::{Counter, Greeter};
use cellview::logging::{self, LOG_ENV};
use cellview::view::View;

/// Slot-indexed state cells driving terminal demo views.
#[derive(Parser)]
#[command(name = "cellview", version)]
struct Cli {
    #[command(subcommand)]
    demo: Demo,

    /// Write logs to this file. Nothing is logged otherwise.
    #[arg(long, global = true, env = LOG_ENV)]
    log: Option<PathBuf>,

    /// Input poll interval in milliseconds.
    #[arg(long, global = true, default_value_t = 250)]
    tick_ms: u64,
}

#[derive(Subcommand)]
enum Demo {
    /// A counter with increment, decrement and reset buttons.
    Counter {
        /// Starting value, also the reset target.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        initial: i64,

        /// Amount added or subtracted per click.
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        step: i64,
    },

    /// A text input that greets whatever name is typed.
    Greeter {
        /// Word placed before the name.
        #[arg(long, default_value = "Hello")]
        greeting: String,

        /// Name entered at startup.
        #[arg(long, default_value = "")]
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.log.as_deref());

    let config = AppConfig::new().with_tick_rate(Duration::from_millis(cli.tick_ms));
    match cli.demo {
        Demo::Counter { initial, step } => {
            run(Counter::new(initial, step), config.with_title("Counter"))
        }
        Demo::Greeter { greeting, name } => run(
            Greeter::new(greeting).with_name(name),
            config.with_title("Greeter"),
        ),
    }
}

fn run(view: impl View + 'static, config: AppConfig) -> anyhow::Result<()> {
    let mut app = App::new(view, config).context("failed to start the app")?;
    app.run().context("app exited with an error")?;
    Ok(())
}
