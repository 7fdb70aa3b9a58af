use clap::Parser;
use serial_line_monitor::config::{Config, ConfigLoader, ConfigResult};
use serial_line_monitor::monitor::{InterruptFlag, InvalidBytes, LineMonitor};
use serial_line_monitor::{logging, port};
use std::io;
use std::path::PathBuf;
use tokio::signal;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Print every line a serial device sends until Ctrl+C.",
    long_about = "Opens a serial port, waits briefly for the device to settle, then prints each received line to stdout. Settings come from built-in defaults, an optional TOML file, SERIAL_MONITOR_* environment variables and these flags, in increasing priority."
)]
struct Args {
    /// Serial port to open (e.g. /dev/ttyUSB0, COM3).
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate.
    #[arg(short, long)]
    baud: Option<u32>,

    /// Milliseconds to wait after opening before the first read.
    #[arg(long, value_name = "MS")]
    settle_ms: Option<u64>,

    /// Drop invalid UTF-8 instead of printing replacement characters.
    #[arg(long)]
    drop_invalid: bool,

    /// Configuration file to use instead of the default search path.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List available serial ports and exit.
    #[arg(long)]
    list_ports: bool,

    /// Enable debug logging on stderr.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn load_config(&self) -> ConfigResult<Config> {
        let loader = match self.config {
            Some(ref path) => ConfigLoader::load_from(path)?,
            None => ConfigLoader::load()?,
        };
        let mut config = loader.into_config();

        if let Some(ref port) = self.port {
            config.serial.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.serial.baud = baud;
        }
        if let Some(ms) = self.settle_ms {
            config.serial.settle_delay_ms = ms;
        }
        if self.drop_invalid {
            config.serial.invalid_bytes = InvalidBytes::Drop;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };

    logging::init(&config.logging, args.verbose);

    if args.list_ports {
        list_ports();
        return;
    }

    let interrupt = InterruptFlag::new();
    let on_signal = interrupt.clone();
    tokio::spawn(async move {
        match interrupt_signal().await {
            Ok(()) => on_signal.trigger(),
            Err(e) => tracing::warn!(error = %e, "failed to install interrupt handler"),
        }
    });

    let mut monitor =
        LineMonitor::new(config.monitor_config(), io::stdout()).with_interrupt(interrupt);

    // Reads block for up to the read timeout, keep them off the runtime.
    match tokio::task::spawn_blocking(move || monitor.run()).await {
        Ok(reason) => tracing::debug!(%reason, "monitor finished"),
        Err(e) => tracing::error!(error = %e, "monitor task failed"),
    }
}

fn list_ports() {
    match port::list_ports() {
        Ok(ports) if ports.is_empty() => println!("No serial ports found"),
        Ok(ports) => {
            for listing in ports {
                println!("{listing}");
            }
        }
        Err(e) => println!("Error: {e}"),
    }
}

// --- Interrupt Handler ---
async fn interrupt_signal() -> io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => result?,
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c().await?;

    Ok(())
}
