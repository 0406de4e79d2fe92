use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use canmux::{BusError, CanBus, Listener, Responder, TraceLog};

/// CAN responder: bounces selected frames back onto the bus and
/// executes send commands arriving over a named pipe.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// CAN interface to attach to
    #[arg(long, default_value = "vcan0")]
    interface: String,

    /// Named pipe the command source reads from
    #[arg(long, default_value = "/tmp/can_commands")]
    pipe: PathBuf,

    /// Append a candump-style trace of observed frames to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Seconds to let the link settle before the startup probe
    #[arg(long, default_value_t = 3.0)]
    settle: f64,
}

#[tokio::main]
async fn main() -> Result<(), BusError> {
    env_logger::init();
    let args = Args::parse();

    let bus = Arc::new(CanBus::open(&args.interface)?);
    let mut builder = Responder::builder(bus)
        .pipe_path(args.pipe)
        .settle(Duration::from_secs_f64(args.settle))
        .with_listener(Listener::callback(|frame| log::info!("observed {frame}")));
    if let Some(path) = args.trace.as_deref() {
        builder = builder.with_listener(Listener::trace(TraceLog::create(path, &args.interface)?));
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("interrupt received, shutting down");
            interrupt.cancel();
        }
    });

    builder.build().run(cancel).await;
    Ok(())
}
