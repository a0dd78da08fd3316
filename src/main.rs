//! docopts - docopt argument parsing for shell scripts.

use docopts::{run, Streams, STORE_VAR};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let store = std::env::var(STORE_VAR).ok();

    let stdout = io::stdout();
    let stderr = io::stderr();
    let stdin = io::stdin();
    let mut out = stdout.lock();
    let mut err = stderr.lock();
    let mut input = stdin.lock();

    let result = {
        let mut streams = Streams {
            stdout: &mut out,
            stderr: &mut err,
            stdin: &mut input,
        };
        run(&args, store.as_deref(), &mut streams, |invocation| {
            init_tracing(invocation.cli.debug)
        })
    };
    let _ = out.flush();

    match result {
        Ok(exit) => ExitCode::from(exit.code()),
        Err(e) => {
            let _ = writeln!(err, "docopts: error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the level chosen by `--debug`.
fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { "docopts=debug" } else { "docopts=warn" })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .compact()
        .try_init();
}
