use std::io::{self, BufRead, Write};
use std::sync::Arc;

use ftree_driver::{parse_line, DriverCommand, Session};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let session = Arc::new(Session::new());

    let shutdown_session = Arc::clone(&session);
    ctrlc::set_handler(move || {
        print_summary(&shutdown_session);
        std::process::exit(0);
    })?;

    log::info!("ftree-driver ready, reading commands from stdin");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        match parse_line(&line) {
            Ok(DriverCommand::Quit) => break,
            Ok(command) => {
                let output = session.execute(command);
                writeln!(stdout, "{output}")?;
                stdout.flush()?;
            }
            Err(err) => {
                writeln!(stdout, "error: {err}")?;
                stdout.flush()?;
            }
        }
    }

    print_summary(&session);
    Ok(())
}

fn print_summary(session: &Session) {
    let summary = session.summary();
    log::info!(
        "shutting down: {} operation(s) run, {} failed",
        summary.ops_run,
        summary.ops_failed
    );
    eprintln!(
        "ftree-driver summary: {} operation(s) run, {} failed",
        summary.ops_run, summary.ops_failed
    );
}
