mod shell;

use std::{env, process::ExitCode};

use log::LevelFilter;
use rustyline::{Editor, error::ReadlineError};
use rusty_scripting::{
    gameplay::{self, GameState},
    log::ChannelLogger,
    reflect::Context,
};

use shell::Shell;

fn main() -> ExitCode {
    let (logger, logs) = ChannelLogger::with_receiver();
    if let Err(error) = logger.with_level(LevelFilter::Info).install() {
        eprintln!("logging unavailable: {error}");
    }

    let mut shell = match start() {
        Ok(state) => Shell::new(state, logs),
        Err(error) => {
            eprintln!("failed to start: {error}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = env::args().nth(1) {
        let output = shell.execute(&format!("load {path}"));
        report(&shell, output);
    }

    let mut editor = Editor::<()>::new();
    while shell.is_running() {
        match editor.readline("rusty> ") {
            Ok(line) => {
                editor.add_history_entry(line.as_str());
                let output = shell.execute(&line);
                report(&shell, output);
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(error) => {
                eprintln!("input error: {error}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

fn start() -> rusty_scripting::Result<GameState> {
    let mut builder = Context::builder();
    gameplay::register(&mut builder)?;
    GameState::new(builder.build())
}

/// Print a command's output followed by whatever it logged.
fn report(shell: &Shell, output: String) {
    if !output.is_empty() {
        println!("{output}");
    }
    for line in shell.drain_logs() {
        println!("{line}");
    }
}
