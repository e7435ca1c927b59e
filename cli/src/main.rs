use log::LevelFilter;
use rustyline::{Editor, error::ReadlineError};

use rusty_emitter_cli::{
    logger::ChannelLogger,
    shell::{Command, Outcome, Shell},
};

fn main() {
    let (logger, log_recv) = ChannelLogger::with_receiver(LevelFilter::Debug);
    if let Err(err) = logger.install() {
        eprintln!("logging disabled: {err}");
    }

    let mut shell = Shell::new().with_log(log_recv);
    let mut editor = Editor::<()>::new();
    println!("rusty-emitter shell, type `help` for commands");

    loop {
        let line = match editor.readline("emitter> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("error: {err}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        editor.add_history_entry(line);

        let result = line
            .parse::<Command>()
            .and_then(|command| shell.execute(command));

        for record in shell.drain_log() {
            println!("{record}");
        }

        match result {
            Ok(Outcome::Continue(lines)) => {
                for line in lines {
                    println!("{line}");
                }
            }
            Ok(Outcome::Exit) => break,
            Err(err) => eprintln!("error: {err}"),
        }
    }
}
