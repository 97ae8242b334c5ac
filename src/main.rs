use clap::Parser;
use dirs::home_dir;
use log::{debug, info};
use morklerork::{
    cli::{Args, Commands},
    error::Result,
    input::Terminal,
    loader::load,
    parser::parse,
    repl::{REPLPrompt, REPLValidator, SyntaxHighlighter},
    runtime::Interpreter,
    tokenizer::tokenize,
};
use nu_ansi_term::{Color, Style};
use reedline::{DefaultHinter, FileBackedHistory, Reedline, Signal};
use std::{io, path::PathBuf, process};

fn run_files(files: &[PathBuf]) -> Result<()> {
    let source = load(files)?;

    let lines = tokenize(&source)?;
    let commands = parse(&lines)?;

    let mut interpreter = Interpreter::new(io::stdout(), Terminal);
    interpreter.run(&commands)
}

fn check_files(files: &[PathBuf]) -> Result<()> {
    let source = load(files)?;

    let lines = tokenize(&source)?;
    let commands = parse(&lines)?;
    println!("{:#?}", commands);

    Ok(())
}

fn run_repl() -> Result<()> {
    let mut line_editor = Reedline::create()
        .with_hinter(Box::new(
            DefaultHinter::default().with_style(Style::new().italic().fg(Color::LightGray)),
        ))
        .with_highlighter(Box::new(SyntaxHighlighter))
        .with_validator(Box::new(REPLValidator));

    // Add file-backed history if possible
    if let Some(history) = home_dir()
        .map(|home| home.join(".morklerork_history"))
        .and_then(|path| FileBackedHistory::with_file(100, path).ok())
        .map(Box::new)
    {
        line_editor = line_editor.with_history(history);
    } else {
        eprintln!("NOTE: Failed to load history. Persistence is now disabled.")
    }

    let mut prompt = REPLPrompt { entry: 1 };
    let mut interpreter = Interpreter::new(io::stdout(), Terminal);

    loop {
        match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => {
                prompt.entry += 1;
                interpreter
                    .run_source(&buffer)
                    .inspect_err(|err| {
                        eprintln!("{}", err);
                    })
                    .ok();
                println!();
            }
            Signal::CtrlD | Signal::CtrlC => {
                break Ok(());
            }
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let result = match args.command {
        Commands::Run { files } => {
            info!("FILE MODE");
            debug!("files: {:?}", files);

            run_files(&files)
        }
        Commands::Check { files } => {
            info!("CHECK MODE");
            debug!("files: {:?}", files);

            check_files(&files)
        }
        Commands::Repl => {
            info!("REPL MODE");

            run_repl()
        }
    };

    if let Err(err) = result {
        eprintln!("{}", err);
        process::exit(1);
    }
}
