//! Interactive page: read a line, submit it once, render the outcome.

use std::io::{self, BufRead, Write};

use senti_core::Config;
use tracing::{debug, info};

use crate::client::Predictor;
use crate::report::{render_error, render_report, Report};

pub const EXAMPLES: [&str; 5] = [
    "Bugün hava çok güzel, kendimi harika hissediyorum!",
    "Bu film çok kötüydü, zaman kaybı.",
    "Yemekler lezzetliydi ama servis biraz yavaştı.",
    "Harika bir gün! Her şey mükemmel.",
    "Çok sinirliyim ve hayal kırıklığına uğradım.",
];

const HELP: &str = "Type a text and press Enter to analyze it.\n\
    Commands: :1-:5 analyze an example, :examples list examples, :clear clear the screen, :quit exit";

/// Sidebar contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub model: String,
    pub max_length: usize,
    pub environment: String,
}

impl From<&Config> for PageInfo {
    fn from(config: &Config) -> Self {
        Self {
            model: config.model_name.clone(),
            max_length: config.max_length,
            environment: config.environment.clone(),
        }
    }
}

enum Action<'a> {
    Analyze(&'a str),
    Examples,
    Clear,
    Help,
    Quit,
    Empty,
    Unknown(&'a str),
}

fn parse_line(line: &str) -> Action<'_> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Action::Empty;
    }
    let Some(cmd) = line.trim().strip_prefix(':') else {
        return Action::Analyze(line);
    };
    match cmd {
        "q" | "quit" => Action::Quit,
        "examples" => Action::Examples,
        "clear" => Action::Clear,
        "help" => Action::Help,
        n => match n.parse::<usize>() {
            Ok(i) if (1..=EXAMPLES.len()).contains(&i) => Action::Analyze(EXAMPLES[i - 1]),
            _ => Action::Unknown(cmd),
        },
    }
}

pub struct Page<P> {
    predictor: P,
    info: PageInfo,
}

impl<P: Predictor> Page<P> {
    pub fn new(predictor: P, info: PageInfo) -> Self {
        Self { predictor, info }
    }

    /// Run until `:quit` or end of input. Each submitted line triggers
    /// exactly one prediction call.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input or writing output fails.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut out: W) -> io::Result<()> {
        self.write_header(&mut out)?;

        let mut line = String::new();
        loop {
            write!(out, "> ")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                debug!("end of input");
                break;
            }

            match parse_line(&line) {
                Action::Quit => break,
                Action::Empty => writeln!(out, "Please enter a text.")?,
                Action::Examples => write_examples(&mut out)?,
                Action::Help => writeln!(out, "{HELP}")?,
                Action::Clear => {
                    write!(out, "\x1b[2J\x1b[H")?;
                    self.write_header(&mut out)?;
                }
                Action::Unknown(cmd) => writeln!(out, "Unknown command :{cmd} (try :help)")?,
                Action::Analyze(text) => self.analyze(text, &mut out)?,
            }
        }
        Ok(())
    }

    fn analyze<W: Write>(&self, text: &str, out: &mut W) -> io::Result<()> {
        writeln!(out, "Analyzing...")?;
        match self.predictor.predict(text) {
            Ok(resp) => {
                info!(positive = resp.positive, "prediction received");
                write!(out, "{}", render_report(&Report::from_response(&resp)))
            }
            Err(e) => {
                info!(error = %e, "prediction failed");
                writeln!(out, "{}", render_error(&e))
            }
        }
    }

    fn write_header<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "AI Sentiment Analysis")?;
        writeln!(out, "Analyze the sentiment of a text")?;
        writeln!(out)?;
        writeln!(out, "Model:       {}", self.info.model)?;
        writeln!(out, "Max length:  {}", self.info.max_length)?;
        writeln!(out, "Environment: {}", self.info.environment)?;
        writeln!(out)?;
        write_examples(out)?;
        writeln!(out, "{HELP}")
    }
}

fn write_examples<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Examples:")?;
    for (i, example) in EXAMPLES.iter().enumerate() {
        writeln!(out, "  :{} {example}", i + 1)?;
    }
    Ok(())
}
