use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crossterm::style::Stylize;

/// A parsed answer to a numeric question.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply<T> {
    Value(T),
    Invalid(String),
    /// Input is exhausted.
    Closed,
}

/// Line oriented questions over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// `None` once the input is closed.
    pub fn ask_line(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}", question.bold().cyan())?;
        self.out.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }

    pub fn ask_number<T: FromStr>(&mut self, question: &str) -> io::Result<Reply<T>> {
        Ok(match self.ask_line(question)? {
            None => Reply::Closed,
            Some(line) => match line.trim().parse() {
                Ok(v) => Reply::Value(v),
                Err(_) => Reply::Invalid(line),
            },
        })
    }
}
