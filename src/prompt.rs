use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};

/// Line-oriented operator I/O.
pub trait Prompt {
    /// Writes one full line.
    fn say(&mut self, line: &str) -> io::Result<()>;

    /// Writes `question` without a newline and reads one line of reply,
    /// returned without its line terminator.
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

pub struct LinePrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    #[cfg(test)]
    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl LinePrompt<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }

    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.writer, "{question}")?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }

        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(line)
    }
}
