//! Line commands read from stdin by the headless runner.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Stop,
    Next,
    Previous,
    Seek(Duration),
    Volume(f32),
    /// Zero-based playlist index.
    Select(usize),
    /// Zero-based playlist index.
    Remove(usize),
    Clear,
    List,
    Quit,
}

pub const HELP: &str = "commands: play, pause, stop, next, prev, seek <secs>, vol <0..1>, \
                        select <n>, remove <n>, clear, list, quit";

/// Parse one input line. Blank lines give `Ok(None)`.
///
/// Playlist numbers are 1-based on input.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    if words.next().is_some() {
        return Err(format!("too many arguments for `{word}`"));
    }

    let cmd = match (word.to_ascii_lowercase().as_str(), arg) {
        ("play", None) => Command::Play,
        ("pause", None) => Command::Pause,
        ("stop", None) => Command::Stop,
        ("next", None) => Command::Next,
        ("prev" | "previous", None) => Command::Previous,
        ("clear", None) => Command::Clear,
        ("list" | "ls", None) => Command::List,
        ("quit" | "exit", None) => Command::Quit,
        ("seek", Some(arg)) => Command::Seek(parse_seconds(arg)?),
        ("vol" | "volume", Some(arg)) => Command::Volume(parse_volume(arg)?),
        ("select", Some(arg)) => Command::Select(parse_number(arg)?),
        ("remove" | "rm", Some(arg)) => Command::Remove(parse_number(arg)?),
        ("seek" | "vol" | "volume" | "select" | "remove" | "rm", None) => {
            return Err(format!("`{word}` needs an argument"));
        }
        (_, _) => return Err(format!("unknown command `{line}`. {HELP}", line = line.trim())),
    };
    Ok(Some(cmd))
}

fn parse_seconds(arg: &str) -> Result<Duration, String> {
    let secs: f64 = arg
        .parse()
        .map_err(|_| format!("not a number of seconds: {arg}"))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("invalid position: {arg}"))
}

fn parse_volume(arg: &str) -> Result<f32, String> {
    let v: f32 = arg.parse().map_err(|_| format!("not a volume: {arg}"))?;
    if v.is_nan() {
        return Err(format!("not a volume: {arg}"));
    }
    Ok(v)
}

fn parse_number(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("expected a track number starting at 1, got {arg}")),
    }
}
