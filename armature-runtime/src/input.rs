use armature_core::nalgebra::Point2;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::runtime::SharedSimulation;

/// Operator command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Replace the target.
    Target(Point2<f32>),
    /// Replace the step factor.
    StepFactor(f32),
    /// Log the current frame.
    Status,
    /// Stop the runtime.
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseCommandError {
    /// The line holds no command.
    Empty,
    /// The command is not known.
    Unknown(String),
    /// The command expects more arguments.
    MissingArgument(&'static str),
    /// The command got more arguments than it accepts.
    TrailingArgument(String),
    /// An argument is not a number.
    InvalidNumber(String),
}

impl std::fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseCommandError::Empty => write!(f, "empty command"),
            ParseCommandError::Unknown(command) => write!(f, "unknown command '{}'", command),
            ParseCommandError::MissingArgument(name) => write!(f, "missing argument <{}>", name),
            ParseCommandError::TrailingArgument(arg) => {
                write!(f, "unexpected argument '{}'", arg)
            }
            ParseCommandError::InvalidNumber(value) => write!(f, "invalid number '{}'", value),
        }
    }
}

impl std::error::Error for ParseCommandError {}

fn parse_number(value: &str) -> Result<f32, ParseCommandError> {
    value
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParseCommandError::InvalidNumber(value.to_string()))
}

/// Parse a point written as `X,Y`.
pub fn parse_point(value: &str) -> Result<Point2<f32>, ParseCommandError> {
    let (x, y) = value
        .split_once(',')
        .ok_or(ParseCommandError::MissingArgument("y"))?;

    Ok(Point2::new(parse_number(x.trim())?, parse_number(y.trim())?))
}

impl std::str::FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut args = s.split_whitespace();

        let command = match args.next().ok_or(ParseCommandError::Empty)? {
            "target" | "t" => {
                let x = args.next().ok_or(ParseCommandError::MissingArgument("x"))?;

                let point = if x.contains(',') {
                    parse_point(x)?
                } else {
                    let y = args.next().ok_or(ParseCommandError::MissingArgument("y"))?;
                    Point2::new(parse_number(x)?, parse_number(y)?)
                };

                Command::Target(point)
            }
            "speed" | "s" => {
                let value = args
                    .next()
                    .ok_or(ParseCommandError::MissingArgument("step"))?;

                Command::StepFactor(parse_number(value)?)
            }
            "status" => Command::Status,
            "quit" | "q" | "exit" => Command::Quit,
            command => return Err(ParseCommandError::Unknown(command.to_string())),
        };

        match args.next() {
            Some(arg) => Err(ParseCommandError::TrailingArgument(arg.to_string())),
            None => Ok(command),
        }
    }
}

impl Command {
    /// Parse a line of input.
    ///
    /// Blank lines and lines starting with `#` hold no command.
    pub fn parse_line(line: &str) -> Result<Option<Self>, ParseCommandError> {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        line.parse().map(Some)
    }
}

/// Read commands line by line and apply them to the simulation.
///
/// Returns when the input is exhausted or a quit command is read. A quit
/// command also raises the shutdown signal.
pub async fn read_commands<R>(
    reader: R,
    simulation: SharedSimulation,
    shutdown: tokio::sync::broadcast::Sender<()>,
) where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("Command input closed");
                break;
            }
            Err(e) => {
                error!("Failed to read command: {}", e);
                break;
            }
        };

        if line.len() > crate::consts::COMMAND_LINE_MAX {
            warn!("Command line too long, discarded");
            continue;
        }

        let command = match Command::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                warn!("Invalid command '{}': {}", line.trim(), e);
                continue;
            }
        };

        trace!("Command: {:?}", command);

        match command {
            Command::Target(point) => {
                simulation.write().await.set_target(point);
                info!("Target set to ({:.2}, {:.2})", point.x, point.y);
            }
            Command::StepFactor(value) => {
                let step_factor = simulation.write().await.set_step_factor(value);
                info!("Step factor set to {:.2}", step_factor);
            }
            Command::Status => {
                let simulation = simulation.read().await;
                info!("{}", simulation.frame());
                info!("Step factor: {:.2}", simulation.step_factor());
            }
            Command::Quit => {
                info!("Quit requested");
                shutdown.send(()).ok();
                break;
            }
        }
    }
}
