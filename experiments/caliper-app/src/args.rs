use caliper_base::{LogConfig, LogTarget};
use caliper_camera::CameraConfig;
use caliper_com::{ClientConfig, ProcessingParams};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const USAGE: &str = "\
Usage: caliper upload <file> [options]
       caliper camera [options]

Options:
  --server <url>        backend base URL (default http://127.0.0.1:8000)
  --threshold <n>       edge threshold (default 100)
  --blur <n>            blur kernel size (default 3)
  --pixel-ratio <f>     millimetres per pixel (default 0.2645833)
  --device <path>       camera device (default /dev/video0)
  --timeout <secs>      give up on a request after this long
  --out <dir>           write the processed image to <dir>/processed.png
  --log-dir <dir>       write daily log files to <dir> instead of stdout
  -h, --help            show this help";

const OPTIONS: [&str; 8] = [
    "--server",
    "--threshold",
    "--blur",
    "--pixel-ratio",
    "--device",
    "--timeout",
    "--out",
    "--log-dir",
];

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Upload a file from disk.
    Upload(PathBuf),
    /// Capture one frame from the camera.
    Camera,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Args {
    pub command: Command,
    pub server: Option<String>,
    pub params: ProcessingParams,
    pub device: Option<String>,
    pub timeout: Option<Duration>,
    pub out: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, PartialEq)]
pub enum ArgsError {
    Help,
    MissingCommand,
    UnknownCommand(String),
    MissingFile,
    UnexpectedArgument(String),
    UnknownOption(String),
    MissingValue(String),
    InvalidValue { option: String, value: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::Help => write!(f, "help requested"),
            ArgsError::MissingCommand => write!(f, "missing command"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::MissingFile => write!(f, "upload needs a file"),
            ArgsError::UnexpectedArgument(arg) => write!(f, "unexpected argument: {arg}"),
            ArgsError::UnknownOption(opt) => write!(f, "unknown option: {opt}"),
            ArgsError::MissingValue(opt) => write!(f, "{opt} needs a value"),
            ArgsError::InvalidValue { option, value } => write!(f, "invalid value for {option}: {value}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl Args {
    /// Parse the arguments following the program name.
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, ArgsError> {
        let mut args = args.into_iter();

        let command = match args.next().as_deref() {
            Some("-h") | Some("--help") => return Err(ArgsError::Help),
            Some("upload") => None,
            Some("camera") => Some(Command::Camera),
            Some(other) => return Err(ArgsError::UnknownCommand(other.to_string())),
            None => return Err(ArgsError::MissingCommand),
        };

        let mut file = None;
        let mut parsed = Args {
            command: Command::Camera,
            server: None,
            params: ProcessingParams::default(),
            device: None,
            timeout: None,
            out: None,
            log_dir: None,
        };

        while let Some(arg) = args.next() {
            if arg == "-h" || arg == "--help" {
                return Err(ArgsError::Help);
            }
            if !arg.starts_with("--") {
                if command.is_none() && file.is_none() {
                    file = Some(PathBuf::from(arg));
                    continue;
                }
                return Err(ArgsError::UnexpectedArgument(arg));
            }

            if !OPTIONS.contains(&arg.as_str()) {
                return Err(ArgsError::UnknownOption(arg));
            }
            let value = args.next().ok_or_else(|| ArgsError::MissingValue(arg.clone()))?;
            match arg.as_str() {
                "--server" => parsed.server = Some(value),
                "--threshold" => parsed.params.threshold = parse_value(&arg, &value)?,
                "--blur" => parsed.params.blur_amount = parse_value(&arg, &value)?,
                "--pixel-ratio" => {
                    let ratio: f64 = parse_value(&arg, &value)?;
                    if !ratio.is_finite() || ratio <= 0.0 {
                        return Err(invalid(&arg, &value));
                    }
                    parsed.params.pixel_ratio = ratio;
                }
                "--device" => parsed.device = Some(value),
                "--timeout" => {
                    let secs: f64 = parse_value(&arg, &value)?;
                    parsed.timeout = Some(
                        Duration::try_from_secs_f64(secs)
                            .map_err(|_| invalid(&arg, &value))?,
                    );
                }
                "--out" => parsed.out = Some(PathBuf::from(value)),
                "--log-dir" => parsed.log_dir = Some(PathBuf::from(value)),
                _ => return Err(ArgsError::UnknownOption(arg.clone())),
            }
        }

        parsed.command = match command {
            Some(command) => command,
            None => Command::Upload(file.ok_or(ArgsError::MissingFile)?),
        };
        Ok(parsed)
    }

    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::default().with_timeout(self.timeout);
        match &self.server {
            Some(server) => config.with_base_url(server.as_str()),
            None => config,
        }
    }

    pub fn camera_config(&self) -> CameraConfig {
        let config = CameraConfig::default();
        match &self.device {
            Some(device) => config.with_device(device.as_str()),
            None => config,
        }
    }

    pub fn log_config(&self) -> LogConfig {
        match &self.log_dir {
            Some(dir) => LogConfig::default().with_target(LogTarget::Dir(dir.clone())),
            None => LogConfig::default(),
        }
    }
}

fn parse_value<T: std::str::FromStr>(option: &str, value: &str) -> Result<T, ArgsError> {
    value.parse().map_err(|_| invalid(option, value))
}

fn invalid(option: &str, value: &str) -> ArgsError {
    ArgsError::InvalidValue {
        option: option.to_string(),
        value: value.to_string(),
    }
}
