//! CLI interface for sonify

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hear your charts: play a dataset as sound with narration
#[derive(Parser)]
#[command(name = "sonify")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play a dataset in an interactive terminal chart
    Play {
        /// JSON file holding an array of values or objects
        data: PathBuf,

        /// Configuration file path (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Field to map to pitch, overriding the configuration
        #[arg(short, long)]
        field: Option<String>,

        /// Playback mode: discrete or continuous
        #[arg(short, long)]
        mode: Option<String>,

        /// Speed multiplier (0.25 to 4)
        #[arg(short, long, default_value = "1.0")]
        speed: f64,

        /// Play once with console narration instead of the chart
        #[arg(long)]
        headless: bool,
    },

    /// Render a dataset to a WAV file
    Render {
        /// JSON file holding an array of values or objects
        data: PathBuf,

        /// Configuration file path (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Field to map to pitch, overriding the configuration
        #[arg(short, long)]
        field: Option<String>,

        /// Playback mode: discrete or continuous
        #[arg(short, long)]
        mode: Option<String>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the dataset summary and every point's narration
    Describe {
        /// JSON file holding an array of values or objects
        data: PathBuf,

        /// Configuration file path (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Field to narrate, overriding the configuration
        #[arg(short, long)]
        field: Option<String>,
    },

    /// List available audio output devices
    Devices,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "sonify.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_play() {
        let cli = Cli::try_parse_from([
            "sonify", "play", "sales.json", "--mode", "continuous", "--speed", "2", "--headless",
        ])
        .unwrap();

        match cli.command {
            Commands::Play {
                data,
                config,
                mode,
                speed,
                headless,
                ..
            } => {
                assert_eq!(data, PathBuf::from("sales.json"));
                assert!(config.is_none());
                assert_eq!(mode.as_deref(), Some("continuous"));
                assert_eq!(speed, 2.0);
                assert!(headless);
            }
            _ => panic!("expected play"),
        }
    }

    #[test]
    fn test_render_requires_output() {
        assert!(Cli::try_parse_from(["sonify", "render", "data.json"]).is_err());
        assert!(Cli::try_parse_from(["sonify", "render", "data.json", "-o", "out.wav"]).is_ok());
    }

    #[test]
    fn test_check_default_path() {
        let cli = Cli::try_parse_from(["sonify", "check"]).unwrap();
        match cli.command {
            Commands::Check { config } => assert_eq!(config, PathBuf::from("sonify.yaml")),
            _ => panic!("expected check"),
        }
    }
}
