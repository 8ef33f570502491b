use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "midi2qwerty")]
#[command(about = "Translates MIDI notes to keyboard keypresses")]
pub struct Cli {
    #[arg(long, value_name = "N", help = "Use MIDI input port N instead of prompting")]
    pub port: Option<usize>,

    #[arg(long, help = "List MIDI input ports and exit")]
    pub list: bool,

    #[arg(long, help = "Print the note to key table and exit")]
    pub mappings: bool,

    #[arg(long, value_name = "PATH", help = "Configuration file to layer over the defaults")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Start listening immediately instead of waiting for window focus")]
    pub no_delay: bool,

    #[arg(short, long, help = "Enable debug logging")]
    pub verbose: bool,
}
