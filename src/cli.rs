use clap::Parser;
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "cgfetch")]
#[command(version)]
#[command(about = "Download the lp32 archive and extract its CG images into ./cg", long_about = None)]
pub struct Cli {
    /// Quiet mode, only errors are printed
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Diagnostic output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
