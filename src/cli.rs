use maze_gen::{GenerationConfig, MazeError, Policy, Size};
use std::path::PathBuf;
use std::time::Duration;
use structopt::clap::Shell;
use structopt::StructOpt;
use structopt_flags::QuietVerbose;

#[derive(Debug)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    #[cfg(feature = "image")]
    pub output_path: Option<PathBuf>,
    #[cfg(feature = "image")]
    pub cell_size: u32,
    #[cfg(feature = "json")]
    pub json_path: Option<PathBuf>,
    pub ascii: bool,
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "Maze Generator",
    about = "Generate perfect mazes with a randomized depth-first backtracker"
)]
pub struct Opt {
    #[structopt(flatten)]
    pub verbose: QuietVerbose,

    #[cfg(feature = "image")]
    #[structopt(parse(from_os_str), help = "Output image")]
    output: Option<PathBuf>,

    #[structopt(
        parse(try_from_str),
        short,
        long,
        default_value = "20x20",
        help = "Maze size in cells"
    )]
    output_size: Size,

    #[structopt(
        short,
        long,
        default_value = "0",
        help = "Seconds to wait between placements"
    )]
    delay: f64,

    #[structopt(
        parse(try_from_str),
        short,
        long,
        possible_values = &["immediate", "throttled", "budgeted"],
        case_insensitive = true,
        help = "Placement policy, picked from the delay when omitted"
    )]
    policy: Option<Policy>,

    #[structopt(long, help = "Generate on the main thread before placing anything")]
    inline: bool,

    #[structopt(parse(try_from_str), short, long, help = "Random seed")]
    seed: Option<u64>,

    #[cfg(feature = "image")]
    #[structopt(long, default_value = "16", help = "Cell size in pixels of the output image")]
    cell_size: u32,

    #[cfg(feature = "json")]
    #[structopt(long, parse(from_os_str), help = "Write the placement log as JSON")]
    json: Option<PathBuf>,

    #[structopt(long, help = "Print the finished maze to stdout")]
    ascii: bool,

    #[structopt(long, possible_values= &Shell::variants(), case_insensitive = true, help = "Generate shell completions and exit")]
    pub completions: Option<Shell>,
}

impl Opt {
    pub fn to_app_config(self) -> Result<AppConfig, MazeError> {
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(MazeError::InvalidDelay(self.delay));
        }

        let delay = Duration::from_secs_f64(self.delay);
        let mut generation = GenerationConfig::new(self.output_size)
            .with_delay(delay)
            .with_policy(self.policy.unwrap_or_else(|| Policy::from_delay(delay)))
            .with_deferred(!self.inline);

        if let Some(seed) = self.seed {
            generation = generation.with_seed(seed);
        }

        generation.validate()?;

        Ok(AppConfig {
            generation,
            #[cfg(feature = "image")]
            output_path: self.output,
            #[cfg(feature = "image")]
            cell_size: self.cell_size,
            #[cfg(feature = "json")]
            json_path: self.json,
            ascii: self.ascii,
        })
    }
}
