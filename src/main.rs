mod app;
mod cli;

use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use structopt::StructOpt;
use structopt_flags::LogLevel;

use app::MazeApp;
use cli::Opt;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt: Opt = Opt::from_args();

    if let Some(shell) = opt.completions {
        Opt::clap().gen_completions_to("maze-gen", shell, &mut std::io::stdout());
        return Ok(());
    }

    TermLogger::init(
        opt.verbose.get_level_filter(),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let config = opt.to_app_config()?;

    MazeApp::new(config).run()
}
