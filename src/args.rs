use clap::Parser;

/// This is a terminal voting booth for a two-candidate election.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the election description: the contest
    /// title lines, the countdown and the two candidates, in JSON format. If not
    /// provided, the booth runs the built-in election.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
