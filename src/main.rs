use anyhow::Result;
use chaos::options::has_stdin;
use chaos::{utils, Args, HttpClient, Options, Runner};
use clap::Parser;
use tracing::error;

fn run(args: Args) -> Result<()> {
    let options = Options::from_args(args, has_stdin())?;
    let client = HttpClient::new(&options.api_url, &options.api_key)?;
    Runner::new(client, options).run()
}

fn main() {
    let args = Args::parse();
    utils::setup_logging(args.verbose, args.silent);

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
