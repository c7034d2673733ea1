use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = ctx::cli::Cli::parse();
    ctx::init_logging(cli.verbose);
    ctx::cli::run(cli)
}
