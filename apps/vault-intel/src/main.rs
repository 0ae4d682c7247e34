use clap::Parser;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = vault_intel::Args::parse();

	vault_intel::run(args)
}
