use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = docent_indexer::Args::parse();

	docent_indexer::run(args).await
}
