use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = chartcode_api::Args::parse();

	chartcode_api::run(args).await
}
