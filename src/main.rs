use paintkit::cli::{feature_listing, run, CliArgs, USAGE};
use paintkit::{init_logging_with, BUILD_DATE, VERSION};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = match CliArgs::parse(&args) {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("paintkit {} ({})", VERSION, BUILD_DATE);
            println!("{}", USAGE);
            return Ok(());
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!();
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    let config = args.load_config()?;
    init_logging_with(&config.logging)?;

    let (doc, summary) = run(&args, &config)?;

    if args.summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let listing = feature_listing(&doc);
        if !listing.is_empty() {
            println!("{}", listing);
        }
        println!(
            "{} features, {} applied, {} rejected, {} undone",
            summary.features, summary.applied, summary.rejected, summary.undone
        );
    }

    Ok(())
}
