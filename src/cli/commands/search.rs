//! One-shot search command.

use console::style;

use jobharvest::config::Settings;
use jobharvest::harvester::Harvester;
use jobharvest::models::SearchRequest;

/// Run a single search and print the records as JSON on stdout.
pub async fn cmd_search(
    settings: &Settings,
    request: SearchRequest,
    compact: bool,
) -> anyhow::Result<()> {
    let spec = request.or(&settings.defaults).to_spec();
    let harvester = Harvester::from_settings(settings)?;

    eprintln!(
        "{} Searching \"{}\" in \"{}\"",
        style("→").cyan(),
        spec.keyword(),
        spec.location()
    );

    let records = harvester.search(&spec).await?;

    eprintln!("  {} {} job(s)", style("✓").green(), records.len());

    let json = if compact {
        serde_json::to_string(&records)?
    } else {
        serde_json::to_string_pretty(&records)?
    };
    println!("{}", json);

    Ok(())
}
