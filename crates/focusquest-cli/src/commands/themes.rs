use clap::Args;
use focusquest_core::{Config, ThemeCatalog, THEMES};

#[derive(Args)]
pub struct ThemesArgs {
    /// Include full palettes instead of lock state
    #[arg(long)]
    pub palettes: bool,
}

/// Print the catalog as a fresh install sees it.
pub fn run(args: ThemesArgs) -> Result<(), Box<dyn std::error::Error>> {
    let json = if args.palettes {
        serde_json::to_string_pretty(&THEMES)?
    } else {
        let config = Config::load_or_default();
        let catalog = ThemeCatalog::with_default(config.themes.unlock_cost, &config.themes.default_theme);
        serde_json::to_string_pretty(&catalog.views())?
    };
    println!("{json}");
    Ok(())
}
