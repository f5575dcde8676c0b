use anyhow::{Context, Result};

use favicon_tint::color::derive_color_with;
use favicon_tint::config::{Command, Config};
use favicon_tint::favicon::FaviconUpdater;
use favicon_tint::watch::file::{FileSession, file_url};
use favicon_tint::watch::{shutdown_signal, watch_file};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse configuration from command line and config files
    let config = Config::from_args_and_env()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    if let Some(path) = &config.config_path {
        log::debug!("Using configuration from {}", path.display());
    }

    let settings = config.settings;
    match config.command {
        Command::Color { text, json } => {
            let color = derive_color_with(&text, settings.color);
            if json {
                println!("{}", serde_json::to_string_pretty(&color)?);
            } else {
                println!("{} {}", color.background_color, color.svg_color);
            }
        }
        Command::Svg { text } => {
            let color = derive_color_with(&text, settings.color);
            println!("{}", settings.template.render_color(&color));
        }
        Command::Uri { text } => {
            println!("{}", FaviconUpdater::new(settings).icon_uri(&text));
        }
        Command::Apply {
            file,
            stdout,
            watch,
        } => {
            let url = match config.url {
                Some(url) => url,
                None => file_url(&file)?,
            };
            let mut session = FileSession::new(&file, url, settings);

            if watch {
                watch_file(session, shutdown_signal()).await?;
            } else if stdout {
                let (doc, _) = session.render().await?;
                print!("{}", doc.as_str());
            } else {
                let outcome = session
                    .apply()
                    .await
                    .with_context(|| format!("Failed to tint {}", file.display()))?;
                log::info!("{}: {:?}", file.display(), outcome);
            }
        }
    }

    Ok(())
}
