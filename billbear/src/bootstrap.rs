use crate::{
    cli::Cli,
    config::{AppConfig, ConfigError},
    svg_renderer::svg_to_png,
};
use billbear_application::{BillSplitter, ReceiptSource, SelectionSheet, SplitError};
use billbear_infrastructure::JsonReceiptReader;
use billbear_presentation::{
    BreakdownPresenter, BreakdownView, CurrencyFormat, combine_svgs_vertically, format_split_error,
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("selection sheet '{}' is not valid JSON: {source}", path.display())]
    Sheet {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{}", format_split_error(.0))]
    Split(#[from] SplitError),
    #[error("failed to rasterize the breakdown")]
    Render,
}

/// Installs the stderr subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "billbear=debug"
    } else {
        "billbear=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

pub fn run(cli: &Cli) -> Result<(), CliError> {
    let config = AppConfig::from_env()?.with_overrides(cli.scale, cli.symbol.clone())?;
    tracing::debug!(
        currency_scale = config.currency_scale,
        currency_symbol = %config.currency_symbol,
        "Configuration loaded"
    );

    let view = split_files(cli, &config)?;
    print!("{}", view.summary_text);

    if cli.svg.is_none() && cli.png.is_none() {
        return Ok(());
    }
    let combined = combine_svgs_vertically(&[&view.share_table_svg, &view.item_table_svg])
        .ok_or(CliError::Render)?;
    if let Some(path) = &cli.svg {
        write_file(path, combined.as_bytes())?;
        tracing::info!(path = %path.display(), "SVG written");
    }
    if let Some(path) = &cli.png {
        let png = svg_to_png(&combined).ok_or(CliError::Render)?;
        write_file(path, &png)?;
        tracing::info!(path = %path.display(), bytes = png.len(), "PNG written");
    }
    Ok(())
}

/// Reads both input files, splits the bill and renders the breakdown.
pub fn split_files(cli: &Cli, config: &AppConfig) -> Result<BreakdownView, CliError> {
    let receipt_bytes = read_file(&cli.receipt)?;
    let sheet_bytes = read_file(&cli.selections)?;
    let sheet = SelectionSheet::from_json(&sheet_bytes).map_err(|source| CliError::Sheet {
        path: cli.selections.clone(),
        source,
    })?;

    let reader = JsonReceiptReader::new(config.currency_scale);
    let splitter = BillSplitter::new(&reader);
    let source = ReceiptSource {
        bytes: &receipt_bytes,
        filename: cli.receipt.to_str(),
        content_type: Some("application/json"),
    };
    let result = splitter.split(&source, &sheet)?;

    let presenter = BreakdownPresenter::new(CurrencyFormat::new(
        config.currency_symbol.clone(),
        config.currency_scale,
    ));
    Ok(presenter.render(&result))
}

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    fs::write(path, bytes).map_err(|source| CliError::Write {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn demo(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("demos")
            .join(name)
    }

    #[fixture]
    fn config() -> AppConfig {
        AppConfig {
            currency_scale: 2,
            currency_symbol: "₹".into(),
        }
    }

    fn cli(receipt: PathBuf, selections: PathBuf) -> Cli {
        Cli {
            receipt,
            selections,
            svg: None,
            png: None,
            scale: None,
            symbol: None,
            verbose: false,
        }
    }

    #[rstest]
    fn splits_demo_files(config: AppConfig) {
        let view = split_files(
            &cli(demo("receipt.json"), demo("selections.json")),
            &config,
        )
        .expect("demo files split");

        assert!(view.summary_text.contains("₹1,499.00"));
        assert!(view.summary_text.contains("Asha"));
        assert!(view.share_table_svg.starts_with("<svg"));
    }

    #[rstest]
    fn missing_file_is_reported(config: AppConfig) {
        let err = split_files(
            &cli(demo("no-such-receipt.json"), demo("selections.json")),
            &config,
        )
        .expect_err("file is missing");
        assert!(matches!(err, CliError::Read { .. }));
    }

    #[rstest]
    fn receipt_is_not_a_selection_sheet(config: AppConfig) {
        let err = split_files(&cli(demo("receipt.json"), demo("receipt.json")), &config)
            .expect_err("receipt does not select anything");
        assert!(matches!(err, CliError::Split(_)), "{err}");
    }
}
