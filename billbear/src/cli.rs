use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "billbear")]
#[command(about = "Split a restaurant receipt by who ate what")]
pub struct Cli {
    /// Receipt JSON as produced by the receipt OCR service
    #[arg(short, long)]
    pub receipt: PathBuf,

    /// Selection sheet JSON: roster plus per-participant item picks
    #[arg(short, long)]
    pub selections: PathBuf,

    /// Write the breakdown tables as SVG
    #[arg(long, value_name = "FILE")]
    pub svg: Option<PathBuf>,

    /// Write the breakdown tables as PNG
    #[arg(long, value_name = "FILE")]
    pub png: Option<PathBuf>,

    /// Fractional digits of the currency (overrides BILLBEAR_CURRENCY_SCALE)
    #[arg(long)]
    pub scale: Option<u32>,

    /// Currency symbol (overrides BILLBEAR_CURRENCY_SYMBOL)
    #[arg(long)]
    pub symbol: Option<String>,

    #[arg(short, long, help = "Enable debug logging")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_required_and_optional_flags() {
        let cli = Cli::try_parse_from([
            "billbear",
            "--receipt",
            "receipt.json",
            "-s",
            "picks.json",
            "--png",
            "out.png",
            "--scale",
            "0",
            "--symbol",
            "¥",
            "-v",
        ])
        .expect("valid arguments");

        assert_eq!(cli.receipt, PathBuf::from("receipt.json"));
        assert_eq!(cli.selections, PathBuf::from("picks.json"));
        assert_eq!(cli.png, Some(PathBuf::from("out.png")));
        assert_eq!(cli.svg, None);
        assert_eq!(cli.scale, Some(0));
        assert_eq!(cli.symbol.as_deref(), Some("¥"));
        assert!(cli.verbose);
    }

    #[rstest]
    #[case::missing_selections(&["billbear", "--receipt", "r.json"])]
    #[case::non_numeric_scale(&["billbear", "-r", "r.json", "-s", "s.json", "--scale", "two"])]
    fn rejects_bad_arguments(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }
}
