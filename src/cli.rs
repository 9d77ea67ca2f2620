use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueHint};

/// Append a bibtex record for a DOI, an ISBN or a free-form reference to a bibliography, and
/// print its new citekey.
///
/// Without input a placeholder entry is added.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// DOI, ISBN or reference text (several words are joined with spaces)
    #[arg(value_name = "INPUT")]
    pub input: Vec<String>,

    /// Bibliography file to append to; it must already exist
    #[arg(
        short,
        long,
        env = "bibtex_library_path",
        value_name = "FILE",
        value_hint = ValueHint::FilePath
    )]
    pub library: Option<PathBuf>,

    /// Treat input that is neither DOI nor ISBN as reference text for anystyle
    #[arg(
        long,
        env = "parseText",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub parse_text: Option<bool>,

    /// Path to the configuration file that should be used
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// More log output on stderr (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn input(&self) -> String {
        self.input.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bibadd").chain(args.iter().copied())).expect("parse")
    }

    #[test]
    fn words_are_joined() {
        let cli = parse(&["-l", "/tmp/lib.bib", "Doe,", "J.", "2001"]);
        assert_eq!(cli.input(), "Doe, J. 2001");
        assert_eq!(cli.library, Some(PathBuf::from("/tmp/lib.bib")));
    }

    #[test]
    fn no_input_is_empty() {
        let cli = parse(&["--library", "/tmp/lib.bib"]);
        assert_eq!(cli.input(), "");
    }

    #[test]
    fn parse_text_flag_forms() {
        assert_eq!(parse(&["--parse-text"]).parse_text, Some(true));
        assert_eq!(parse(&["--parse-text=false"]).parse_text, Some(false));
        assert_eq!(parse(&["--parse-text=yes"]).parse_text, Some(true));
        assert_eq!(parse(&["--parse-text=0"]).parse_text, Some(false));

        let cli = parse(&["--parse-text", "Doe, J. 2001"]);
        assert_eq!(cli.parse_text, Some(true));
        assert_eq!(cli.input(), "Doe, J. 2001");
    }

    #[test]
    fn verbosity_counts() {
        assert_eq!(parse(&["-vv", "10.1000/182"]).verbose, 2);
    }

    #[test]
    fn doi_with_query_is_one_input() {
        proptest::proptest!(|(q in "[a-z]{1,8}=[0-9]{1,4}")| {
            let arg = format!("https://doi.org/10.1000/182?{q}");
            let cli = parse(&[arg.as_str()]);
            proptest::prop_assert_eq!(cli.input(), arg);
        })
    }
}
