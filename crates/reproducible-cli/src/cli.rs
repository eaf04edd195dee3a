//! CLI argument parsing using clap.

use clap::ArgGroup;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clap_complete::Shell;
use reproducible_core::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reproducible")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a reproducible archive from a directory or another archive
    Pack(PackArgs),
    /// List archive members in stored order
    List(ListArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

/// Output container, as spelled on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Uncompressed tar
    Tar,
    /// Gzip-compressed tar
    #[default]
    TarGz,
    /// Zip without compression
    ZipStore,
    /// Zip with deflate compression
    ZipDeflate,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Tar => Self::Tar,
            FormatArg::TarGz => Self::TarGz,
            FormatArg::ZipStore => Self::ZipStore,
            FormatArg::ZipDeflate => Self::ZipDeflate,
        }
    }
}

#[derive(clap::Args)]
#[command(group(ArgGroup::new("source").required(true).args(["dir", "archive"])))]
pub struct PackArgs {
    /// Output container format
    #[arg(short, long, value_enum, default_value_t = FormatArg::TarGz)]
    pub format: FormatArg,

    /// Source directory to pack
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Existing archive to repack
    #[arg(short, long, value_name = "ARCHIVE")]
    pub archive: Option<PathBuf>,

    /// Output archive path (overwritten if it exists)
    #[arg(short, long = "out", value_name = "OUT")]
    pub output: PathBuf,

    /// Path prefix prepended to every member name
    #[arg(short, long, value_name = "PREFIX")]
    pub prepend: Option<PathBuf>,

    /// Relative or absolute path to leave out (can be repeated)
    #[arg(short = 'x', long = "exclude", value_name = "PATH")]
    pub exclude: Vec<PathBuf>,

    /// Relative path to keep; all others are dropped (can be repeated)
    #[arg(short, long = "include", value_name = "PATH")]
    pub include: Vec<PathBuf>,

    /// Compression level (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: Option<u8>,

    /// Follow symbolic links while walking the source
    #[arg(long)]
    pub follow_symlinks: bool,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Show mode, ownership, and timestamp columns
    #[arg(short, long)]
    pub long: bool,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pack_defaults_to_tar_gz() {
        let cli =
            Cli::try_parse_from(["reproducible", "pack", "-d", "src", "-o", "out.tgz"]).unwrap();
        let Commands::Pack(args) = cli.command else {
            panic!("expected pack");
        };
        assert_eq!(OutputFormat::from(args.format), OutputFormat::TarGz);
        assert_eq!(args.dir, Some(PathBuf::from("src")));
        assert!(args.archive.is_none());
    }

    #[test]
    fn test_pack_requires_exactly_one_source() {
        assert!(Cli::try_parse_from(["reproducible", "pack", "-o", "out.tar"]).is_err());
        assert!(
            Cli::try_parse_from([
                "reproducible", "pack", "-d", "src", "-a", "in.zip", "-o", "out.tar"
            ])
            .is_err()
        );
    }

    #[test]
    fn test_pack_requires_output() {
        assert!(Cli::try_parse_from(["reproducible", "pack", "-d", "src"]).is_err());
    }

    #[test]
    fn test_format_names() {
        let cli = Cli::try_parse_from([
            "reproducible", "pack", "-f", "zip-deflate", "-a", "in.tar", "-o", "out.zip",
        ])
        .unwrap();
        let Commands::Pack(args) = cli.command else {
            panic!("expected pack");
        };
        assert_eq!(OutputFormat::from(args.format), OutputFormat::ZipDeflate);
        assert!(
            Cli::try_parse_from(["reproducible", "pack", "-f", "rar", "-d", "s", "-o", "o"])
                .is_err()
        );
    }

    #[test]
    fn test_repeatable_filters() {
        let cli = Cli::try_parse_from([
            "reproducible", "pack", "-d", "src", "-o", "out.tar", "-x", "a", "-x", "b", "-i", "c",
        ])
        .unwrap();
        let Commands::Pack(args) = cli.command else {
            panic!("expected pack");
        };
        assert_eq!(args.exclude, [PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(args.include, [PathBuf::from("c")]);
    }

    #[test]
    fn test_compression_level_range() {
        assert!(
            Cli::try_parse_from(["reproducible", "pack", "-d", "s", "-o", "o", "-l", "0"]).is_err()
        );
        assert!(
            Cli::try_parse_from(["reproducible", "pack", "-d", "s", "-o", "o", "-l", "9"]).is_ok()
        );
    }
}
