//! Pack command implementation.

use crate::cli::PackArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::output::PackSummary;
use crate::progress::CliProgress;
use anyhow::Result;
use anyhow::bail;
use reproducible_core::BuildOptions;
use reproducible_core::NoopProgress;
use reproducible_core::OutputFormat;
use reproducible_core::ProgressCallback;
use reproducible_core::build_archive_to_path_with_progress;
use reproducible_core::repack_archive_with_progress;

pub fn execute(
    args: &PackArgs,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let format = OutputFormat::from(args.format);
    let options = build_options(args);

    let mut bar;
    let mut noop = NoopProgress;
    let progress: &mut dyn ProgressCallback = if show_progress && CliProgress::should_show() {
        bar = CliProgress::new("Packing");
        &mut bar
    } else {
        &mut noop
    };

    let (source, repacked, report) = match (&args.dir, &args.archive) {
        (Some(dir), None) => {
            let report = build_archive_to_path_with_progress(
                dir,
                &args.output,
                format,
                &options,
                progress,
            );
            (dir, false, add_archive_context(report, dir)?)
        }
        (None, Some(archive)) => {
            let report =
                repack_archive_with_progress(archive, format, &args.output, &options, progress);
            (archive, true, add_archive_context(report, archive)?)
        }
        // clap's argument group guarantees exactly one source.
        _ => bail!("exactly one of --dir or --archive is required"),
    };

    let summary = PackSummary {
        output: &args.output,
        source,
        format,
        repacked,
    };
    formatter.format_pack_result(&summary, &report)
}

fn build_options(args: &PackArgs) -> BuildOptions {
    let mut options = BuildOptions::new()
        .with_prepend_path(args.prepend.clone())
        .with_compression_level(args.compression_level)
        .with_follow_symlinks(args.follow_symlinks);
    if !args.include.is_empty() {
        options = options.with_file_selector(args.include.iter().cloned());
    }
    if !args.exclude.is_empty() {
        options = options.with_exclude(args.exclude.iter().cloned());
    }
    options
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::cli::Commands;
    use clap::Parser;
    use std::path::PathBuf;

    fn pack_args(argv: &[&str]) -> PackArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        let Commands::Pack(args) = cli.command else {
            panic!("expected pack");
        };
        args
    }

    #[test]
    fn test_filters_absent_when_not_given() {
        let options =
            build_options(&pack_args(&["reproducible", "pack", "-d", "src", "-o", "o.tar"]));
        assert!(options.file_selector.is_none());
        assert!(options.exclude_set.is_none());
        assert!(options.prepend_path.is_none());
    }

    #[test]
    fn test_options_from_flags() {
        let options = build_options(&pack_args(&[
            "reproducible", "pack", "-d", "src", "-o", "o.tgz", "-p", "pkg-1.0", "-x", "build",
            "-i", "a.txt", "-l", "3", "--follow-symlinks",
        ]));
        assert_eq!(options.prepend_path, Some(PathBuf::from("pkg-1.0")));
        assert!(options.exclude_set.unwrap().contains(&PathBuf::from("build")));
        assert!(options.file_selector.unwrap().contains(&PathBuf::from("a.txt")));
        assert_eq!(options.compression_level, Some(3));
        assert!(options.follow_symlinks);
    }
}
