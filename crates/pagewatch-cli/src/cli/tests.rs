#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Command};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_repeatable_flags() {
        let cli = Cli::parse_from([
            "pagewatch",
            "check",
            "--url",
            "https://example.com",
            "--expect",
            "AD_SLOT_1",
            "--expect",
            "footer",
            "--forbid",
            "Service Unavailable",
            "--ignore",
            "adsbygoogle",
        ]);

        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.url.as_deref(), Some("https://example.com"));
        assert_eq!(args.expect_contains, ["AD_SLOT_1", "footer"]);
        assert_eq!(args.expect_not_contains, ["Service Unavailable"]);
        assert_eq!(args.ignore_patterns, ["adsbygoogle"]);
    }

    #[test]
    fn test_check_bool_flags_take_values() {
        let cli = Cli::parse_from([
            "pagewatch",
            "check",
            "--fail-on-console-error",
            "false",
            "--fail-on-request-failed",
            "true",
            "--settle-ms",
            "0",
        ]);

        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.fail_on_console_error, Some(false));
        assert_eq!(args.fail_on_request_failed, Some(true));
        assert_eq!(args.fail_on_page_error, None);
        assert_eq!(args.wait_after_load_ms, Some(0));
    }

    #[test]
    fn test_report_conflicts_with_no_report() {
        let result = Cli::try_parse_from([
            "pagewatch",
            "check",
            "--report",
            "out.json",
            "--no-report",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_history_args() {
        let cli = Cli::parse_from([
            "pagewatch",
            "history",
            "--report",
            "dist/monitor-report.json",
            "--history",
            "dist/history.json",
            "--source",
            "https://example.github.io/site/history.json",
            "--max",
            "48",
            "--run-id",
            "9001",
        ]);

        let Command::History(args) = cli.command else {
            panic!("expected history");
        };
        assert_eq!(args.report, Some(PathBuf::from("dist/monitor-report.json")));
        assert_eq!(args.history, Some(PathBuf::from("dist/history.json")));
        assert_eq!(args.max, Some(48));
        assert_eq!(args.run_id.as_deref(), Some("9001"));
        assert!(args.sha.is_none());
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        let result = Cli::try_parse_from(["pagewatch", "-v", "-q", "history"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["pagewatch", "history", "--no-color", "--verbose"]);
        assert!(cli.no_color);
        assert!(cli.verbose);
    }
}
