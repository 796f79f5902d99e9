//! Integration tests for issn-probe

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Command isolated from the user's config file
    fn probe(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("issn-probe");
        cmd.arg("--config")
            .arg(temp.path().join("config.toml"))
            .env("ISSN_PROBE_PLAIN", "1");
        cmd
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        probe(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Verify journal ISSNs"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        probe(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("issn-probe"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        probe(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        probe(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[fetch]"))
            .stdout(predicate::str::contains("Open Journal Systems"));
    }

    #[test]
    fn config_init_then_invalid_value_is_reported() {
        let temp = TempDir::new().unwrap();
        probe(&temp).args(["config", "init"]).assert().success();
        assert!(temp.path().join("config.toml").exists());

        std::fs::write(temp.path().join("config.toml"), "[fetch]\nconcurrency = 0\n").unwrap();
        probe(&temp)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("fetch.concurrency"));
    }

    #[test]
    fn validate_accepts_good_issn() {
        let temp = TempDir::new().unwrap();
        probe(&temp)
            .args(["validate", "0264-3596", "0000006x"])
            .assert()
            .success()
            .stdout(predicate::str::contains("0000-006X"))
            .stdout(predicate::str::contains("EAN 9770264359008"));
    }

    #[test]
    fn validate_rejects_bad_check_digit() {
        let temp = TempDir::new().unwrap();
        probe(&temp)
            .args(["validate", "1234-5678"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid ISSN 1234-5678"));
    }

    #[test]
    fn match_missing_input() {
        let temp = TempDir::new().unwrap();
        probe(&temp)
            .args(["match", "does-not-exist.csv", "-o"])
            .arg(temp.path().join("out.csv"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Path not found"));
    }

    #[test]
    fn match_missing_column() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.csv");
        std::fs::write(&input, "oai_url,issn\nhttps://a.example/oai,\n").unwrap();

        probe(&temp)
            .arg("match")
            .arg(&input)
            .arg("-o")
            .arg(temp.path().join("out.csv"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("set_spec"));
    }

    #[test]
    fn match_from_warm_cache_needs_no_network() {
        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join("pages");
        std::fs::create_dir_all(&cache_dir).unwrap();
        std::fs::write(
            cache_dir.join("alpha.html"),
            "<footer>ISSN 0024-9319 | Open Journal Systems</footer>",
        )
        .unwrap();
        std::fs::write(cache_dir.join("beta.html"), "<p>nothing here</p>").unwrap();

        let input = temp.path().join("in.csv");
        let output = temp.path().join("out.csv");
        std::fs::write(
            &input,
            "oai_url,set_spec,issn\n\
             https://a.invalid/index/oai,alpha,0024-9319\n\
             https://b.invalid/index/oai,beta,0317-8471\n",
        )
        .unwrap();

        probe(&temp)
            .arg("--cache-dir")
            .arg(&cache_dir)
            .arg("match")
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .assert()
            .success();

        let written = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<_> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0]
            .ends_with("journal_url,issn_webpage_match,ojs_in_html,scrape_success,fetch_status"));
        assert!(lines[1].ends_with(",https://a.invalid/alpha,True,True,True,cached"));
        assert!(lines[2].ends_with(",False,False,True,cached"));
    }

    #[test]
    fn cache_stats_and_clear() {
        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join("pages");
        std::fs::create_dir_all(&cache_dir).unwrap();
        std::fs::write(cache_dir.join("alpha.html"), "<html></html>").unwrap();

        probe(&temp)
            .arg("--cache-dir")
            .arg(&cache_dir)
            .args(["cache", "stats"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Pages: 1"));

        probe(&temp)
            .arg("--cache-dir")
            .arg(&cache_dir)
            .args(["cache", "clear", "--yes"])
            .assert()
            .success();
        assert!(!cache_dir.join("alpha.html").exists());
    }

    #[test]
    fn lookup_without_issns_fails() {
        let temp = TempDir::new().unwrap();
        probe(&temp)
            .args(["lookup", "1234-5678"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No valid ISSNs"));
    }
}
