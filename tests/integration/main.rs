//! Integration tests for stmbench

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn stmbench() -> Command {
        cargo_bin_cmd!("stmbench")
    }

    /// A command isolated from user and project config files
    fn isolated(config: &Path) -> Command {
        let mut cmd = stmbench();
        cmd.arg("--no-local")
            .arg("--config")
            .arg(config)
            .env_remove("RUST_LOG")
            .env_remove("STMBENCH_CONFIG");
        cmd
    }

    fn write_config(dir: &Path, root: &Path) -> PathBuf {
        let stopwords = dir.join("stopwords.txt");
        std::fs::write(&stopwords, "# latin\net\nin\n").unwrap();
        let config = dir.join("config.toml");
        std::fs::write(
            &config,
            format!(
                "[data]\nroot = {:?}\nstopwords = {:?}\n\n[r]\nrscript = \"stmbench-no-such-rscript\"\ninstall_missing_packages = false\n",
                root.display().to_string(),
                stopwords.display().to_string()
            ),
        )
        .unwrap();
        config
    }

    fn write_database(root: &Path) {
        std::fs::create_dir_all(root).unwrap();
        let conn = rusqlite::Connection::open(root.join("corpus.sqlite3")).unwrap();
        conn.execute_batch(
            "CREATE TABLE corpus_raw (
                par_id INTEGER, source TEXT, author TEXT, title TEXT,
                letter INTEGER, row INTEGER, par_raw TEXT, par_lem TEXT
            );
            INSERT INTO corpus_raw VALUES
                (1, 'De Officiis', 'cicero-m', 'Off 1', 0, 1, 'Et in Arcadia', 'et in arcadia'),
                (2, 'Epistulae', 'seneca', 'Ep 1', 1, 2, 'Vale Lucili', 'valeo lucilius');",
        )
        .unwrap();
    }

    fn find_file(dir: &Path, name: &str) -> Option<PathBuf> {
        for entry in std::fs::read_dir(dir).ok()?.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if let Some(found) = find_file(&path, name) {
                    return Some(found);
                }
            } else if path.file_name().is_some_and(|n| n == name) {
                return Some(path);
            }
        }
        None
    }

    #[test]
    fn help_displays() {
        stmbench()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_DESCRIPTION")))
            .stdout(predicate::str::contains("status"));
    }

    #[test]
    fn version_displays() {
        stmbench()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("stmbench"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("custom.toml");
        isolated(&config)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn config_show_applies_overrides() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "[model]\ntopics = 7\niterations = 20\n").unwrap();
        isolated(&config)
            .args(["config", "show", "--topics", "9"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("topics = 9"))
            .stdout(predicate::str::contains("iterations = 20"));
    }

    #[test]
    fn config_init_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("stmbench").join("config.toml");
        isolated(&config).args(["config", "init"]).assert().success();
        let content = std::fs::read_to_string(&config).unwrap();
        assert!(content.contains("[corpus]"));
        assert!(content.contains("grouping = \"work\""));
    }

    #[test]
    fn invalid_config_fails() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "[corpus]\ngrouping = \"chapter\"\n").unwrap();
        isolated(&config)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn rejects_unknown_plot_kind() {
        stmbench()
            .args(["plot", "--plot-kind", "pie"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown plot kind"));
    }

    #[test]
    fn status_missing_data_root() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), &dir.path().join("nope"));
        isolated(&config)
            .current_dir(dir.path())
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Could not find data root"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn fit_missing_database() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("data");
        std::fs::create_dir_all(&root).unwrap();
        let config = write_config(dir.path(), &root);
        isolated(&config)
            .current_dir(dir.path())
            .arg("fit")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Could not find database"));
        assert!(!root.join("corpora").exists());
    }

    #[test]
    fn cache_list_empty() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), &dir.path().join("data"));
        isolated(&config)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache directories found"));
        isolated(&config)
            .args(["cache", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn corpus_exports_without_r_then_fit_is_blocked() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("data");
        write_database(&root);
        let config = write_config(dir.path(), &root);

        // export succeeds, preparation needs R
        isolated(&config)
            .current_dir(dir.path())
            .arg("corpus")
            .assert()
            .failure()
            .stdout(predicate::str::contains("corpus failed"));

        let csv = find_file(&root.join("corpora"), "corpus.csv").expect("corpus.csv exported");
        let content = std::fs::read_to_string(&csv).unwrap();
        assert!(content.starts_with("document,auth_cicero,auth_seneca,wrk_De_Officiis,wrk_Epistulae,letter,row"));
        assert!(csv.parent().unwrap().join("setting.txt").is_file());

        isolated(&config)
            .current_dir(dir.path())
            .arg("fit")
            .assert()
            .failure()
            .stdout(predicate::str::contains("not ready"));

        isolated(&config)
            .args(["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("corpus_"))
            .stdout(predicate::str::contains("stm_"));
    }

    #[test]
    fn status_reports_units() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("data");
        write_database(&root);
        let config = write_config(dir.path(), &root);

        isolated(&config)
            .current_dir(dir.path())
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("corpus.csv"))
            .stdout(predicate::str::contains("stm.RData"))
            .stdout(predicate::str::contains("default_topics_1-2-3.jpeg"));
    }
}
