//! Integration tests for swcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A built site plus a config pointing the CLI at it
    struct Site {
        dir: TempDir,
    }

    impl Site {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let dist = dir.path().join("dist");
            fs::create_dir_all(&dist).unwrap();
            for (file, body) in [
                ("index.html", "<h1>Portafolio</h1>"),
                ("manifest.json", r#"{"name":"Portafolio"}"#),
                ("favicon.ico", "ico"),
                ("icon-192x192.png", "png192"),
                ("icon-512x512.png", "png512"),
                ("offline.html", "<h1>Sin conexion</h1>"),
                ("about.html", "<h1>Sobre mi</h1>"),
            ] {
                fs::write(dist.join(file), body).unwrap();
            }

            let site = Self { dir };
            site.write_config("1.0.0");
            site
        }

        fn config_path(&self) -> PathBuf {
            self.dir.path().join("config.toml")
        }

        fn state_dir(&self) -> PathBuf {
            self.dir.path().join("state")
        }

        fn dist(&self) -> PathBuf {
            self.dir.path().join("dist")
        }

        fn write_config(&self, version: &str) {
            let config = format!(
                r#"[worker]
version = "{version}"
precache = ["/", "/index.html", "/manifest.json", "/favicon.ico", "/icon-192x192.png", "/icon-512x512.png", "/offline.html"]

[origin]
root = {root}

[storage]
dir = {state}
"#,
                root = toml_path(&self.dist()),
                state = toml_path(&self.state_dir()),
            );
            fs::write(self.config_path(), config).unwrap();
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("swcache");
            cmd.env("SWCACHE_CONFIG", self.config_path());
            cmd
        }

        fn install(&self) {
            self.cmd().arg("install").assert().success();
        }
    }

    fn toml_path(path: &Path) -> String {
        format!("{:?}", path.display().to_string())
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("swcache")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline cache worker"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("swcache")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("swcache"));
    }

    #[test]
    fn config_path_follows_env() {
        let site = Site::new();
        site.cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let site = Site::new();
        site.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[worker]"))
            .stdout(predicate::str::contains("portafolio"));
    }

    #[test]
    fn config_set_rejects_bad_version() {
        let site = Site::new();
        site.cmd()
            .args(["config", "set", "worker.version", "latest"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid cache version"));
    }

    #[test]
    fn first_install_activates() {
        let site = Site::new();
        site.cmd()
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cached 7 paths"))
            .stdout(predicate::str::contains(
                "portafolio-v1.0.0 now controls http://localhost:4173",
            ));

        site.cmd()
            .args(["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("portafolio-v1.0.0"));
    }

    #[test]
    fn install_fails_when_a_path_is_missing() {
        let site = Site::new();
        fs::remove_file(site.dist().join("favicon.ico")).unwrap();

        site.cmd()
            .arg("install")
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Install failed: could not pre-cache /favicon.ico",
            ));

        // Nothing pre-cached, nothing registered
        site.cmd()
            .args(["cache", "show", "portafolio-v1.0.0", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("index.html").not());
        site.cmd()
            .args(["fetch", "/"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No worker installed"));
    }

    #[test]
    fn fetch_serves_precached_files_offline() {
        let site = Site::new();
        site.install();

        site.cmd()
            .args(["fetch", "/index.html", "--offline", "--body"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("<h1>Portafolio</h1>"));
    }

    #[test]
    fn fetch_caches_network_responses() {
        let site = Site::new();
        site.install();

        site.cmd()
            .args(["fetch", "/about.html"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[network (cached)]"));

        site.cmd()
            .args(["fetch", "/about.html", "--offline"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"));
    }

    #[test]
    fn missing_files_are_not_cached() {
        let site = Site::new();
        site.install();

        site.cmd()
            .args(["fetch", "/nope.png", "-d", "image"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[network]"))
            .stdout(predicate::str::contains("404"));

        site.cmd()
            .args(["fetch", "/nope.png", "-d", "image", "--offline"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not cached"));
    }

    #[test]
    fn offline_navigation_gets_offline_page() {
        let site = Site::new();
        site.install();

        site.cmd()
            .args(["fetch", "/proyectos", "--navigate", "--offline", "--body"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[offline fallback]"))
            .stdout(predicate::str::contains("Sin conexion"));
    }

    #[test]
    fn new_version_waits_until_skip_waiting() {
        let site = Site::new();
        site.install();

        site.write_config("1.1.0");
        site.cmd()
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("portafolio-v1.1.0 installed and waiting"));

        site.cmd()
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Waiting: portafolio-v1.1.0"));

        site.cmd()
            .args(["message", r#"{"type":"SKIP_WAITING"}"#])
            .assert()
            .success()
            .stdout(predicate::str::contains("Purged portafolio-v1.0.0"))
            .stdout(predicate::str::contains("portafolio-v1.1.0 now controls"));

        site.cmd()
            .args(["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("portafolio-v1.1.0"))
            .stdout(predicate::str::contains("portafolio-v1.0.0").not());
    }

    #[test]
    fn activate_waiting_version() {
        let site = Site::new();
        site.install();
        site.write_config("2.0.0");
        site.install();

        site.cmd()
            .arg("activate")
            .assert()
            .success()
            .stdout(predicate::str::contains("portafolio-v2.0.0 now controls"));
    }

    #[test]
    fn activate_with_nothing_installed() {
        let site = Site::new();
        site.cmd()
            .arg("activate")
            .assert()
            .failure()
            .stderr(predicate::str::contains("No waiting worker to activate"));
    }

    #[test]
    fn unknown_message_is_ignored() {
        let site = Site::new();
        site.install();
        site.cmd()
            .args(["message", r#"{"type":"PING"}"#])
            .assert()
            .success()
            .stdout(predicate::str::contains("message ignored"));
    }

    #[test]
    fn push_and_click() {
        let site = Site::new();
        site.cmd()
            .args(["push", "Nuevo proyecto publicado"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Portafolio"))
            .stdout(predicate::str::contains("Nuevo proyecto publicado"));

        site.cmd()
            .args(["click", "--action", "close"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Notification dismissed"));

        site.cmd()
            .args(["click", "--action", "explore"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Opened http://localhost:4173/"));
    }

    #[test]
    fn journal_records_lifecycle() {
        let site = Site::new();
        site.install();

        let journal = fs::read_to_string(site.state_dir().join("journal.log")).unwrap();
        assert!(journal.contains(r#""event":"install""#));
        assert!(journal.contains(r#""event":"activate""#));
    }

    #[test]
    fn cache_clear_removes_everything() {
        let site = Site::new();
        site.install();

        site.cmd()
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleared 1 cache(s)"));

        site.cmd()
            .args(["fetch", "/"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No worker installed"));
    }
}
