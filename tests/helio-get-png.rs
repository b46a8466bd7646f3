// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * This module tests the helio-get-png command-line interface. Nothing here
 * talks to the real Helioviewer; the failing cases are expected to fail
 * before any request is sent, or against a local port that refuses
 * connections.
 */

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_cmd::Command;
    use predicates::prelude::*;

    fn cmd() -> Command {
        Command::cargo_bin("helio-get-png").unwrap()
    }

    /// A config pointing at a port nothing listens on.
    fn unreachable_config() -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"(api_url: "http://127.0.0.1:9/v2", timeout_secs: 5, retries: 0)"#
        )
        .unwrap();
        f
    }

    #[test]
    fn bad_arguments() {
        // Nothing specified.
        cmd().assert().failure();

        // The end is before the start.
        let tmp = tempfile::tempdir().unwrap();
        cmd()
            .arg("--start=2017-07-11")
            .arg("--end=2017-07-09")
            .arg("--base-dir")
            .arg(tmp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("before the start"));

        // Not a real channel.
        cmd()
            .arg("--start=2017-07-09")
            .arg("--end=2017-07-11")
            .args(&["--channels", "171", "172"])
            .arg("--base-dir")
            .arg(tmp.path())
            .assert()
            .failure();

        // Not a timestamp.
        cmd()
            .arg("--start=yesterday")
            .arg("--end=2017-07-11")
            .assert()
            .failure();

        // Skipping backwards makes no sense.
        cmd()
            .arg("--start=2017-07-09")
            .arg("--end=2017-07-11")
            .arg("--skip-days=-1")
            .arg("--base-dir")
            .arg(tmp.path())
            .assert()
            .failure();

        // Skipping past the end leaves nothing to do.
        cmd()
            .arg("--start=2017-07-09")
            .arg("--end=2017-07-11")
            .arg("--skip-days=3")
            .arg("--base-dir")
            .arg(tmp.path())
            .assert()
            .failure();

        // Skips and cadences too big for the calendar are errors, not
        // crashes.
        cmd()
            .arg("--start=2017-07-09")
            .arg("--end=2017-07-11")
            .arg("--skip-days=100000000")
            .arg("--base-dir")
            .arg(tmp.path())
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("past the last date"));
        cmd()
            .arg("--start=2017-07-09")
            .arg("--end=2017-07-11")
            .arg("--cadence=9223372036854775807")
            .arg("--base-dir")
            .arg(tmp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("too long"));

        // None of these got as far as making a run directory.
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn failed_fetch_names_resume_point() {
        let tmp = tempfile::tempdir().unwrap();
        let config = unreachable_config();
        cmd()
            .arg("--start=2017-07-09")
            .arg("--end=2017-07-16")
            .arg("--skip-days=1")
            .args(&["--channels", "171"])
            .arg("--base-dir")
            .arg(tmp.path())
            .arg("--config")
            .arg(config.path())
            .arg("--no-progress")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--skip-days 1 --skip-hours 0"));

        // The resumed run still uses the original start date's directory.
        assert!(tmp.path().join("2017-07-09").join("171").is_dir());
        assert!(!tmp.path().join("2017-07-10").exists());
    }

    #[test]
    fn bad_config_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "(not_a_setting: 1)").unwrap();
        cmd()
            .arg("--start=2017-07-09")
            .arg("--end=2017-07-11")
            .arg("--config")
            .arg(f.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Could not parse config file"));

        cmd()
            .arg("--start=2017-07-09")
            .arg("--end=2017-07-11")
            .arg("--config=/road/to/no/where.ron")
            .assert()
            .failure();
    }
}
