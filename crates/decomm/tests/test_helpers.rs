use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

/// Three circuits with known metrics:
/// CKT-A is idle at a closed site, CKT-B trips every default rule,
/// CKT-C trips none.
pub const FLEET_CSV: &str = "\
Circuit ID,Location,Bandwidth,Utilization,Age,Traffic,Cost,Contract Status,Service Type,Redundancy,Site Status,Hardware EOL,Provider Status
CKT-A,Reno - Downtown,100,15,24,500,5,active,modern,no,closed,no,current
CKT-B,Boise - Downtown,1000,5,60,20,20,expired,legacy,no,active,yes,current
CKT-C,Omaha - Old Market,500,80,12,900,3,active,modern,yes,active,no,current
";

/// A scratch working directory with its own data directory.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// Empty workspace: default rules, no circuits.
    pub fn empty() -> Self {
        let fx = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        fx.ok(&["init", "--count", "0"]);
        fx
    }

    /// Default rules plus [`FLEET_CSV`].
    pub fn fleet() -> Self {
        let fx = Self::empty();
        let csv = fx.path().join("fleet.csv");
        std::fs::write(&csv, FLEET_CSV).unwrap();
        fx.ok(&["import", csv.to_str().unwrap()]);
        fx
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.path().join("data")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_decomm"));
        cmd.current_dir(self.path())
            .env_remove("DECOMM_LOG")
            .arg("--data-dir")
            .arg(self.data_dir());
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd().args(args).output().expect("failed to run decomm")
    }

    /// Run decomm, assert success, return stdout.
    pub fn ok(&self, args: &[&str]) -> String {
        let out = self.run(args);
        assert!(
            out.status.success(),
            "decomm {} failed with exit {}\nstderr: {}",
            args.join(" "),
            out.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&out.stderr)
        );
        String::from_utf8_lossy(&out.stdout).to_string()
    }

    /// Run decomm, assert failure, return stderr.
    #[allow(dead_code)]
    pub fn fails(&self, args: &[&str]) -> String {
        let out = self.run(args);
        assert_eq!(
            out.status.code(),
            Some(1),
            "expected exit 1 for: decomm {}\nstdout: {}",
            args.join(" "),
            String::from_utf8_lossy(&out.stdout)
        );
        String::from_utf8_lossy(&out.stderr).to_string()
    }

    /// Run decomm, assert exit code, return parsed JSON stdout.
    pub fn json(&self, args: &[&str], expected_exit: i32) -> Value {
        let out = self.run(args);
        let code = out.status.code().unwrap_or(-1);
        assert_eq!(
            code,
            expected_exit,
            "exit mismatch for: decomm {}\nstdout: {}\nstderr: {}",
            args.join(" "),
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        );
        serde_json::from_slice(&out.stdout).unwrap_or_else(|e| {
            panic!(
                "invalid JSON from: decomm {}\n{e}\nstdout: {}",
                args.join(" "),
                String::from_utf8_lossy(&out.stdout)
            )
        })
    }

    /// The stored circuit with `id`.
    #[allow(dead_code)]
    pub fn circuit(&self, id: &str) -> Value {
        self.json(&["show", id, "--json"], 0)
    }
}
