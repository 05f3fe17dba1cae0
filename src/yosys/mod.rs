//! Runs Yosys on a Verilog file and collects the `show` output.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum YosysError {
    #[error("failed to launch {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },
    #[error("yosys exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("yosys did not produce {0}")]
    MissingArtifact(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YosysConfig {
    pub binary: PathBuf,
    /// Map to the liberty cells with ABC before drawing.
    pub synthesize: bool,
    pub liberty: PathBuf,
    /// Also render a PNG; needs Graphviz `dot` next to Yosys.
    pub render_png: bool,
}

impl Default for YosysConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yosys"),
            synthesize: false,
            liberty: PathBuf::from("cmos_cells.lib"),
            render_png: true,
        }
    }
}

impl YosysConfig {
    /// Script that draws `input` to `<prefix>.dot` (and `<prefix>.png`).
    pub fn script(&self, input: &Path, prefix: &Path) -> String {
        let mut script = String::new();
        script.push_str(&format!("read_verilog \"{}\"\n", input.display()));
        script.push_str("proc; opt; fsm; opt; memory; opt\n");

        if self.synthesize {
            let liberty = self.liberty.display();
            script.push_str("techmap; opt\n");
            script.push_str(&format!("dfflibmap -liberty \"{liberty}\"\n"));
            script.push_str(&format!("abc -liberty \"{liberty}\"\n"));
            script.push_str("splitnets -ports; opt\n");
            script.push_str(&format!("read_liberty -lib \"{liberty}\"\n"));
        }

        script.push_str(&format!("show -format dot -prefix \"{}\"\n", prefix.display()));
        if self.render_png {
            script.push_str(&format!("show -format png -prefix \"{}\"\n", prefix.display()));
        }

        script
    }
}

#[derive(Debug, Clone, Default)]
pub struct YosysOutput {
    pub dot: String,
    pub png: Option<Vec<u8>>,
}

pub struct YosysRunner {
    config: YosysConfig,
}

impl YosysRunner {
    pub fn new(config: YosysConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &YosysConfig {
        &self.config
    }

    /// The scratch directory is removed when this returns, on error too.
    pub fn run(&self, input: &Path) -> Result<YosysOutput, YosysError> {
        let temp_dir = tempfile::Builder::new()
            .prefix("yosys-netgraph")
            .tempdir()?;
        let prefix = temp_dir.path().join("yosys");

        let input = input.canonicalize()?;
        let script_file = temp_dir.path().join("show.ys");
        fs::write(&script_file, self.config.script(&input, &prefix))?;

        tracing::debug!("running {} -s {}", self.config.binary.display(), script_file.display());

        // relative liberty paths resolve against the caller's directory
        let output = Command::new(&self.config.binary)
            .arg("-q")
            .arg("-s")
            .arg(&script_file)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| YosysError::Spawn {
                binary: self.config.binary.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.is_empty() {
                stderr = String::from_utf8_lossy(&output.stdout).trim().to_string();
            }
            return Err(YosysError::Failed {
                status: output.status,
                stderr,
            });
        }

        let dot = read_artifact(&prefix.with_extension("dot"), |path| {
            fs::read_to_string(path)
        })?;
        let png = if self.config.render_png {
            Some(read_artifact(&prefix.with_extension("png"), |path| fs::read(path))?)
        } else {
            None
        };

        Ok(YosysOutput { dot, png })
    }
}

fn read_artifact<T>(
    path: &Path,
    read: impl FnOnce(&Path) -> io::Result<T>,
) -> Result<T, YosysError> {
    read(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => YosysError::MissingArtifact(path.to_path_buf()),
        _ => YosysError::Io(err),
    })
}
