use crate::workspace::Workspace;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const LOG_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to run `{engine}`: {source}")]
    Spawn {
        engine: String,
        #[source]
        source: std::io::Error,
    },
    #[error("compiling {document} failed on pass {pass} ({status})\n{log_tail}")]
    Failed {
        document: String,
        pass: usize,
        status: ExitStatus,
        log_tail: String,
    },
    #[error("compiling {document} timed out after {}s on pass {pass}", .timeout.as_secs())]
    TimedOut {
        document: String,
        pass: usize,
        timeout: Duration,
    },
    #[error("compiling {document} produced no {artifact}")]
    MissingArtifact { document: String, artifact: String },
}

/// Drives the external LaTeX engine
#[derive(Debug, Clone)]
pub struct Compiler {
    /// Executable name or path, e.g. `pdflatex`
    pub engine: String,
    /// Passes for a document without volumes; cross references need at least two
    pub passes: usize,
    /// Per-pass limit; `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for Compiler {
    fn default() -> Self {
        Compiler {
            engine: "pdflatex".to_string(),
            passes: 2,
            timeout: Some(Duration::from_secs(600)),
        }
    }
}

/// Paths of a compiled document's artifacts inside the workspace
#[derive(Debug, Clone)]
pub struct CompiledDocument {
    pub document_id: String,
    pub pdf: PathBuf,
}

impl Compiler {
    /// Compile `<document_id>.tex` in the workspace `passes` times.
    pub fn compile(
        &self,
        workspace: &Workspace,
        document_id: &str,
        passes: usize,
    ) -> Result<CompiledDocument> {
        let tex_file = format!("{document_id}.tex");
        for pass in 1..=passes.max(1) {
            log::debug!("running {} on {tex_file}, pass {pass}/{passes}", self.engine);
            self.run_pass(workspace, document_id, &tex_file, pass)?;
        }

        let pdf = workspace.file(&format!("{document_id}.pdf"));
        if !pdf.is_file() {
            return Err(CompileError::MissingArtifact {
                document: document_id.to_string(),
                artifact: format!("{document_id}.pdf"),
            }
            .into());
        }

        Ok(CompiledDocument {
            document_id: document_id.to_string(),
            pdf,
        })
    }

    fn run_pass(
        &self,
        workspace: &Workspace,
        document_id: &str,
        tex_file: &str,
        pass: usize,
    ) -> Result<()> {
        let mut child = Command::new(&self.engine)
            .arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg(tex_file)
            .current_dir(workspace.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| CompileError::Spawn {
                engine: self.engine.clone(),
                source,
            })?;

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child
                .try_wait()
                .with_context(|| format!("Failed to wait for {}", self.engine))?
            {
                break status;
            }
            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    // the process may have exited in the meantime, so errors here don't matter
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(CompileError::TimedOut {
                        document: document_id.to_string(),
                        pass,
                        timeout,
                    }
                    .into());
                }
            }
            // the timeout is only checked this often
            std::thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            return Err(CompileError::Failed {
                document: document_id.to_string(),
                pass,
                status,
                log_tail: log_tail(workspace, document_id),
            }
            .into());
        }
        Ok(())
    }
}

/// The last lines of the engine's log, where LaTeX reports what went wrong
fn log_tail(workspace: &Workspace, document_id: &str) -> String {
    let Ok(log) = workspace.read_to_string(&format!("{document_id}.log")) else {
        return String::new();
    };
    let lines: Vec<&str> = log.lines().collect();
    lines[lines.len().saturating_sub(LOG_TAIL_LINES)..].join("\n")
}

#[cfg(all(test, unix))]
mod test {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn fake_engine(workspace: &Workspace, script: &str) -> String {
        let path = workspace.write("fake-engine.sh", &format!("#!/bin/sh\n{script}\n"))
            .expect("can write fake engine");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("can make fake engine executable");
        path.display().to_string()
    }

    fn compiler(engine: String) -> Compiler {
        Compiler {
            engine,
            passes: 2,
            timeout: Some(Duration::from_secs(30)),
        }
    }

    #[test]
    fn runs_every_pass_and_finds_the_pdf() {
        let workspace = Workspace::create().expect("can create workspace");
        let engine = fake_engine(&workspace, "echo pass >> passes.txt\ntouch book.pdf");
        let compiled = compiler(engine)
            .compile(&workspace, "book", 3)
            .expect("can compile");

        assert_eq!(compiled.pdf, workspace.file("book.pdf"));
        let passes = workspace.read_to_string("passes.txt").expect("passes were logged");
        assert_eq!(passes.lines().count(), 3);
    }

    #[test]
    fn non_zero_exit_is_a_compile_failure() {
        let workspace = Workspace::create().expect("can create workspace");
        let engine = fake_engine(&workspace, "echo '! Undefined control sequence.' > book.log\nexit 1");
        let err = compiler(engine)
            .compile(&workspace, "book", 2)
            .expect_err("should fail");

        match err.downcast_ref::<CompileError>() {
            Some(CompileError::Failed { pass, log_tail, .. }) => {
                assert_eq!(*pass, 1);
                assert!(log_tail.contains("Undefined control sequence"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_pdf_is_an_error() {
        let workspace = Workspace::create().expect("can create workspace");
        let engine = fake_engine(&workspace, "exit 0");
        let err = compiler(engine)
            .compile(&workspace, "book", 1)
            .expect_err("should fail");
        assert!(matches!(
            err.downcast_ref::<CompileError>(),
            Some(CompileError::MissingArtifact { .. })
        ));
    }

    #[test]
    fn hung_engines_are_killed() {
        let workspace = Workspace::create().expect("can create workspace");
        let engine = fake_engine(&workspace, "sleep 30");
        let compiler = Compiler {
            timeout: Some(Duration::from_millis(200)),
            ..compiler(engine)
        };
        let err = compiler
            .compile(&workspace, "book", 1)
            .expect_err("should time out");
        assert!(matches!(
            err.downcast_ref::<CompileError>(),
            Some(CompileError::TimedOut { pass: 1, .. })
        ));
    }

    #[test]
    fn missing_engine_is_a_spawn_error() {
        let workspace = Workspace::create().expect("can create workspace");
        let err = compiler("/nonexistent/codebook-engine".to_string())
            .compile(&workspace, "book", 1)
            .expect_err("should fail");
        assert!(matches!(
            err.downcast_ref::<CompileError>(),
            Some(CompileError::Spawn { .. })
        ));
    }
}
