//! Sandbox host backed by a separate preview process
//!
//! The preview webview never lives in the host process. The host spawns
//! `codecraft --sandbox` once and drives it with [`SandboxCommand`] lines on
//! its stdin. If the process dies (a crashing page, a closed window) the next
//! command respawns it.

use super::document::RenderEpoch;
use super::policy::SandboxPolicy;
use super::protocol::{PreviewFrame, SandboxCommand, ScreenPoint};
use super::renderer::{SandboxError, SandboxHost};
use std::env;
use std::io::Write;
use std::process::{Child, ChildStdin, Command, Stdio};
use tracing::{debug, info, warn};

/// Command line flag selecting sandbox mode
pub const SANDBOX_FLAG: &str = "--sandbox";

struct SandboxProcess {
    child: Child,
    stdin: ChildStdin,
}

impl SandboxProcess {
    fn spawn(title: &str) -> Result<Self, SandboxError> {
        let current_exe = env::current_exe().map_err(SandboxError::Spawn)?;

        let mut child = Command::new(current_exe)
            .arg(SANDBOX_FLAG)
            .arg("--title")
            .arg(title)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(SandboxError::Spawn)?;

        let stdin = child.stdin.take().ok_or_else(|| {
            SandboxError::Spawn(std::io::Error::other("sandbox stdin was not captured"))
        })?;

        info!("Spawned sandbox process (pid {})", child.id());
        Ok(Self { child, stdin })
    }

    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn send(&mut self, command: &SandboxCommand) -> Result<(), SandboxError> {
        let line = command.to_line()?;
        self.stdin
            .write_all(line.as_bytes())
            .and_then(|_| self.stdin.flush())
            .map_err(SandboxError::Channel)
    }
}

/// [`SandboxHost`] talking to a child preview process
pub struct ProcessSandboxHost {
    title: String,
    process: Option<SandboxProcess>,
    /// Replayed after a respawn so the new window keeps its geometry
    last_frame: Option<PreviewFrame>,
    last_origin: Option<ScreenPoint>,
}

impl ProcessSandboxHost {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            process: None,
            last_frame: None,
            last_origin: None,
        }
    }

    fn process(&mut self) -> Result<&mut SandboxProcess, SandboxError> {
        let alive = match self.process.as_mut() {
            Some(process) => process.is_alive(),
            None => false,
        };

        if !alive {
            if self.process.take().is_some() {
                warn!("Sandbox process exited, starting a new one");
            }
            let mut process = SandboxProcess::spawn(&self.title)?;
            if let Some(origin) = self.last_origin {
                process.send(&SandboxCommand::Place { origin })?;
            }
            if let Some(frame) = self.last_frame {
                process.send(&SandboxCommand::Present { frame })?;
            }
            self.process = Some(process);
        }

        self.process
            .as_mut()
            .ok_or_else(|| SandboxError::Spawn(std::io::Error::other("sandbox process missing")))
    }

    fn live_process(&mut self) -> Option<&mut SandboxProcess> {
        let process = self.process.as_mut()?;
        if process.is_alive() {
            Some(process)
        } else {
            None
        }
    }

    /// Ask the preview process to exit, killing it if the request cannot be delivered.
    pub fn shutdown(&mut self) {
        if let Some(mut process) = self.process.take() {
            if let Err(e) = process.send(&SandboxCommand::Shutdown) {
                debug!("Sandbox shutdown command failed ({}), killing process", e);
                let _ = process.child.kill();
            }
            let _ = process.child.wait();
            info!("Sandbox process stopped");
        }
    }
}

impl SandboxHost for ProcessSandboxHost {
    fn mount(
        &mut self,
        epoch: RenderEpoch,
        document: &str,
        policy: &SandboxPolicy,
    ) -> Result<(), SandboxError> {
        let command = SandboxCommand::Mount {
            epoch,
            policy: *policy,
            html: document.to_string(),
        };
        self.process()?.send(&command)
    }

    fn unmount(&mut self, epoch: RenderEpoch) -> Result<(), SandboxError> {
        // A dead process has nothing left to tear down.
        match self.live_process() {
            Some(process) => process.send(&SandboxCommand::Unmount { epoch }),
            None => Ok(()),
        }
    }

    fn present(&mut self, frame: PreviewFrame) -> Result<(), SandboxError> {
        self.last_frame = Some(frame);
        match self.live_process() {
            Some(process) => process.send(&SandboxCommand::Present { frame }),
            // Applied when the process starts with the first mount
            None => Ok(()),
        }
    }

    fn place(&mut self, origin: ScreenPoint) -> Result<(), SandboxError> {
        self.last_origin = Some(origin);
        match self.live_process() {
            Some(process) => process.send(&SandboxCommand::Place { origin }),
            None => Ok(()),
        }
    }
}

impl Drop for ProcessSandboxHost {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Parse `--sandbox [--title <title>]`, returning the window title when in sandbox mode
pub fn parse_sandbox_args(args: &[String]) -> Option<String> {
    if !args.iter().any(|arg| arg == SANDBOX_FLAG) {
        return None;
    }

    let mut title = "CodeCraft Preview".to_string();
    for i in 0..args.len() {
        if args[i] == "--title" && i + 1 < args.len() {
            title = args[i + 1].clone();
        }
    }

    Some(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_sandbox_args() {
        assert_eq!(parse_sandbox_args(&args(&["codecraft"])), None);
        assert_eq!(
            parse_sandbox_args(&args(&["codecraft", "--sandbox"])),
            Some("CodeCraft Preview".to_string())
        );
        assert_eq!(
            parse_sandbox_args(&args(&["codecraft", "--sandbox", "--title", "Preview: x"])),
            Some("Preview: x".to_string())
        );
    }

    #[test]
    fn test_present_before_spawn_is_deferred() {
        let mut host = ProcessSandboxHost::new("test");

        host.present(PreviewFrame::Hidden).unwrap();
        host.place(ScreenPoint { x: 10, y: 20 }).unwrap();
        host.unmount(RenderEpoch::new(1)).unwrap();

        assert!(host.process.is_none());
        assert_eq!(host.last_origin, Some(ScreenPoint { x: 10, y: 20 }));
        assert_eq!(host.last_frame, Some(PreviewFrame::Hidden));
    }
}
