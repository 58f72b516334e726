//! Sandbox preview process
//!
//! Runs in the child process started by
//! [`ProcessSandboxHost`](super::process_host::ProcessSandboxHost). Owns one
//! tao window and at most one wry webview. Every `mount` drops the current
//! webview (scripts, timers and DOM go with it) before a new one is built.
//!
//! The document is served from a custom protocol under a per-epoch path with
//! a `Content-Security-Policy: sandbox ...` header, so it runs in an opaque
//! origin with only the permissions in its [`SandboxPolicy`]. The webview is
//! incognito and has no IPC handler or initialization script: nothing in the
//! page can reach this process or the host. Navigations away from the mounted
//! document and `window.open` calls are refused and logged, never handed to
//! the operating system.

#![warn(clippy::all, rust_2018_idioms)]

use super::document::RenderEpoch;
use super::policy::SandboxPolicy;
use super::protocol::{PreviewFrame, SandboxCommand};
use std::borrow::Cow;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tao::{
    dpi::{LogicalPosition, LogicalSize},
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
    window::{Window, WindowBuilder},
};
use tracing::{debug, info, warn};
use url::Url;
use wry::http::{Request, Response};
use wry::{NewWindowFeatures, NewWindowResponse, WebView, WebViewBuilder};

const PROTOCOL_NAME: &str = "codecraft";

#[cfg(any(target_os = "windows", target_os = "android"))]
const PREVIEW_SCHEME: &str = "http";
#[cfg(any(target_os = "windows", target_os = "android"))]
const PREVIEW_HOST: &str = "codecraft.localhost";
#[cfg(not(any(target_os = "windows", target_os = "android")))]
const PREVIEW_SCHEME: &str = "codecraft";
#[cfg(not(any(target_os = "windows", target_os = "android")))]
const PREVIEW_HOST: &str = "localhost";

/// URL a given epoch's document is served from
pub fn preview_url(epoch: RenderEpoch) -> String {
    format!("{}://{}/{}/", PREVIEW_SCHEME, PREVIEW_HOST, epoch.value())
}

/// Whether the webview showing `epoch` may navigate to `url` itself.
/// Only the mounted document and blank frames qualify.
fn is_sandbox_navigation(url: &str, epoch: RenderEpoch) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    if parsed.scheme() == "about" {
        return matches!(parsed.path(), "blank" | "srcdoc");
    }

    let root = format!("/{}", epoch.value());
    parsed.scheme() == PREVIEW_SCHEME
        && parsed.host_str() == Some(PREVIEW_HOST)
        && parsed.port().is_none()
        && (parsed.path() == root || parsed.path().starts_with(&format!("{}/", root)))
}

/// Last path segment of a download URL, or a generic name
fn download_file_name(url: &str) -> &str {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or("download")
}

/// `dir/file_name`, or `dir/stem (n).ext` with the first `n` not yet taken
fn free_download_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let extension = name
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    (1u32..)
        .map(|n| dir.join(format!("{} ({}){}", stem, n, extension)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

fn download_destination(url: &str) -> Option<PathBuf> {
    dirs::download_dir().map(|dir| free_download_path(&dir, download_file_name(url)))
}

/// Build the protocol response for one request against the mounted document
fn serve_document(
    uri: &str,
    epoch: RenderEpoch,
    html: &Arc<str>,
    csp: &str,
) -> Response<Cow<'static, [u8]>> {
    let expected = preview_url(epoch);
    let response = if uri == expected || uri == expected.trim_end_matches('/') {
        Response::builder()
            .header("Content-Type", "text/html; charset=utf-8")
            .header("Content-Security-Policy", csp)
            .header("Cache-Control", "no-store")
            .body(Cow::Owned(html.as_bytes().to_vec()))
    } else {
        debug!("Preview protocol 404: {}", uri);
        Response::builder()
            .status(404)
            .body(Cow::Borrowed(&b""[..]))
    };

    response.unwrap_or_else(|e| {
        warn!("Failed to build preview response: {}", e);
        Response::new(Cow::Borrowed(&b""[..]))
    })
}

struct SandboxSurface {
    window: Window,
    current: Option<(RenderEpoch, WebView)>,
}

impl SandboxSurface {
    fn apply(&mut self, command: SandboxCommand) {
        match command {
            SandboxCommand::Mount {
                epoch,
                policy,
                html,
            } => self.mount(epoch, &policy, html),
            SandboxCommand::Unmount { epoch } => {
                if matches!(&self.current, Some((live, _)) if *live == epoch) {
                    self.current = None;
                    debug!("Unmounted preview epoch {}", epoch);
                }
            }
            SandboxCommand::Present { frame } => self.present(frame),
            SandboxCommand::Place { origin } => self
                .window
                .set_outer_position(LogicalPosition::new(origin.x as f64, origin.y as f64)),
            SandboxCommand::Shutdown => {}
        }
    }

    fn mount(&mut self, epoch: RenderEpoch, policy: &SandboxPolicy, html: String) {
        // The old webview must be gone before the new one exists.
        if let Some((previous, webview)) = self.current.take() {
            drop(webview);
            debug!("Destroyed preview epoch {}", previous);
        }

        match build_webview(&self.window, epoch, policy, html.into()) {
            Ok(webview) => {
                info!("Preview epoch {} loaded", epoch);
                self.current = Some((epoch, webview));
            }
            Err(e) => warn!("Failed to build preview webview for epoch {}: {}", epoch, e),
        }
    }

    fn present(&mut self, frame: PreviewFrame) {
        match frame {
            PreviewFrame::Hidden => self.window.set_visible(false),
            PreviewFrame::Sized { width, height } => {
                self.window
                    .set_inner_size(LogicalSize::new(width as f64, height as f64));
                self.window.set_visible(true);
            }
        }
    }
}

fn build_webview(
    window: &Window,
    epoch: RenderEpoch,
    policy: &SandboxPolicy,
    html: Arc<str>,
) -> anyhow::Result<WebView> {
    let csp = policy.csp_header();
    let allow_downloads = policy.allow_downloads;

    let builder = WebViewBuilder::new()
        .with_incognito(true)
        .with_custom_protocol(PROTOCOL_NAME.into(), move |_webview_id, request: Request<Vec<u8>>| {
            serve_document(&request.uri().to_string(), epoch, &html, &csp)
        })
        .with_navigation_handler(move |url: String| {
            let allowed = is_sandbox_navigation(&url, epoch);
            if !allowed {
                info!("Blocked preview navigation to {}", url);
            }
            allowed
        })
        .with_new_window_req_handler(|url: String, _features: NewWindowFeatures| {
            info!("Blocked preview popup for {}", url);
            NewWindowResponse::Deny
        })
        .with_download_started_handler(move |url: String, destination: &mut PathBuf| {
            if !allow_downloads {
                return false;
            }
            match download_destination(&url) {
                Some(path) => {
                    info!("Preview download {} -> {:?}", url, path);
                    *destination = path;
                    true
                }
                None => false,
            }
        })
        .with_url(preview_url(epoch));

    #[cfg(any(
        target_os = "windows",
        target_os = "macos",
        target_os = "ios",
        target_os = "android"
    ))]
    let webview = builder.build(window)?;

    #[cfg(not(any(
        target_os = "windows",
        target_os = "macos",
        target_os = "ios",
        target_os = "android"
    )))]
    let webview = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let vbox = window
            .default_vbox()
            .ok_or_else(|| anyhow::anyhow!("preview window has no GTK container"))?;
        builder.build_gtk(vbox)?
    };

    Ok(webview)
}

/// Forward stdin lines to the event loop; EOF means the host is gone.
fn spawn_command_reader(proxy: EventLoopProxy<SandboxCommand>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Sandbox stdin read failed: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match SandboxCommand::from_line(&line) {
                Ok(command) => {
                    if proxy.send_event(command).is_err() {
                        return;
                    }
                }
                Err(e) => warn!("Ignoring malformed sandbox command: {}", e),
            }
        }

        info!("Host closed the sandbox channel");
        let _ = proxy.send_event(SandboxCommand::Shutdown);
    });
}

/// Entry point of `codecraft --sandbox`
pub fn run_sandbox(title: String) -> anyhow::Result<()> {
    info!("Starting sandbox preview process '{}'", title);

    let event_loop = EventLoopBuilder::<SandboxCommand>::with_user_event().build();
    let window = WindowBuilder::new()
        .with_title(&title)
        .with_visible(false)
        .build(&event_loop)?;

    spawn_command_reader(event_loop.create_proxy());

    let mut surface = SandboxSurface {
        window,
        current: None,
    };

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(SandboxCommand::Shutdown) => {
                info!("Sandbox shutting down");
                surface.current = None;
                *control_flow = ControlFlow::Exit;
            }
            Event::UserEvent(command) => surface.apply(command),
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!("Preview window closed by user");
                surface.current = None;
                *control_flow = ControlFlow::Exit;
            }
            _ => {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_url_is_per_epoch() {
        assert_ne!(
            preview_url(RenderEpoch::new(1)),
            preview_url(RenderEpoch::new(2))
        );
        assert!(preview_url(RenderEpoch::new(5)).ends_with("/5/"));
    }

    #[test]
    fn test_serves_only_current_epoch() {
        let html: Arc<str> = Arc::from("<p>hi</p>");
        let csp = SandboxPolicy::PREVIEW.csp_header();
        let epoch = RenderEpoch::new(3);

        let ok = serve_document(&preview_url(epoch), epoch, &html, &csp);
        assert_eq!(ok.status(), 200);
        assert_eq!(&ok.body()[..], b"<p>hi</p>");
        assert_eq!(
            ok.headers()["Content-Security-Policy"].to_str().unwrap(),
            csp
        );

        let stale = serve_document(&preview_url(RenderEpoch::new(2)), epoch, &html, &csp);
        assert_eq!(stale.status(), 404);
    }

    #[test]
    fn test_navigation_stays_inside_sandbox() {
        let epoch = RenderEpoch::new(1);

        assert!(is_sandbox_navigation(&preview_url(epoch), epoch));
        assert!(is_sandbox_navigation(
            &format!("{}#pricing", preview_url(epoch)),
            epoch
        ));
        assert!(is_sandbox_navigation("about:blank", epoch));
        assert!(is_sandbox_navigation("about:srcdoc", epoch));

        assert!(!is_sandbox_navigation(&preview_url(RenderEpoch::new(2)), epoch));
        assert!(!is_sandbox_navigation("http://codecraft.localhost.attacker.example/1/", epoch));
        assert!(!is_sandbox_navigation("codecraft://localhost.evil/1/", epoch));
        assert!(!is_sandbox_navigation("codecraft://localhost:8080/1/", epoch));
        assert!(!is_sandbox_navigation("about:config", epoch));
        assert!(!is_sandbox_navigation("data:text/html,<p>x</p>", epoch));
        assert!(!is_sandbox_navigation("blob:codecraft://localhost/abc", epoch));
        assert!(!is_sandbox_navigation("file:///etc/passwd", epoch));
        assert!(!is_sandbox_navigation("not a url", epoch));
    }

    #[test]
    fn test_external_links_are_refused() {
        let epoch = RenderEpoch::new(4);

        for url in [
            "https://example.com/",
            "http://example.com/?redirect=codecraft://localhost/4/",
            "mailto:someone@example.com",
        ] {
            assert!(!is_sandbox_navigation(url, epoch), "{} should be refused", url);
        }
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(
            download_file_name("https://cdn.example.com/files/report.csv?x=1"),
            "report.csv"
        );
        assert_eq!(download_file_name("blob:codecraft://localhost/"), "download");
        assert_eq!(download_file_name("https://example.com/files/.."), "download");
    }

    #[test]
    fn test_download_keeps_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(free_download_path(dir.path(), "notes.txt"), dir.path().join("notes.txt"));

        std::fs::write(dir.path().join("notes.txt"), "mine").unwrap();
        let second = free_download_path(dir.path(), "notes.txt");
        assert_eq!(second, dir.path().join("notes (1).txt"));

        std::fs::write(&second, "page").unwrap();
        assert_eq!(
            free_download_path(dir.path(), "notes.txt"),
            dir.path().join("notes (2).txt")
        );

        std::fs::write(dir.path().join("download"), "").unwrap();
        assert_eq!(
            free_download_path(dir.path(), "download"),
            dir.path().join("download (1)")
        );
        assert_eq!(std::fs::read_to_string(dir.path().join("notes.txt")).unwrap(), "mine");
    }
}
