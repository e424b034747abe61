//! Deployment dispatch for built sites.
//!
//! Hands a finished `dist` directory to one of several hosting targets. The
//! external platform CLIs own authentication and transport; this module only
//! invokes them. The sole contract with the build pipeline is that a
//! readable, complete `dist` directory exists at the project root.

use clap::ValueEnum;
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

/// Branch the GitHub Pages deploy pushes to.
const GITHUB_PAGES_BRANCH: &str = "gh-pages";

/// A supported hosting target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeployPlatform {
    /// GitHub Pages via `git subtree push`
    Github,
    /// Netlify via the `netlify` CLI
    Netlify,
    /// Vercel via the `vercel` CLI
    Vercel,
    /// Local preview server
    Preview,
}

impl std::fmt::Display for DeployPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DeployPlatform::Github => "github",
            DeployPlatform::Netlify => "netlify",
            DeployPlatform::Vercel => "vercel",
            DeployPlatform::Preview => "preview",
        };
        write!(f, "{}", name)
    }
}

/// Error during deployment dispatch
#[derive(Debug, Error)]
pub enum DeployError {
    /// Build directory missing; run the build first
    #[error("build directory not found: {}", .0.display())]
    MissingDist(PathBuf),
    /// GitHub Pages requires a git repository
    #[error("not a git repository: {}", .0.display())]
    NotAGitRepo(PathBuf),
    /// A platform CLI is not installed
    #[error("{tool} CLI not found (install it with: {hint})")]
    MissingCli {
        /// CLI binary name
        tool: &'static str,
        /// Install command to suggest
        hint: &'static str,
    },
    /// An external command exited unsuccessfully
    #[error("'{command}' exited with {status}")]
    CommandFailed {
        /// The command line that ran
        command: String,
        /// Its exit status
        status: std::process::ExitStatus,
    },
    /// IO error (spawning a process, binding the preview socket)
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Dispatches a built site to a hosting target.
pub struct Deployer {
    /// Project root (working directory for platform CLIs)
    project_root: PathBuf,
    /// The build output directory
    dist_dir: PathBuf,
}

impl Deployer {
    /// Create a deployer for a project.
    pub fn new(project_root: PathBuf, dist_dir: PathBuf) -> Self {
        Self { project_root, dist_dir }
    }

    /// Deploy to the chosen platform.
    ///
    /// `preview_port` is only used by [`DeployPlatform::Preview`], which
    /// serves until the process is terminated.
    pub fn deploy(&self, platform: DeployPlatform, preview_port: u16) -> Result<(), DeployError> {
        if !self.dist_dir.is_dir() {
            return Err(DeployError::MissingDist(self.dist_dir.clone()));
        }

        match platform {
            DeployPlatform::Github => self.deploy_github(),
            DeployPlatform::Netlify => self.deploy_netlify(),
            DeployPlatform::Vercel => self.deploy_vercel(),
            DeployPlatform::Preview => self.preview(preview_port),
        }
    }

    /// Push the build directory to the `gh-pages` branch with git subtree.
    fn deploy_github(&self) -> Result<(), DeployError> {
        if !self.project_root.join(".git").exists() {
            return Err(DeployError::NotAGitRepo(self.project_root.clone()));
        }

        let prefix = self
            .dist_dir
            .strip_prefix(&self.project_root)
            .unwrap_or(self.dist_dir.as_path())
            .to_string_lossy()
            .into_owned();

        self.run_command(
            "git",
            &["subtree", "push", "--prefix", &prefix, "origin", GITHUB_PAGES_BRANCH],
        )
    }

    /// Deploy through the Netlify CLI.
    fn deploy_netlify(&self) -> Result<(), DeployError> {
        if !cli_available("netlify") {
            return Err(DeployError::MissingCli {
                tool: "netlify",
                hint: "npm install -g netlify-cli",
            });
        }

        let dir_flag = format!("--dir={}", self.dist_dir.display());
        self.run_command("netlify", &["deploy", "--prod", &dir_flag])
    }

    /// Deploy through the Vercel CLI.
    fn deploy_vercel(&self) -> Result<(), DeployError> {
        if !cli_available("vercel") {
            return Err(DeployError::MissingCli { tool: "vercel", hint: "npm install -g vercel" });
        }

        self.run_command("vercel", &["--prod"])
    }

    /// Serve the build directory on a local port until terminated.
    fn preview(&self, port: u16) -> Result<(), DeployError> {
        let listener = TcpListener::bind(("127.0.0.1", port))?;
        let addr = listener.local_addr()?;
        println!("Serving {} at http://{}", self.dist_dir.display(), addr);
        println!("Press Ctrl+C to stop");
        serve(&self.dist_dir, listener);
        Ok(())
    }

    /// Run an external command in the project root with inherited stdio.
    fn run_command(&self, program: &str, args: &[&str]) -> Result<(), DeployError> {
        let status =
            Command::new(program).args(args).current_dir(&self.project_root).status()?;

        if status.success() {
            Ok(())
        } else {
            Err(DeployError::CommandFailed {
                command: format!("{} {}", program, args.join(" ")),
                status,
            })
        }
    }
}

/// Check whether a platform CLI responds to `--version`.
fn cli_available(tool: &str) -> bool {
    Command::new(tool)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Accept connections forever, serving files out of `dist`.
///
/// Single-threaded on purpose: a local preview has one consumer, and the
/// blocking loop keeps the server as simple as the rest of the pipeline.
fn serve(dist: &Path, listener: TcpListener) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(err) = handle_request(dist, stream) {
                    eprintln!("preview: request failed: {}", err);
                }
            }
            Err(err) => eprintln!("preview: connection failed: {}", err),
        }
    }
}

/// Answer a single HTTP request. GET only; anything else gets a 405.
fn handle_request(dist: &Path, mut stream: TcpStream) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    // Drain the request headers so the client sees a clean close
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line == "\r\n" || line == "\n" {
            break;
        }
    }

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("/");

    if method != "GET" {
        return write_response(&mut stream, "405 Method Not Allowed", "text/plain", b"method not allowed");
    }

    match resolve_target(dist, target) {
        Some(path) => match fs::read(&path) {
            Ok(body) => write_response(&mut stream, "200 OK", content_type(&path), &body),
            Err(_) => write_response(&mut stream, "404 Not Found", "text/plain", b"not found"),
        },
        None => write_response(&mut stream, "404 Not Found", "text/plain", b"not found"),
    }
}

/// Map a request target onto a file under `dist`.
///
/// Parent-directory components are rejected outright, so a request can
/// never escape the served tree. Directory targets resolve to their
/// `index.html`.
fn resolve_target(dist: &Path, target: &str) -> Option<PathBuf> {
    let path_part = target.split(['?', '#']).next().unwrap_or("/");

    let mut resolved = dist.to_path_buf();
    for component in Path::new(path_part).components() {
        match component {
            Component::Normal(segment) => resolved.push(segment),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }

    if resolved.is_dir() {
        resolved.push("index.html");
    }
    Some(resolved)
}

/// Content type for the file kinds the collector produces.
fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Write a minimal HTTP/1.1 response and flush.
fn write_response(
    stream: &mut TcpStream,
    status: &str,
    content_type: &str,
    body: &[u8],
) -> io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    )?;
    stream.write_all(body)?;
    stream.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_platform_display() {
        assert_eq!(DeployPlatform::Github.to_string(), "github");
        assert_eq!(DeployPlatform::Netlify.to_string(), "netlify");
        assert_eq!(DeployPlatform::Vercel.to_string(), "vercel");
        assert_eq!(DeployPlatform::Preview.to_string(), "preview");
    }

    #[test]
    fn test_platform_value_enum_parses() {
        let parsed = DeployPlatform::from_str("github", true).unwrap();
        assert_eq!(parsed, DeployPlatform::Github);
        assert!(DeployPlatform::from_str("heroku", true).is_err());
    }

    #[test]
    fn test_deploy_requires_dist() {
        let temp = TempDir::new().unwrap();
        let deployer =
            Deployer::new(temp.path().to_path_buf(), temp.path().join("dist"));

        let err = deployer.deploy(DeployPlatform::Github, 0).unwrap_err();
        assert!(matches!(err, DeployError::MissingDist(_)));
    }

    #[test]
    fn test_github_requires_git_repo() {
        let temp = TempDir::new().unwrap();
        let dist = temp.path().join("dist");
        fs::create_dir_all(&dist).unwrap();
        let deployer = Deployer::new(temp.path().to_path_buf(), dist);

        let err = deployer.deploy(DeployPlatform::Github, 0).unwrap_err();
        assert!(matches!(err, DeployError::NotAGitRepo(_)));
    }

    #[test]
    fn test_resolve_target_root_and_nested() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("index.html"), "<html></html>").unwrap();

        let resolved = resolve_target(temp.path(), "/").unwrap();
        assert_eq!(resolved, temp.path().join("index.html"));

        let nested = resolve_target(temp.path(), "/css/style.css").unwrap();
        assert_eq!(nested, temp.path().join("css/style.css"));
    }

    #[test]
    fn test_resolve_target_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        assert!(resolve_target(temp.path(), "/../secret.txt").is_none());
        assert!(resolve_target(temp.path(), "/css/../../etc/passwd").is_none());
    }

    #[test]
    fn test_resolve_target_strips_query() {
        let temp = TempDir::new().unwrap();
        let resolved = resolve_target(temp.path(), "/page.html?v=2").unwrap();
        assert_eq!(resolved, temp.path().join("page.html"));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type(Path::new("a.html")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("a.css")), "text/css; charset=utf-8");
        assert_eq!(content_type(Path::new("a.js")), "text/javascript; charset=utf-8");
        assert_eq!(content_type(Path::new("a.ico")), "image/x-icon");
        assert_eq!(content_type(Path::new("a.bin")), "application/octet-stream");
    }

    #[test]
    fn test_preview_serves_index() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("index.html"), "<html>preview</html>").unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let dist = temp.path().to_path_buf();
        thread::spawn(move || serve(&dist, listener));

        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("text/html"));
        assert!(response.ends_with("<html>preview</html>"));
    }

    #[test]
    fn test_preview_404_for_missing_file() {
        let temp = TempDir::new().unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let dist = temp.path().to_path_buf();
        thread::spawn(move || serve(&dist, listener));

        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(b"GET /missing.html HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();

        assert!(response.starts_with("HTTP/1.1 404 Not Found"));
    }
}
