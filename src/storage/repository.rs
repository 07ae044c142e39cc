//!   Git working tree wrapper.
//!
//!  This is the central component of the storage layer. It owns the working
//!  tree location and exposes the handful of git operations a document store
//!  needs: show, add, commit, log, grep and unstaging.
//!
//!  Repository setup (open, init, default identity) goes through `git2`;
//!  everything that touches content shells out via [`GitCommand`] so the
//!  output formats stay the ones git prints.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::{ConfigLevel, Repository};
use tracing::{debug, info};

use crate::storage::command::GitCommand;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{Author, GitSignature, RevisionSpec};

/// `--pretty` format for [`GitRepository::log`]: short id, author name,
/// bracketed email, relative date, subject.
pub const LOG_FORMAT: &str = "format:%h %an <%ae> %ar %s";

/// stderr fragments git prints when a path or revision does not exist
const NOT_FOUND_MARKERS: &[&str] = &[
    "does not exist in",
    "exists on disk, but not in",
    "invalid object name",
    "not a valid object name",
    "bad revision",
    "unknown revision",
    "ambiguous argument",
];

/// stdout fragments of `git commit` when nothing is staged
const NOTHING_TO_COMMIT_MARKERS: &[&str] = &[
    "nothing to commit",
    "nothing added to commit",
    "no changes added to commit",
];

/// printed by `git log` on a repository without commits
const NO_COMMITS_MARKER: &str = "does not have any commits yet";

/// The git working tree backing the store.
///
/// Clone this to share across threads - it uses Arc internally.
#[derive(Debug, Clone)]
pub struct GitRepository {
    inner: Arc<GitRepositoryInner>,
}

#[derive(Debug)]
struct GitRepositoryInner {
    path: PathBuf,
    git: GitCommand,
}

impl GitRepository {
    /// Open an existing, non-bare repository.
    pub fn open(path: impl AsRef<Path>, signature: &GitSignature) -> StorageResult<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| StorageError::NotInitialized(path.to_path_buf()))?;
        if repo.workdir().is_none() {
            return Err(StorageError::NotInitialized(path.to_path_buf()));
        }
        ensure_identity(&repo, signature)?;

        Ok(Self::from_parts(path, GitCommand::new(path)))
    }

    /// Initialize a new repository.
    pub fn init(path: impl AsRef<Path>, signature: &GitSignature) -> StorageResult<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        let repo = Repository::init(path)?;
        ensure_identity(&repo, signature)?;
        info!(path = %path.display(), "initialized repository");

        Ok(Self::from_parts(path, GitCommand::new(path)))
    }

    /// Open or initialize a repository.
    pub fn open_or_init(path: impl AsRef<Path>, signature: &GitSignature) -> StorageResult<Self> {
        let path = path.as_ref();
        if path.join(".git").exists() {
            Self::open(path, signature)
        } else {
            Self::init(path, signature)
        }
    }

    /// Use a specific git executable instead of the one on PATH.
    pub fn with_program(self, program: impl Into<PathBuf>) -> Self {
        let path = self.inner.path.clone();
        Self::from_parts(&path, GitCommand::with_program(program, &path))
    }

    fn from_parts(path: &Path, git: GitCommand) -> Self {
        Self {
            inner: Arc::new(GitRepositoryInner {
                path: path.to_path_buf(),
                git,
            }),
        }
    }

    /// Get the working tree path.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Get the command runner bound to this working tree.
    pub fn git(&self) -> &GitCommand {
        &self.inner.git
    }

    // ==================== Reads ====================

    /// Content of `path` as it was at `revision`.
    pub fn show(&self, path: &str, revision: &RevisionSpec) -> StorageResult<Vec<u8>> {
        let rev = revision.as_git_rev();
        if rev.starts_with('-') || rev.contains(char::is_whitespace) {
            return Err(not_found(path, revision));
        }

        // the trailing `--` keeps git from falling back to reading the
        // argument as a pathspec when the object does not resolve
        let object = format!("{}:{}", rev, path);
        self.git().run("show", [object.as_str(), "--"]).map_err(|e| match e {
            StorageError::Execution { ref message, .. } if is_not_found_message(message) => {
                not_found(path, revision)
            }
            other => other,
        })
    }

    /// Raw history of `path`, one line per commit, newest first.
    pub fn log(&self, path: &str) -> StorageResult<Vec<u8>> {
        let pretty = format!("--pretty={}", LOG_FORMAT);
        match self.git().run("log", [pretty.as_str(), "--", path]) {
            Err(StorageError::Execution { ref message, .. }) if message.contains(NO_COMMITS_MARKER) => {
                debug!(path, "log on repository without commits");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Case-insensitive search over the tracked content, as `path\0line` lines.
    pub fn grep(&self, keyword: &str) -> StorageResult<Vec<u8>> {
        let output = self.git().output(
            "grep",
            ["-I", "-z", "--ignore-case", "--fixed-strings", "--no-color", "-e", keyword],
        )?;

        // exit status 1 without diagnostics means no line matched
        if output.exit_code() == Some(1) && output.stderr.is_empty() {
            return Ok(Vec::new());
        }
        output.into_result("grep")
    }

    /// Abbreviated id of the current HEAD commit, if there is one.
    pub fn head(&self) -> StorageResult<Option<String>> {
        let output = self.git().output("rev-parse", ["--verify", "--quiet", "--short", "HEAD"])?;
        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(output.stdout_text().trim().to_string()))
    }

    // ==================== Writes ====================

    /// Stage the on-disk content of `path`.
    pub fn add(&self, path: &str) -> StorageResult<()> {
        self.git().run("add", ["--", path])?;
        Ok(())
    }

    /// Create a commit from everything staged.
    ///
    /// The empty author leaves attribution to the configured identity.
    pub fn commit(&self, message: &str, author: &Author) -> StorageResult<()> {
        let mut args = vec!["-m".to_string(), message.to_string()];
        if !author.is_empty() {
            args.push(format!("--author={}", author));
        }

        let output = self.git().output("commit", &args)?;
        if !output.status.success() && output.stderr.is_empty() {
            let stdout = output.stdout_text();
            if NOTHING_TO_COMMIT_MARKERS.iter().any(|m| stdout.contains(m)) {
                return Err(StorageError::NothingToCommit);
            }
        }
        output.into_result("commit")?;
        Ok(())
    }

    /// Drop any staged change to `path`, leaving the file on disk alone.
    pub fn unstage(&self, path: &str) -> StorageResult<()> {
        self.git().run("reset", ["-q", "--", path])?;
        Ok(())
    }
}

fn not_found(path: &str, revision: &RevisionSpec) -> StorageError {
    StorageError::NotFound {
        path: path.to_string(),
        revision: revision.to_string(),
    }
}

fn is_not_found_message(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    NOT_FOUND_MARKERS.iter().any(|m| message.contains(m))
}

/// Make sure commits without an explicit author have an identity to use.
fn ensure_identity(repo: &Repository, signature: &GitSignature) -> StorageResult<()> {
    let config = repo.config()?;
    let has_name = config.get_string("user.name").is_ok();
    let has_email = config.get_string("user.email").is_ok();
    if has_name && has_email {
        return Ok(());
    }

    let mut local = config.open_level(ConfigLevel::Local)?;
    if !has_name {
        local.set_str("user.name", &signature.name)?;
    }
    if !has_email {
        local.set_str("user.email", &signature.email)?;
    }
    info!(name = %signature.name, email = %signature.email, "configured default identity");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, GitRepository) {
        let dir = TempDir::new().unwrap();
        let repo = GitRepository::init(dir.path(), &GitSignature::wiki()).unwrap();
        (dir, repo)
    }

    fn write(repo: &GitRepository, path: &str, body: &str) {
        std::fs::write(repo.path().join(path), body).unwrap();
    }

    fn log_lines(repo: &GitRepository, path: &str) -> Vec<String> {
        String::from_utf8(repo.log(path).unwrap())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_init_and_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path();

        assert!(matches!(
            GitRepository::open(path, &GitSignature::wiki()),
            Err(StorageError::NotInitialized(_))
        ));

        GitRepository::init(path, &GitSignature::wiki()).unwrap();
        let repo = GitRepository::open(path, &GitSignature::wiki()).unwrap();
        assert_eq!(repo.path(), path);
    }

    #[test]
    fn test_open_or_init() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data");

        let repo = GitRepository::open_or_init(&path, &GitSignature::wiki()).unwrap();
        assert!(path.join(".git").exists());
        assert_eq!(repo.head().unwrap(), None);

        GitRepository::open_or_init(&path, &GitSignature::wiki()).unwrap();
    }

    #[test]
    fn test_add_commit_show() {
        let (_dir, repo) = setup();
        write(&repo, "test.md", "Testing adding and committing.");
        repo.add("test.md").unwrap();
        repo.commit("Test commit", &Author::new("Test", "test@example.com")).unwrap();

        let body = repo.show("test.md", &RevisionSpec::Current).unwrap();
        assert_eq!(body, b"Testing adding and committing.");

        let lines = log_lines(&repo, "test.md");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains(" Test <test@example.com> "), "got {}", lines[0]);
        assert!(lines[0].ends_with(" Test commit"));
    }

    #[test]
    fn test_commit_with_default_identity() {
        let (_dir, repo) = setup();
        write(&repo, "a.md", "a");
        repo.add("a.md").unwrap();
        repo.commit("anonymous", &Author::empty()).unwrap();

        // a global identity, when present, wins over the wiki signature
        let email = Repository::open(repo.path())
            .unwrap()
            .config()
            .unwrap()
            .get_string("user.email")
            .unwrap();
        let lines = log_lines(&repo, "a.md");
        assert!(lines[0].contains(&format!(" <{}> ", email)), "got {}", lines[0]);
    }

    #[test]
    fn test_show_missing_is_not_found() {
        let (_dir, repo) = setup();
        // no commits yet
        let err = repo.show("nope.md", &RevisionSpec::Current).unwrap_err();
        assert!(err.is_not_found(), "got {err:?}");

        write(&repo, "a.md", "a");
        repo.add("a.md").unwrap();
        repo.commit("first", &Author::empty()).unwrap();

        let err = repo.show("nope.md", &RevisionSpec::Current).unwrap_err();
        assert!(err.is_not_found(), "got {err:?}");

        let err = repo.show("a.md", &RevisionSpec::Object("deadbeef".into())).unwrap_err();
        assert!(err.is_not_found(), "got {err:?}");

        let err = repo.show("a.md", &RevisionSpec::Object("--output=x".into())).unwrap_err();
        assert!(err.is_not_found(), "got {err:?}");
    }

    #[test]
    fn test_nothing_to_commit() {
        let (_dir, repo) = setup();
        write(&repo, "a.md", "a");
        repo.add("a.md").unwrap();
        repo.commit("first", &Author::empty()).unwrap();

        let err = repo.commit("again", &Author::empty()).unwrap_err();
        assert!(err.is_nothing_to_commit(), "got {err:?}");
    }

    #[test]
    fn test_add_is_idempotent() {
        let (_dir, repo) = setup();
        write(&repo, "a.md", "a");
        repo.add("a.md").unwrap();
        repo.add("a.md").unwrap();
        repo.commit("once", &Author::empty()).unwrap();

        assert_eq!(log_lines(&repo, "a.md").len(), 1);
        repo.add("a.md").unwrap();
        assert!(repo.commit("twice", &Author::empty()).unwrap_err().is_nothing_to_commit());
    }

    #[test]
    fn test_log_empty() {
        let (_dir, repo) = setup();
        assert!(repo.log("missing.md").unwrap().is_empty());

        write(&repo, "a.md", "a");
        repo.add("a.md").unwrap();
        repo.commit("first", &Author::empty()).unwrap();
        assert!(repo.log("missing.md").unwrap().is_empty());
    }

    #[test]
    fn test_grep() {
        let (_dir, repo) = setup();
        write(&repo, "a.md", "the Quick fox\nlazy dog\n");
        write(&repo, "b.md", "nothing here\n");
        repo.add("a.md").unwrap();
        repo.add("b.md").unwrap();
        repo.commit("docs", &Author::empty()).unwrap();

        let out = String::from_utf8(repo.grep("quick").unwrap()).unwrap();
        assert_eq!(out, "a.md\0the Quick fox\n");

        assert!(repo.grep("absent").unwrap().is_empty());
        assert!(repo.grep("-v").unwrap().is_empty()); // keyword is never an option
    }

    #[cfg(unix)]
    #[test]
    fn test_show_missing_wildcard_path_is_not_found() {
        let (_dir, repo) = setup();
        write(&repo, "ab.md", "ab");
        repo.add("ab.md").unwrap();
        repo.commit("ab", &Author::empty()).unwrap();

        for path in ["a?.md", "*.md", "[a]b.md"] {
            let err = repo.show(path, &RevisionSpec::Current).unwrap_err();
            assert!(err.is_not_found(), "{path}: got {err:?}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_paths_are_literal() {
        let (_dir, repo) = setup();
        write(&repo, "ab.md", "ab");
        write(&repo, "a?.md", "question");
        repo.add("ab.md").unwrap();
        repo.commit("ab commit", &Author::empty()).unwrap();

        assert!(repo.log("a?.md").unwrap().is_empty());

        write(&repo, "ab.md", "changed");
        repo.add("a?.md").unwrap();
        repo.commit("question commit", &Author::empty()).unwrap();
        assert_eq!(log_lines(&repo, "ab.md").len(), 1);
        assert_eq!(repo.show("ab.md", &RevisionSpec::Current).unwrap(), b"ab");
        assert_eq!(repo.show("a?.md", &RevisionSpec::Current).unwrap(), b"question");

        repo.add("ab.md").unwrap();
        repo.unstage("a*").unwrap();
        let staged = repo.git().run("diff", ["--cached", "--name-only"]).unwrap();
        assert_eq!(staged, b"ab.md\n");
    }

    #[test]
    fn test_unstage() {
        let (_dir, repo) = setup();
        write(&repo, "a.md", "a");
        repo.add("a.md").unwrap();
        repo.unstage("a.md").unwrap();

        assert!(repo.commit("empty", &Author::empty()).unwrap_err().is_nothing_to_commit());
        assert!(repo.path().join("a.md").exists());
    }

    #[test]
    fn test_head() {
        let (_dir, repo) = setup();
        assert_eq!(repo.head().unwrap(), None);

        write(&repo, "a.md", "a");
        repo.add("a.md").unwrap();
        repo.commit("first", &Author::empty()).unwrap();

        let head = repo.head().unwrap().unwrap();
        assert!(head.len() >= 7);
        let lines = log_lines(&repo, "a.md");
        assert!(lines[0].starts_with(&head));
    }
}
