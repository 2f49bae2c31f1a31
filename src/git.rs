// src/git.rs
//
// Version-control backend: the four queries the push check needs, and a git2
// implementation of them.

use git2::{ObjectType, Repository, Sort, Tree};
use std::fs;
use std::path::Path;

use crate::error::BackendError;
use crate::revision::Revision;

const MODE_EXECUTABLE: i32 = 0o100755;
const MODE_SYMLINK: i32 = 0o120000;

pub trait Backend {
    /// Commits reachable from `include` but from none of `exclude`, oldest first.
    fn rev_list(
        &self,
        include: &[Revision],
        exclude: &[Revision],
    ) -> Result<Vec<Revision>, BackendError>;

    /// Every ref under `prefix` that peels to a commit, with that commit.
    fn ref_tips(&self, prefix: &str) -> Result<Vec<(String, Revision)>, BackendError>;

    /// Raw message text, comment lines included.
    fn commit_message(&self, rev: Revision) -> Result<String, BackendError>;

    /// Write the full tree of `rev` into the existing directory `dir`.
    fn archive_tree(&self, rev: Revision, dir: &Path) -> Result<(), BackendError>;
}

/// Repository wrapper used by the hook
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open the repository git runs the hook in.
    ///
    /// Honors `GIT_DIR`, `GIT_OBJECT_DIRECTORY` and `GIT_ALTERNATE_OBJECT_DIRECTORIES`,
    /// so objects still in the push quarantine are visible.
    pub fn open_from_env() -> Result<Self, BackendError> {
        let repo = Repository::open_from_env()?;
        Ok(Self { repo })
    }

    /// Open a repository at the given path
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        let repo = Repository::discover(path)?;
        Ok(Self { repo })
    }

    /// The `.git` directory (or the repository itself when bare).
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    fn write_tree(&self, tree: &Tree<'_>, dir: &Path) -> Result<(), BackendError> {
        for entry in tree.iter() {
            let Some(name) = entry.name().filter(|name| is_plain_component(name)) else {
                tracing::warn!(
                    name = %String::from_utf8_lossy(entry.name_bytes()),
                    "skipping tree entry with unusable name"
                );
                continue;
            };
            let path = dir.join(name);

            match entry.kind() {
                Some(ObjectType::Tree) => {
                    fs::create_dir(&path).map_err(|e| BackendError::io(&path, e))?;
                    let subtree = self.repo.find_tree(entry.id())?;
                    self.write_tree(&subtree, &path)?;
                }
                Some(ObjectType::Blob) => {
                    let blob = self.repo.find_blob(entry.id())?;
                    write_blob(&path, blob.content(), entry.filemode())?;
                }
                _ => {
                    // Submodule commits have no content in this repository.
                    tracing::debug!(path = %path.display(), "skipping submodule entry");
                }
            }
        }

        Ok(())
    }
}

impl Backend for GitRepository {
    fn rev_list(
        &self,
        include: &[Revision],
        exclude: &[Revision],
    ) -> Result<Vec<Revision>, BackendError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;

        for rev in include {
            revwalk.push((*rev).into())?;
        }
        for rev in exclude {
            revwalk.hide((*rev).into())?;
        }

        revwalk
            .map(|oid| oid.map(Revision::from).map_err(BackendError::from))
            .collect()
    }

    fn ref_tips(&self, prefix: &str) -> Result<Vec<(String, Revision)>, BackendError> {
        let mut tips = Vec::new();

        for reference in self.repo.references()? {
            let reference = reference?;
            let Some(name) = reference.name() else {
                continue;
            };
            if !name.starts_with(prefix) {
                continue;
            }

            // Tags of trees or blobs have no history to exclude.
            match reference.peel_to_commit() {
                Ok(commit) => tips.push((name.to_string(), Revision::from(commit.id()))),
                Err(e) => tracing::debug!(name, error = %e, "ref does not point to a commit"),
            }
        }

        Ok(tips)
    }

    fn commit_message(&self, rev: Revision) -> Result<String, BackendError> {
        let commit = self.repo.find_commit(rev.into())?;
        Ok(String::from_utf8_lossy(commit.message_raw_bytes()).into_owned())
    }

    fn archive_tree(&self, rev: Revision, dir: &Path) -> Result<(), BackendError> {
        let commit = self.repo.find_commit(rev.into())?;
        let tree = commit.tree()?;
        self.write_tree(&tree, dir)
    }
}

fn is_plain_component(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/')
}

fn write_blob(path: &Path, content: &[u8], mode: i32) -> Result<(), BackendError> {
    if mode == MODE_SYMLINK {
        #[cfg(unix)]
        {
            use std::ffi::OsStr;
            use std::os::unix::ffi::OsStrExt;

            let target = OsStr::from_bytes(content);
            return std::os::unix::fs::symlink(target, path)
                .map_err(|e| BackendError::io(path, e));
        }
    }

    fs::write(path, content).map_err(|e| BackendError::io(path, e))?;

    #[cfg(unix)]
    if mode == MODE_EXECUTABLE {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .map_err(|e| BackendError::io(path, e))?;
    }

    Ok(())
}
