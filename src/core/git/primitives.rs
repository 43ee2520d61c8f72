use crate::error::{Error, Result};

use super::execute_git;

#[derive(Debug, Clone)]
pub struct UncommittedChanges {
    pub has_changes: bool,
    pub staged: Vec<String>,
    pub unstaged: Vec<String>,
    pub untracked: Vec<String>,
}

/// Parse `git status --porcelain=v1` output into structured changes.
pub fn parse_porcelain(stdout: &str) -> UncommittedChanges {
    let mut staged = Vec::new();
    let mut unstaged = Vec::new();
    let mut untracked = Vec::new();

    for line in stdout.lines() {
        if line.len() < 3 {
            continue;
        }
        let index_status = line.chars().next().unwrap_or(' ');
        let worktree_status = line.chars().nth(1).unwrap_or(' ');
        let file_path = line[3..].to_string();

        match (index_status, worktree_status) {
            ('?', '?') => untracked.push(file_path),
            (idx, wt) => {
                if idx != ' ' && idx != '?' {
                    staged.push(file_path.clone());
                }
                if wt != ' ' && wt != '?' {
                    unstaged.push(file_path);
                }
            }
        }
    }

    let has_changes = !staged.is_empty() || !unstaged.is_empty() || !untracked.is_empty();
    UncommittedChanges {
        has_changes,
        staged,
        unstaged,
        untracked,
    }
}

/// Structured view of the working tree's uncommitted state.
pub fn get_uncommitted_changes(path: &str) -> Result<UncommittedChanges> {
    let output = execute_git(
        path,
        &["status", "--porcelain=v1", "--untracked-files=normal"],
    )
    .map_err(|e| Error::git(format!("failed to run git status: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::git(format!("git status failed: {}", stderr.trim())));
    }

    Ok(parse_porcelain(&String::from_utf8_lossy(&output.stdout)))
}

/// Check whether the working tree has no uncommitted changes.
/// A failing `git status` is an error, not a clean tree: the caller must be
/// able to tell "nothing to do" apart from "could not find out".
pub fn is_workdir_clean(path: &str) -> Result<bool> {
    Ok(!get_uncommitted_changes(path)?.has_changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_porcelain_empty_is_clean() {
        let changes = parse_porcelain("");
        assert!(!changes.has_changes);
        assert!(changes.staged.is_empty());
        assert!(changes.untracked.is_empty());
    }

    #[test]
    fn parse_porcelain_classifies_entries() {
        let stdout = "M  staged.cs\n M unstaged.cs\n?? new.cs\nMM both.cs\n";
        let changes = parse_porcelain(stdout);

        assert!(changes.has_changes);
        assert_eq!(changes.staged, vec!["staged.cs", "both.cs"]);
        assert_eq!(changes.unstaged, vec!["unstaged.cs", "both.cs"]);
        assert_eq!(changes.untracked, vec!["new.cs"]);
    }

    #[test]
    fn parse_porcelain_skips_short_lines() {
        let changes = parse_porcelain("M\n\n");
        assert!(!changes.has_changes);
    }

    #[test]
    fn is_workdir_clean_errors_outside_a_repo() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = is_workdir_clean(&temp_dir.path().to_string_lossy());
        assert!(result.is_err());
    }
}
