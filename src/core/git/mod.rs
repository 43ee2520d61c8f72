mod primitives;
mod publish;

pub use primitives::*;
pub use publish::*;

use std::process::Command;

fn execute_git(path: &str, args: &[&str]) -> std::io::Result<std::process::Output> {
    Command::new("git").args(args).current_dir(path).output()
}
