//! Workspace and builtin skills.

use nanobot_web_core::{RemoteShell, shell};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Nanobot, NanobotError};

/// File that defines a skill inside its directory.
pub const SKILL_FILE: &str = "SKILL.md";

/// Builtin skill locations, searched in order after the workspace.
///
/// These are shell expressions (globs, command substitution) and are passed
/// to `find` unquoted.
pub const BUILTIN_SKILL_DIRS: [&str; 3] = [
    "/usr/local/lib/python*/dist-packages/nanobot/skills",
    "/root/.local/lib/python*/dist-packages/nanobot/skills",
    "$(pip show nanobot 2>/dev/null | grep Location | cut -d' ' -f2)/nanobot/skills",
];

/// Where a skill was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillSource {
    Workspace,
    Builtin,
}

/// A discovered skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skill {
    /// Directory name holding `SKILL.md`.
    pub name: String,
    pub source: SkillSource,
    /// Remote path of `SKILL.md`.
    pub path: String,
    /// Trimmed file content.
    pub content: String,
}

/// Skill name from a `.../<name>/SKILL.md` path.
#[must_use]
pub fn skill_name(path: &str) -> Option<&str> {
    let dir = path.strip_suffix(SKILL_FILE)?.strip_suffix('/')?;
    let name = dir.rsplit('/').next().unwrap_or(dir);
    (!name.is_empty()).then_some(name)
}

/// Reject names that would escape the skills directory.
///
/// # Errors
/// Returns `InvalidInput` for empty names, path separators and dot names.
pub fn validate_skill_name(name: &str) -> Result<(), NanobotError> {
    if name.trim().is_empty() {
        return Err(NanobotError::InvalidInput("Skill name is required".to_string()));
    }
    if name.contains('/') || name.contains('\0') || name == "." || name == ".." {
        return Err(NanobotError::InvalidInput(format!("Invalid skill name '{name}'")));
    }
    Ok(())
}

fn find_command(dir: &str) -> String {
    format!("find {dir} -maxdepth 2 -name {SKILL_FILE} 2>/dev/null || true")
}

impl<R: RemoteShell> Nanobot<R> {
    /// All skills: workspace first, then builtin locations.
    ///
    /// The first skill found under a name wins.
    ///
    /// # Errors
    /// Returns error if a remote command cannot run.
    pub async fn skills(&mut self) -> Result<Vec<Skill>, NanobotError> {
        let mut skills: Vec<Skill> = Vec::new();

        let workspace = shell::quote_path(&self.paths().skills_dir())?;
        let mut searches = vec![(find_command(&workspace), SkillSource::Workspace)];
        searches.extend(
            BUILTIN_SKILL_DIRS
                .iter()
                .map(|dir| (find_command(dir), SkillSource::Builtin)),
        );

        for (command, source) in searches {
            let output = self.run(&command).await?;
            for path in output.stdout.lines().map(str::trim) {
                let Some(name) = skill_name(path) else {
                    continue;
                };
                if skills.iter().any(|s| s.name == name) {
                    continue;
                }
                let content = self.read(path).await?.unwrap_or_default();
                skills.push(Skill {
                    name: name.to_string(),
                    source,
                    path: path.to_string(),
                    content: content.trim().to_string(),
                });
            }
        }

        Ok(skills)
    }

    /// One skill by name.
    ///
    /// # Errors
    /// Returns `NotFound` if no location has it.
    pub async fn skill(&mut self, name: &str) -> Result<Skill, NanobotError> {
        self.skills()
            .await?
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| NanobotError::NotFound(format!("Skill '{name}' not found")))
    }

    /// Create a workspace skill.
    ///
    /// # Errors
    /// Returns `Conflict` if the workspace skill already exists; its content is
    /// left untouched.
    pub async fn create_skill(&mut self, name: &str, content: &str) -> Result<(), NanobotError> {
        validate_skill_name(name)?;
        let path = self.paths().skill_file(name);
        if self.read(&path).await?.is_some() {
            return Err(NanobotError::Conflict(format!("Skill '{name}' already exists")));
        }
        self.write(&path, content, "Failed to create skill").await?;
        info!(name, "Created skill");
        Ok(())
    }

    /// Overwrite (or create) a workspace skill.
    ///
    /// # Errors
    /// Returns error if the name is invalid or the write fails.
    pub async fn update_skill(&mut self, name: &str, content: &str) -> Result<(), NanobotError> {
        validate_skill_name(name)?;
        let path = self.paths().skill_file(name);
        self.write(&path, content, "Failed to save skill").await
    }
}
