//! User account lifecycle wrappers over the OS account tools.
//!
//! Usernames are validated before any subprocess runs; the password is piped
//! to chpasswd over stdin so it never appears in an argv or the process table.

use anyhow::{bail, Context, Result};
use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Regex for valid usernames, matching the useradd default policy
static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_-]{0,31}$").expect("Invalid USERNAME_PATTERN regex"));

/// Validate a username before it reaches any account tool
fn validate_username(username: &str) -> Result<()> {
    if !USERNAME_PATTERN.is_match(username) {
        bail!("Invalid username: {:?}", username);
    }
    Ok(())
}

/// Parameters for creating a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub password: String,
}

/// Client for the OS account management tools
pub struct Accounts {
    /// Directory that receives home archives before deletion
    archive_dir: PathBuf,
}

impl Accounts {
    /// Creates a new client archiving into the given directory
    pub fn new(archive_dir: PathBuf) -> Self {
        Self { archive_dir }
    }

    /// Create a user with a home directory and set the initial password
    pub fn create_user(&self, user: &NewUser) -> Result<()> {
        validate_username(&user.username)?;
        if user.full_name.contains(':') {
            bail!("Full name must not contain ':'");
        }
        if self.user_exists(&user.username) {
            bail!("User {} already exists", user.username);
        }

        let output = Command::new("useradd")
            .args(["-m", "-c", user.full_name.as_str(), user.username.as_str()])
            .output()
            .context("Failed to execute useradd")?;
        if !output.status.success() {
            bail!(
                "useradd failed for {}: {}",
                user.username,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        self.set_password(&user.username, &user.password)
    }

    /// Pipe `username:password` into chpasswd
    fn set_password(&self, username: &str, password: &str) -> Result<()> {
        let mut child = Command::new("chpasswd")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn chpasswd")?;

        {
            let stdin = child
                .stdin
                .as_mut()
                .context("chpasswd stdin unavailable")?;
            writeln!(stdin, "{}:{}", username, password)
                .context("Failed to write to chpasswd")?;
        }

        let output = child
            .wait_with_output()
            .context("Failed to wait for chpasswd")?;
        if !output.status.success() {
            bail!(
                "chpasswd failed for {}: {}",
                username,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }

    /// Delete a user, optionally archiving and/or removing the home directory.
    /// Returns the archive path when one was written.
    pub fn delete_user(
        &self,
        username: &str,
        remove_home: bool,
        archive_home: bool,
    ) -> Result<Option<PathBuf>> {
        validate_username(username)?;
        if !self.user_exists(username) {
            bail!("User {} does not exist", username);
        }

        let archive = if archive_home {
            self.archive_home(username)?
        } else {
            None
        };

        let mut cmd = Command::new("userdel");
        if remove_home {
            cmd.arg("-r");
        }
        cmd.arg(username);
        let output = cmd.output().context("Failed to execute userdel")?;
        if !output.status.success() {
            bail!(
                "userdel failed for {}: {}",
                username,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(archive)
    }

    /// Tar up the user's home directory under the archive dir.
    /// A user without a usable home directory archives to nothing.
    fn archive_home(&self, username: &str) -> Result<Option<PathBuf>> {
        let Some(home) = self.home_dir(username)? else {
            return Ok(None);
        };
        let home = Path::new(&home);
        if !home.is_dir() {
            return Ok(None);
        }

        std::fs::create_dir_all(&self.archive_dir)
            .with_context(|| format!("Failed to create archive dir {:?}", self.archive_dir))?;
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let archive = self.archive_dir.join(format!("{}-{}.tar.gz", username, stamp));

        let parent = home.parent().unwrap_or_else(|| Path::new("/"));
        let name = home
            .file_name()
            .context("Home path has no final component")?;
        let output = Command::new("tar")
            .arg("-czf")
            .arg(&archive)
            .arg("-C")
            .arg(parent)
            .arg("--")
            .arg(name)
            .output()
            .context("Failed to execute tar")?;
        if !output.status.success() {
            bail!(
                "tar failed for {:?}: {}",
                home,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(Some(archive))
    }

    /// Resolve the home directory from the passwd entry
    fn home_dir(&self, username: &str) -> Result<Option<String>> {
        let entry = self.passwd_entry(username)?;
        Ok(entry
            .and_then(|line| line.split(':').nth(5).map(|s| s.to_string()))
            .filter(|home| !home.is_empty()))
    }

    /// Look up the raw passwd line; None when the user does not exist
    fn passwd_entry(&self, username: &str) -> Result<Option<String>> {
        let output = Command::new("getent")
            .args(["passwd", username])
            .output()
            .context("Failed to execute getent")?;
        // getent exits 2 when the key is not found
        if !output.status.success() {
            return Ok(None);
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().map(|s| s.to_string()))
    }

    /// Check whether an account exists
    pub fn user_exists(&self, username: &str) -> bool {
        if validate_username(username).is_err() {
            return false;
        }
        self.passwd_entry(username).ok().flatten().is_some()
    }

    /// Human-readable summary of one account: passwd fields plus group membership
    pub fn user_info(&self, username: &str) -> Result<String> {
        validate_username(username)?;
        let entry = self
            .passwd_entry(username)?
            .with_context(|| format!("User {} does not exist", username))?;

        let output = Command::new("id")
            .arg(username)
            .output()
            .context("Failed to execute id")?;
        let ids = String::from_utf8_lossy(&output.stdout).trim().to_string();

        Ok(format_user_info(&entry, &ids))
    }
}

/// Format a passwd line and id output into the info block
fn format_user_info(passwd_line: &str, ids: &str) -> String {
    let fields: Vec<&str> = passwd_line.split(':').collect();
    let field = |i: usize| fields.get(i).copied().unwrap_or("");

    let mut info = String::new();
    info.push_str(&format!("Username:  {}\n", field(0)));
    info.push_str(&format!("UID:       {}\n", field(2)));
    info.push_str(&format!("GID:       {}\n", field(3)));
    info.push_str(&format!(
        "Full name: {}\n",
        field(4).split(',').next().unwrap_or("")
    ));
    info.push_str(&format!("Home:      {}\n", field(5)));
    info.push_str(&format!("Shell:     {}\n", field(6)));
    if !ids.is_empty() {
        info.push_str(&format!("Groups:    {}\n", ids));
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("_svc").is_ok());
        assert!(validate_username("web-runner").is_ok());
        assert!(validate_username("u2").is_ok());
    }

    #[test]
    fn test_validate_username_invalid() {
        assert!(validate_username("").is_err());
        assert!(validate_username("Alice").is_err());
        assert!(validate_username("2cool").is_err());
        assert!(validate_username("-flag").is_err());
        assert!(validate_username("a b").is_err());
        assert!(validate_username("root; rm -rf /").is_err());
        assert!(validate_username("$(whoami)").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_format_user_info() {
        let line = "alice:x:1000:1000:Alice Doe,Room 1:/home/alice:/bin/bash";
        let info = format_user_info(line, "uid=1000(alice) gid=1000(alice) groups=1000(alice)");
        assert!(info.contains("Username:  alice\n"));
        assert!(info.contains("UID:       1000\n"));
        assert!(info.contains("Full name: Alice Doe\n"));
        assert!(info.contains("Home:      /home/alice\n"));
        assert!(info.contains("Shell:     /bin/bash\n"));
        assert!(info.contains("Groups:    uid=1000(alice)"));
    }

    #[test]
    fn test_format_user_info_short_line() {
        let info = format_user_info("bob:x:1001", "");
        assert!(info.contains("Username:  bob\n"));
        assert!(info.contains("Shell:     \n"));
        assert!(!info.contains("Groups:"));
    }
}
