//! Admin gate.
//!
//! [`AdminGate`] is the capability the admin surface checks. [`PasswordGate`] is a stub
//! implementation: a configured string compared in process and remembered as a flag file.
//! It is not a security boundary; row-level security on the backend is.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const AUTHORIZED: &str = "true";

pub trait AdminGate: Send + Sync {
    fn is_authorized(&self) -> bool;
}

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("incorrect admin password")]
    WrongPassword,

    #[error("could not persist admin flag: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct PasswordGate {
    password: String,
    flag_path: PathBuf,
}

impl PasswordGate {
    pub fn new(password: impl Into<String>, flag_path: impl Into<PathBuf>) -> Self {
        Self {
            password: password.into(),
            flag_path: flag_path.into(),
        }
    }

    pub fn flag_path(&self) -> &Path {
        &self.flag_path
    }

    pub fn login(&self, attempt: &str) -> Result<(), AdminError> {
        if attempt != self.password {
            return Err(AdminError::WrongPassword);
        }
        if let Some(parent) = self.flag_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.flag_path, AUTHORIZED)?;
        info!("Admin signed in");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), AdminError> {
        match fs::remove_file(&self.flag_path) {
            Ok(()) => {
                info!("Admin signed out");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl AdminGate for PasswordGate {
    fn is_authorized(&self) -> bool {
        fs::read_to_string(&self.flag_path)
            .map(|flag| flag.trim() == AUTHORIZED)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_login_persists_across_gate_instances() {
        let dir = tempdir().unwrap();
        let flag = dir.path().join("state").join("admin.flag");
        let gate = PasswordGate::new("medfly", &flag);
        assert!(!gate.is_authorized());

        gate.login("medfly").unwrap();
        assert!(gate.is_authorized());
        assert!(PasswordGate::new("medfly", &flag).is_authorized());

        gate.logout().unwrap();
        assert!(!gate.is_authorized());
        gate.logout().unwrap();
    }

    #[test]
    fn test_wrong_password_leaves_gate_closed() {
        let dir = tempdir().unwrap();
        let gate = PasswordGate::new("medfly", dir.path().join("admin.flag"));

        assert!(matches!(gate.login("guess"), Err(AdminError::WrongPassword)));
        assert!(!gate.is_authorized());
        assert!(!gate.flag_path().exists());
    }

    #[test]
    fn test_tampered_flag_is_not_authorized() {
        let dir = tempdir().unwrap();
        let flag = dir.path().join("admin.flag");
        std::fs::write(&flag, "maybe").unwrap();
        assert!(!PasswordGate::new("medfly", flag).is_authorized());
    }
}
