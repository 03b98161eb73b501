//! Shared command plumbing
//!
//! Builds the session over the configured collaborators and parses the
//! `name@range` package argument form.

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use semver::VersionReq;

use crate::config::DepotConfig;
use crate::confirm::{Confirmation, InteractiveConfirmation, UnattendedConfirmation};
use crate::deploy::sandbox::SandboxUnits;
use crate::error::{DepotError, Result};
use crate::registry::dir::DirRegistry;
use crate::registry::{Registry, RegistrySet};
use crate::resolver::{Session, SessionOptions};
use crate::system::sandbox::SandboxSystem;

/// Build a session from the depot home configuration
pub fn open_session(home: Option<PathBuf>, options: SessionOptions) -> Result<Session> {
    let home = DepotConfig::home_dir(home);
    let config = DepotConfig::load(&home)?;

    let system = Rc::new(SandboxSystem::open(&config.system_dir)?);
    let units = Rc::new(SandboxUnits::open(&config.units_dir)?);

    let mut registries = RegistrySet::new(config.default_registry.clone());
    for (name, location) in &config.registries {
        let registry = Rc::new(DirRegistry::open(&location.path)?);
        registries.insert(name.clone(), registry as Rc<dyn Registry>);
    }

    let confirm: Rc<dyn Confirmation> = if options.unattended {
        Rc::new(UnattendedConfirmation)
    } else {
        Rc::new(InteractiveConfirmation)
    };

    Ok(Session::new(
        system,
        Rc::new(registries),
        units,
        confirm,
        options,
        Duration::from_secs(config.unit_deadline_secs),
    ))
}

/// Split a package argument into name and range
///
/// `base-lib` means any version; `base-lib@^1.0.0` restricts the range.
pub fn parse_package_arg(arg: &str) -> Result<(String, VersionReq)> {
    match arg.split_once('@') {
        None => Ok((arg.to_string(), VersionReq::STAR)),
        Some((name, range)) => {
            if name.is_empty() {
                return Err(DepotError::ManifestInvalid {
                    message: format!("invalid package argument '{arg}'"),
                });
            }
            let range = VersionReq::parse(range).map_err(|e| DepotError::ManifestInvalid {
                message: format!("invalid version range '{range}': {e}"),
            })?;
            Ok((name.to_string(), range))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;

    #[test]
    fn test_parse_bare_name() {
        let (name, range) = parse_package_arg("base-lib").unwrap();
        assert_eq!(name, "base-lib");
        assert!(range.matches(&Version::new(0, 1, 0)));
        assert!(range.matches(&Version::new(9, 0, 0)));
    }

    #[test]
    fn test_parse_name_with_range() {
        let (name, range) = parse_package_arg("base-lib@^1.2.0").unwrap();
        assert_eq!(name, "base-lib");
        assert!(range.matches(&Version::new(1, 3, 0)));
        assert!(!range.matches(&Version::new(2, 0, 0)));
    }

    #[test]
    fn test_parse_exact_version() {
        let (_, range) = parse_package_arg("base-lib@=1.2.0").unwrap();
        assert!(range.matches(&Version::new(1, 2, 0)));
        assert!(!range.matches(&Version::new(1, 2, 1)));
    }

    #[test]
    fn test_parse_invalid_range_rejected() {
        assert!(parse_package_arg("base-lib@not-a-range").is_err());
        assert!(parse_package_arg("@^1.0.0").is_err());
    }
}
