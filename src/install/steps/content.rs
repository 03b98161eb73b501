//! Artifact download, validation and legacy handling

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::artifact::ArtifactBundle;
use crate::error::{DepotError, Result};
use crate::hash;
use crate::install::steps::required;
use crate::install::InstallContext;
use crate::progress::PhaseSpinner;
use crate::registry::Registry;
use crate::system::System;
use crate::workflow::Step;

/// Download the artifact, verify its digest and check content support
pub struct ContentValidation;

impl Step<InstallContext> for ContentValidation {
    fn name(&self) -> &'static str {
        "content_validation"
    }

    fn filter(&self, ctx: &InstallContext) -> bool {
        !ctx.runtime.already_installed
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        let session = ctx.runtime.session.clone();
        let name = ctx.input.package.clone();
        let version = required(ctx.runtime.version.as_ref(), "resolved version")?.clone();

        let registry = session.registries.get(&ctx.runtime.registry_name)?;
        let spinner = PhaseSpinner::start(format!("Fetching {name} {version}"));
        let bytes = registry.download(&name, &version)?;
        spinner.finish();

        let digest = hash::digest_bytes(&bytes);
        if let Some(expected) = &ctx.input.expected_integrity {
            if !hash::verify_hash(expected, &digest) {
                if session.options.permissive {
                    warn!(
                        package = %name,
                        expected,
                        actual = %digest,
                        "integrity mismatch ignored in permissive mode"
                    );
                } else {
                    return Err(DepotError::IntegrityMismatch {
                        name,
                        expected: expected.clone(),
                        actual: digest,
                    });
                }
            }
        }

        let bundle = ArtifactBundle::from_bytes(&bytes)?;

        let kinds: BTreeSet<String> = bundle
            .files
            .keys()
            .map(|path| content_kind(path).to_string())
            .collect();
        let kinds: Vec<String> = kinds.into_iter().collect();
        let unsupported = session.system.unsupported_kinds(&kinds)?;
        if !unsupported.is_empty() {
            return Err(DepotError::UnsupportedContent {
                message: format!(
                    "target cannot deploy content kinds: {}",
                    unsupported.join(", ")
                ),
            });
        }

        ctx.runtime.artifact = Some(bytes);
        ctx.runtime.digest = Some(digest);
        Ok(())
    }
}

/// Content kind of a file, taken from its extension
fn content_kind(path: &str) -> &str {
    path.rsplit('/')
        .next()
        .and_then(|file| file.rsplit_once('.'))
        .map_or("plain", |(_, ext)| ext)
}

/// Fold a pre-depot installation into depot bookkeeping
pub struct LegacyMigration;

impl Step<InstallContext> for LegacyMigration {
    fn name(&self) -> &'static str {
        "legacy_migration"
    }

    fn filter(&self, ctx: &InstallContext) -> bool {
        !ctx.runtime.already_installed && ctx.runtime.legacy_detected
    }

    fn run(&self, ctx: &mut InstallContext) -> Result<()> {
        info!(package = %ctx.input.package, "migrating legacy installation");
        ctx.runtime
            .session
            .system
            .migrate_legacy(&ctx.input.package)
    }

    // Migration is one-way; there is nothing to restore on rollback.
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind() {
        assert_eq!(content_kind("objects/zcl_base.def"), "def");
        assert_eq!(content_kind("texts/en.translation"), "translation");
        assert_eq!(content_kind("README"), "plain");
        assert_eq!(content_kind("nested/dir/NOTES"), "plain");
    }
}
