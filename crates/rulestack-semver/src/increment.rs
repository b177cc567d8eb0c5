use semver::Version;

/// Which component of a version to bump. Bumping always zeroes the lower
/// components and drops pre-release/build metadata, matching how `cargo-edit`
/// increments versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionIncrement {
    Major,
    Minor,
    Patch,
}

impl VersionIncrement {
    #[must_use]
    pub fn bump(&self, version: &Version) -> Version {
        match self {
            Self::Major => Version {
                major: version.major + 1,
                minor: 0,
                patch: 0,
                pre: semver::Prerelease::EMPTY,
                build: semver::BuildMetadata::EMPTY,
            },
            Self::Minor => Version {
                major: version.major,
                minor: version.minor + 1,
                patch: 0,
                pre: semver::Prerelease::EMPTY,
                build: semver::BuildMetadata::EMPTY,
            },
            Self::Patch => Version {
                major: version.major,
                minor: version.minor,
                patch: version.patch + 1,
                pre: semver::Prerelease::EMPTY,
                build: semver::BuildMetadata::EMPTY,
            },
        }
    }
}

/// `IncrementPatch(v)`, as a free function for call sites that don't want to
/// spell out `VersionIncrement::Patch.bump(..)`.
#[must_use]
pub fn increment_patch(version: &Version) -> Version {
    VersionIncrement::Patch.bump(version)
}

#[must_use]
pub fn increment_minor(version: &Version) -> Version {
    VersionIncrement::Minor.bump(version)
}

#[must_use]
pub fn increment_major(version: &Version) -> Version {
    VersionIncrement::Major.bump(version)
}
