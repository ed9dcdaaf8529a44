use std::fmt;
use std::sync::LazyLock;

/// Release version plus the commit it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: Option<&'static str>,
    pub dirty: bool,
}

impl BuildInfo {
    fn current() -> Self {
        Self {
            version: env!("GPUMON_VERSION"),
            commit: option_env!("VERGEN_GIT_SHA"),
            dirty: option_env!("VERGEN_GIT_DIRTY") == Some("true"),
        }
    }
}

/// Renders as `<version>-<commit>`, with `-dirty` appended for uncommitted trees.
impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.version, self.commit.unwrap_or("unknown"))?;
        if self.dirty {
            f.write_str("-dirty")?;
        }
        Ok(())
    }
}

pub static BUILD_INFO: LazyLock<BuildInfo> = LazyLock::new(BuildInfo::current);

/// Version string shown by `--version` and logged at startup.
pub static VERSION: LazyLock<String> = LazyLock::new(|| BUILD_INFO.to_string());

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn clean_build_shows_version_and_commit() {
        let info = BuildInfo {
            version: "0.3.1",
            commit: Some("4f2a9c1"),
            dirty: false,
        };

        assert_eq!(info.to_string(), "0.3.1-4f2a9c1");
    }

    #[test]
    fn dirty_build_is_flagged() {
        let info = BuildInfo {
            version: "0.3.1",
            commit: Some("4f2a9c1"),
            dirty: true,
        };

        assert_eq!(info.to_string(), "0.3.1-4f2a9c1-dirty");
    }

    #[test]
    fn build_outside_a_checkout_has_unknown_commit() {
        let info = BuildInfo {
            version: "0.3.1",
            commit: None,
            dirty: false,
        };

        assert_eq!(info.to_string(), "0.3.1-unknown");
    }

    #[test]
    fn version_matches_build_info() {
        assert!(VERSION.starts_with(env!("GPUMON_VERSION")));
        assert_eq!(*VERSION, BUILD_INFO.to_string());
    }
}
