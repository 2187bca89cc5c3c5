use std::fmt;

/// Four-part runtime version, ordered lexicographically.
///
/// Parsing is total: both `.` and `_` separate groups, so early-access
/// builds such as `1.8.0_301` keep their update number. Any other
/// character inside a group is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub build: u32,
}

pub const JAVA_8: Version = Version::new(1, 8, 0, 0);
pub const JAVA_11: Version = Version::new(11, 0, 0, 0);

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    pub fn parse(text: &str) -> Self {
        let mut parts = [0u32; 4];
        for (slot, group) in parts.iter_mut().zip(text.split(['.', '_'])) {
            *slot = group
                .chars()
                .filter_map(|ch| ch.to_digit(10))
                .fold(0u32, |acc, digit| acc.saturating_mul(10).saturating_add(digit));
        }
        Self::new(parts[0], parts[1], parts[2], parts[3])
    }

    /// Builds a version from the packed `MS`/`LS` words of a Windows
    /// fixed file info block.
    ///
    /// Runtimes before 9 stamp their files as `<feature>.0.<update>.<build>`
    /// (`8.0.3010.9` for 1.8.0_301), so a major in `2..9` is shifted into
    /// the legacy `1.<feature>` scheme. The build word is dropped then.
    pub fn from_packed(ms: u32, ls: u32) -> Self {
        let (major, minor, patch, build) = (ms >> 16, ms & 0xffff, ls >> 16, ls & 0xffff);
        if (2..9).contains(&major) {
            Self::new(1, major, minor, patch)
        } else {
            Self::new(major, minor, patch, build)
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.patch, self.build
        )
    }
}

/// Acceptance thresholds used to classify discovered runtimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub usable: Version,
    pub best: Version,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            usable: JAVA_8,
            best: JAVA_11,
        }
    }
}
