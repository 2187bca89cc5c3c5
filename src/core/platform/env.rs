use super::EnvironmentReader;

#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl EnvironmentReader for SystemEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }
}

/// Splits a `PATH`-style list, dropping empty segments.
pub fn split_path_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(PATH_LIST_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_list_skips_empty_segments() {
        let sep = PATH_LIST_SEPARATOR;
        let raw = format!("{sep}alpha{sep}{sep} {sep}beta{sep}");
        let parts = split_path_list(&raw).collect::<Vec<_>>();
        assert_eq!(parts, vec!["alpha", "beta"]);
    }
}
