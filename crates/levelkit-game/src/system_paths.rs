//! Locations of the running application

use std::path::PathBuf;

/// Directory containing the running executable
pub fn app_directory() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_directory_exists() {
        let dir = app_directory();
        assert!(dir.is_some_and(|dir| dir.is_dir()));
    }
}
