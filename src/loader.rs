use log::debug;
use std::{fs, path::PathBuf};

use crate::error::Result;

/// Reads every file and joins them into one source text, in order. Each file
/// starts on a fresh line even if the previous one lacks a trailing newline.
pub fn load(paths: &[PathBuf]) -> Result<String> {
    let mut source = String::new();

    for path in paths {
        debug!("loading {:?}", path);
        if !source.is_empty() && !source.ends_with('\n') {
            source.push('\n');
        }
        source.push_str(&fs::read_to_string(path)?);
    }

    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::env;

    #[test]
    fn test_load_concatenates_in_order() -> Result<()> {
        let dir = env::temp_dir().join(format!("morklerork-loader-{}", std::process::id()));
        fs::create_dir_all(&dir)?;

        let first = dir.join("first.mr");
        let second = dir.join("second.mr");
        fs::write(&first, "new :x 1")?;
        fs::write(&second, "log :x\n")?;

        let source = load(&[first, second])?;
        assert_eq!(source, "new :x 1\nlog :x\n");

        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let missing = env::temp_dir().join("morklerork-this-file-does-not-exist.mr");
        assert!(matches!(load(&[missing]), Err(Error::IO(_))));
    }
}
