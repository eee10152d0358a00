//! Layered JSON configuration.
//!
//! Precedence, highest first:
//! 1. top-level keys in the config file (pin a setting outright)
//! 2. command-line flags
//! 3. the config file's `default_values` object
//! 4. built-in defaults
//!
//! A missing config file is not an error; the built-ins apply.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const BASE_CONFIG_PATH: &str = "configs/config_base.json";

const DEFAULT_INPUT: &str = "module.dll";
const DEFAULT_OUTPUT: &str = "module_patched.dll";
// Ghidra's default 64-bit image base (0x180000000) plus 0xc00 of
// header slack, negated: maps listing addresses to file offsets.
const DEFAULT_MAGIC_OFFSET: i64 = -6442454016;

/// One layer of optional settings. Used both for a config file's
/// `default_values` object and for its top-level override keys, and to
/// carry the command-line flags into [`resolve`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Overrides {
    pub usage_file: Option<PathBuf>,
    pub payload_file: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub start_index: Option<usize>,
    pub count: Option<i64>,
    pub blacklist_file: Option<PathBuf>,
    pub blacklist: Option<Vec<usize>>,
    pub magic_offset: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub default_values: Overrides,
    #[serde(flatten)]
    pub overrides: Overrides,
}

/// All settings pinned down, ready for the patch run.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub usage_file: PathBuf,
    pub payload_file: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub start_index: usize,
    pub count: i64,
    pub blacklist_file: Option<PathBuf>,
    pub blacklist: Vec<usize>,
    pub magic_offset: i64,
}

pub fn load(path: &Path) -> io::Result<ConfigFile> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ConfigFile::default()),
        Err(e) => return Err(e),
    };
    serde_json::from_str(&text).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("config {}: {e}", path.display()),
        )
    })
}

fn layered<T: Clone>(pinned: &Option<T>, cli: &Option<T>, default: &Option<T>) -> Option<T> {
    pinned
        .clone()
        .or_else(|| cli.clone())
        .or_else(|| default.clone())
}

pub fn resolve(cli: &Overrides, file: &ConfigFile) -> io::Result<Resolved> {
    let pinned = &file.overrides;
    let defaults = &file.default_values;

    let usage_file = layered(&pinned.usage_file, &cli.usage_file, &defaults.usage_file)
        .ok_or_else(|| missing("usage file"))?;
    let payload_file = layered(
        &pinned.payload_file,
        &cli.payload_file,
        &defaults.payload_file,
    )
    .ok_or_else(|| missing("payload file"))?;

    Ok(Resolved {
        usage_file,
        payload_file,
        input: layered(&pinned.input, &cli.input, &defaults.input)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT)),
        output: layered(&pinned.output, &cli.output, &defaults.output)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
        start_index: layered(&pinned.start_index, &cli.start_index, &defaults.start_index)
            .unwrap_or(0),
        count: layered(&pinned.count, &cli.count, &defaults.count).unwrap_or(-1),
        blacklist_file: layered(
            &pinned.blacklist_file,
            &cli.blacklist_file,
            &defaults.blacklist_file,
        ),
        blacklist: layered(&pinned.blacklist, &cli.blacklist, &defaults.blacklist)
            .unwrap_or_default(),
        magic_offset: layered(
            &pinned.magic_offset,
            &cli.magic_offset,
            &defaults.magic_offset,
        )
        .unwrap_or(DEFAULT_MAGIC_OFFSET),
    })
}

fn missing(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("no {what} given on the command line or in the config"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_files() -> Overrides {
        Overrides {
            usage_file: Some(PathBuf::from("usage.txt")),
            payload_file: Some(PathBuf::from("payload.txt")),
            ..Overrides::default()
        }
    }

    #[test]
    fn builtins_apply_without_config() {
        let resolved = resolve(&cli_with_files(), &ConfigFile::default()).unwrap();
        assert_eq!(resolved.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(resolved.start_index, 0);
        assert_eq!(resolved.count, -1);
        assert_eq!(resolved.magic_offset, DEFAULT_MAGIC_OFFSET);
        assert!(resolved.blacklist.is_empty());
        assert!(resolved.blacklist_file.is_none());
    }

    #[test]
    fn missing_positionals_are_an_error() {
        assert!(resolve(&Overrides::default(), &ConfigFile::default()).is_err());
    }

    #[test]
    fn default_values_fill_in_behind_cli() {
        let file: ConfigFile = serde_json::from_str(
            r#"{"default_values": {"start_index": 3, "magic_offset": -16}}"#,
        )
        .unwrap();
        let mut cli = cli_with_files();
        cli.start_index = Some(7);

        let resolved = resolve(&cli, &file).unwrap();
        assert_eq!(resolved.start_index, 7); // CLI beats default_values
        assert_eq!(resolved.magic_offset, -16); // default_values beats built-in
    }

    #[test]
    fn top_level_keys_override_cli() {
        let file: ConfigFile = serde_json::from_str(
            r#"{
                "usage_file": "pinned_usage.txt",
                "count": 5,
                "blacklist": [2, 4],
                "default_values": {"count": 9}
            }"#,
        )
        .unwrap();
        let mut cli = cli_with_files();
        cli.count = Some(1);

        let resolved = resolve(&cli, &file).unwrap();
        assert_eq!(resolved.usage_file, PathBuf::from("pinned_usage.txt"));
        assert_eq!(resolved.count, 5);
        assert_eq!(resolved.blacklist, [2, 4]);
    }

    #[test]
    fn missing_config_file_is_fine() {
        let file = load(Path::new("definitely/not/here.json")).unwrap();
        assert!(file.overrides.usage_file.is_none());
    }
}
