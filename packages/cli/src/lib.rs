//! # objfs-cli
//!
//! Read and write an objfs store from the command line. Keys are addressed
//! by dotted paths relative to the store root; values are JSON.
//!
//! ```bash
//! objfs --path ~/data set user '{"name": "Alice", "age": 30}'
//! objfs --path ~/data get user.name
//! objfs --path ~/data tree
//! objfs --path ~/data delete user
//! objfs --path ~/data --algorithm aes256 --key secret set n 42
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;

use objfs::{Options, Path, PathError, Store, Value};

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Store(#[from] objfs::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// objfs - a nested mapping persisted as a directory tree
#[derive(Parser, Debug)]
#[command(name = "objfs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base directory of the store (defaults to the home directory)
    #[arg(long, global = true)]
    pub path: Option<PathBuf>,

    /// Store name
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Text encoding of leaves (utf8, latin1, ascii)
    #[arg(long, global = true)]
    pub encoding: Option<String>,

    /// Permission mode (r, ro, w, wo, rw)
    #[arg(long, global = true)]
    pub permissions: Option<String>,

    /// Encryption algorithm (aes-256-cbc, aes256)
    #[arg(long, global = true, requires = "key")]
    pub algorithm: Option<String>,

    /// Encryption key
    #[arg(long, global = true, requires = "algorithm")]
    pub key: Option<String>,

    /// JSON options file; flags override its fields
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value stored at a dotted path
    Get {
        #[arg(value_name = "PATH")]
        key: String,
    },

    /// Store a JSON value at a dotted path (null deletes)
    Set {
        #[arg(value_name = "PATH")]
        key: String,
        value: String,
    },

    /// Delete whatever is stored at a dotted path
    Delete {
        #[arg(value_name = "PATH")]
        key: String,
    },

    /// Print a node and everything below it (the root by default)
    Tree {
        #[arg(value_name = "PATH")]
        node: Option<String>,
    },

    /// Print the store's computed properties
    Info,
}

impl Cli {
    /// Options from the config file, if any, overridden by flags.
    pub fn options(&self) -> Result<Options, CliError> {
        let mut options = match &self.config {
            Some(file) => Options::from_json_file(file)?,
            None => Options::new(),
        };

        if let Some(path) = &self.path {
            options = options.path(path);
        }
        if let Some(name) = &self.name {
            options = options.name(name);
        }
        if let Some(encoding) = &self.encoding {
            options = options.encoding(encoding);
        }
        if let Some(permissions) = &self.permissions {
            options = options.permissions(permissions);
        }
        if let (Some(algorithm), Some(key)) = (&self.algorithm, &self.key) {
            options = options.encryption(algorithm, key);
        }

        Ok(options)
    }
}

/// Run one command and return what should be printed.
pub fn execute(cli: &Cli) -> Result<String, CliError> {
    let store = Store::open(cli.options()?)?;
    log::debug!("Opened {:?}", store);

    match &cli.command {
        Command::Get { key } => {
            let (parent, key) = address(&store, key)?;
            let value = store.node(parent)?.get(&key)?;
            Ok(format_value(value.as_ref()))
        }
        Command::Set { key, value } => {
            let (parent, key) = address(&store, key)?;
            let value: JsonValue = serde_json::from_str(value)?;
            let stored = store.node(parent)?.set(&key, value)?;
            Ok(format_value(stored.as_ref()))
        }
        Command::Delete { key } => {
            let (parent, key) = address(&store, key)?;
            store.node(parent)?.delete(&key)?;
            Ok(String::new())
        }
        Command::Tree { node } => {
            let node = match node {
                Some(dotted) => store.root_path().join(&relative_path(dotted)?),
                None => store.root_path().clone(),
            };
            let object = store.load(&node)?.map(Value::Object);
            Ok(format_value(object.as_ref()))
        }
        Command::Info => {
            let root = store.root();
            let mut info = serde_json::Map::new();
            for key in objfs::SPECIAL_PROPERTIES {
                let value = root.get(key)?.map(|v| v.to_json()).unwrap_or(JsonValue::Null);
                info.insert(key.to_string(), value);
            }
            Ok(serde_json::to_string_pretty(&JsonValue::Object(info))?)
        }
    }
}

fn relative_path(dotted: &str) -> Result<Path, CliError> {
    dotted
        .parse::<Path>()
        .map_err(|e| objfs::Error::from(e).into())
}

/// Split a dotted path relative to the root into the parent node's logical
/// path and the final key.
fn address(store: &Store, dotted: &str) -> Result<(Path, String), CliError> {
    let relative = relative_path(dotted)?;
    let (Some(parent), Some(key)) = (relative.parent(), relative.key()) else {
        return Err(objfs::Error::from(PathError::InvalidPath {
            message: "a key is required".to_string(),
        })
        .into());
    };

    Ok((store.root_path().join(&parent), key.to_string()))
}

fn format_value(value: Option<&Value>) -> String {
    match value {
        Some(value) => serde_json::to_string_pretty(&value.to_json())
            .unwrap_or_else(|_| value.to_json().to_string()),
        None => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    struct TestCli {
        // Having this as a member allows the directory to be cleaned up once the test store is
        // dropped.
        dir: tempfile::TempDir,
    }

    impl TestCli {
        fn new() -> Self {
            TestCli {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn run(&self, args: &[&str]) -> Result<String, CliError> {
            let base = self.dir.path().to_str().unwrap();
            let mut argv = vec!["objfs", "--path", base];
            argv.extend_from_slice(args);
            execute(&Cli::try_parse_from(argv).unwrap())
        }

        fn json(&self, args: &[&str]) -> JsonValue {
            serde_json::from_str(&self.run(args).unwrap()).unwrap()
        }
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from(["objfs", "--path", "/tmp/base", "get", "user.name"]).unwrap();
        assert_eq!(cli.path, Some(PathBuf::from("/tmp/base")));
        assert!(matches!(cli.command, Command::Get { ref key } if key == "user.name"));
    }

    #[test]
    fn set_then_get_works() {
        let t = TestCli::new();
        t.run(&["set", "user", r#"{"name": "Alice", "age": 30}"#])
            .unwrap();

        assert_eq!(t.json(&["get", "user.name"]), json!("Alice"));
        assert_eq!(t.json(&["get", "user"]), json!({ "name": "Alice", "age": 30 }));
        assert!(t.dir.path().join("obj/user/age.dat").is_file());
    }

    #[test]
    fn delete_works() {
        let t = TestCli::new();
        t.run(&["set", "n", "1"]).unwrap();
        t.run(&["delete", "n"]).unwrap();
        assert_eq!(t.json(&["get", "n"]), JsonValue::Null);
    }

    #[test]
    fn tree_works() {
        let t = TestCli::new();
        t.run(&["set", "a", r#"{"b": {"c": 1}}"#]).unwrap();
        t.run(&["set", "x", "true"]).unwrap();

        assert_eq!(t.json(&["tree"]), json!({ "a": { "b": { "c": 1 } }, "x": true }));
        assert_eq!(t.json(&["tree", "a.b"]), json!({ "c": 1 }));
        assert_eq!(t.json(&["tree", "missing"]), JsonValue::Null);
    }

    #[test]
    fn info_works() {
        let t = TestCli::new();
        let info = t.json(&["--name", "users", "--permissions", "ro", "info"]);
        assert_eq!(info["name"], json!("users"));
        assert_eq!(info["path"], json!("users"));
        assert_eq!(info["permissions"], json!("ro"));
        assert_eq!(info["encryption"], json!(false));
    }

    #[test]
    fn encryption_flags_work() {
        let t = TestCli::new();
        t.run(&["--algorithm", "aes256", "--key", "secret", "set", "n", "42"])
            .unwrap();

        let stored = std::fs::read_to_string(t.dir.path().join("obj/n.dat")).unwrap();
        assert_eq!(stored.split(':').count(), 3);
        assert_eq!(
            t.json(&["--algorithm", "aes256", "--key", "secret", "get", "n"]),
            json!(42)
        );
        assert_eq!(t.json(&["get", "n"]), JsonValue::Null);
    }

    #[test]
    fn algorithm_requires_key() {
        assert!(Cli::try_parse_from(["objfs", "--algorithm", "aes256", "info"]).is_err());
    }

    #[test]
    fn config_file_with_flag_override() {
        let t = TestCli::new();
        let config = t.dir.path().join("objfs.json");
        std::fs::write(&config, r#"{ "name": "users", "permissions": "ro" }"#).unwrap();

        let info = t.json(&[
            "--config",
            config.to_str().unwrap(),
            "--permissions",
            "rw",
            "info",
        ]);
        assert_eq!(info["name"], json!("users"));
        assert_eq!(info["permissions"], json!("rw"));
    }

    #[test]
    fn errors_surface() {
        let t = TestCli::new();
        assert!(matches!(t.run(&["get", ""]), Err(CliError::Store(_))));
        assert!(matches!(t.run(&["set", "n", "{oops"]), Err(CliError::Json(_))));
        assert!(matches!(
            t.run(&["--permissions", "x", "get", "n"]),
            Err(CliError::Store(objfs::Error::InvalidPermissions { .. }))
        ));
    }
}
