//! forge-tsd: generate a `.d.ts` file from `jsdoc -X` output
//!
//! ```text
//! jsdoc -X -c conf.json src/ > doclets.json
//! forge-tsd doclets.json -c conf.json -o types --public-types types/public.json
//! ```
//!
//! # Environment Variables
//!
//! - `FORGE_TSD_LOG` - Log level (default: "info")

use anyhow::{bail, Context, Result};
use forge_tsd::{Doclet, DtsGenerator, TsdConfig};
use std::env;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "\
Usage: forge-tsd [OPTIONS] <DOCLETS>

Arguments:
  <DOCLETS>                 JSON doclet array printed by `jsdoc -X` (`-` reads stdin)

Options:
  -c, --config <FILE>       Config file (.toml, or JSON with an optional \"typescript\" section)
  -o, --out-dir <DIR>       Output directory (overrides outDir)
  -r, --root <NAME>         Root module name (overrides rootModuleName)
      --public-types <FILE> Also write the public type set as JSON
      --deny-warnings       Exit with an error if generation produced warnings
  -h, --help                Print this help";

fn main() -> ExitCode {
    // Use FORGE_TSD_LOG env var for log level configuration, default to "info"
    use tracing_subscriber::EnvFilter;
    let filter =
        EnvFilter::try_from_env("FORGE_TSD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Run the generator with the given arguments
fn run(args: &[String]) -> Result<()> {
    let Some(cmd) = GenerateCommand::parse(args)? else {
        println!("{}", USAGE);
        return Ok(());
    };

    let config = cmd.load_config()?;
    let doclets = cmd.read_doclets()?;
    tracing::info!(count = doclets.len(), "read doclets");

    let mut generator = DtsGenerator::new(config.clone());
    generator.add_doclets(doclets);
    let output = generator.generate();

    let path = output.write(&config).with_context(|| {
        format!(
            "Failed to write declarations to {}",
            config.output_path().display()
        )
    })?;
    println!("Generated {}", path.display());

    if let Some(ref dump) = cmd.public_types {
        output
            .write_public_types(dump)
            .with_context(|| format!("Failed to write public types to {}", dump.display()))?;
    }

    if cmd.deny_warnings && output.stats.warnings > 0 {
        for diagnostic in &output.diagnostics {
            eprintln!("{}", diagnostic.format());
        }
        bail!("generation produced {} warning(s)", output.stats.warnings);
    }

    Ok(())
}

/// Generate command configuration
#[derive(Debug, PartialEq)]
struct GenerateCommand {
    /// Doclet JSON file, `-` for stdin
    doclets: PathBuf,
    /// Config file
    config: Option<PathBuf>,
    /// Output directory override
    out_dir: Option<PathBuf>,
    /// Root module name override
    root: Option<String>,
    /// Public types dump path
    public_types: Option<PathBuf>,
    /// Fail on warnings
    deny_warnings: bool,
}

impl GenerateCommand {
    /// Parse arguments; `None` means help was requested
    fn parse(args: &[String]) -> Result<Option<Self>> {
        let mut doclets = None;
        let mut config = None;
        let mut out_dir = None;
        let mut root = None;
        let mut public_types = None;
        let mut deny_warnings = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--help" | "-h" => return Ok(None),
                "--config" | "-c" => {
                    config = Some(PathBuf::from(value(args, i, "--config requires a file")?));
                    i += 2;
                }
                "--out-dir" | "-o" => {
                    let dir = value(args, i, "--out-dir requires a directory")?;
                    out_dir = Some(PathBuf::from(dir));
                    i += 2;
                }
                "--root" | "-r" => {
                    root = Some(value(args, i, "--root requires a name")?.to_string());
                    i += 2;
                }
                "--public-types" => {
                    let file = value(args, i, "--public-types requires a file")?;
                    public_types = Some(PathBuf::from(file));
                    i += 2;
                }
                "--deny-warnings" => {
                    deny_warnings = true;
                    i += 1;
                }
                arg if arg == "-" || !arg.starts_with('-') => {
                    if doclets.is_some() {
                        bail!("Unexpected argument: {}", arg);
                    }
                    doclets = Some(PathBuf::from(arg));
                    i += 1;
                }
                _ => {
                    bail!("Unknown flag: {}\n\n{}", args[i], USAGE);
                }
            }
        }

        let Some(doclets) = doclets else {
            bail!("Missing doclet file\n\n{}", USAGE);
        };

        Ok(Some(Self {
            doclets,
            config,
            out_dir,
            root,
            public_types,
            deny_warnings,
        }))
    }

    /// Config file (or defaults) with command line overrides applied
    fn load_config(&self) -> Result<TsdConfig> {
        let mut config = match &self.config {
            Some(path) => TsdConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => TsdConfig::default(),
        };
        if let Some(ref dir) = self.out_dir {
            config.out_dir = dir.clone();
        }
        if let Some(ref root) = self.root {
            config.root_module_name = root.clone();
        }
        config.validate()?;
        Ok(config)
    }

    fn read_doclets(&self) -> Result<Vec<Doclet>> {
        let text = if self.doclets.as_os_str() == "-" {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read doclets from stdin")?;
            text
        } else {
            fs::read_to_string(&self.doclets)
                .with_context(|| format!("Failed to read {}", self.doclets.display()))?
        };
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid doclet JSON in {}", self.doclets.display()))
    }
}

/// Value following the flag at `i`
fn value<'a>(args: &'a [String], i: usize, message: &str) -> Result<&'a str> {
    match args.get(i + 1) {
        Some(value) => Ok(value),
        None => bail!("{}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flags() {
        let cmd = GenerateCommand::parse(&args(&[
            "doclets.json",
            "-c",
            "conf.json",
            "--out-dir",
            "types",
            "--public-types",
            "public.json",
            "--deny-warnings",
        ]))
        .unwrap()
        .unwrap();

        assert_eq!(cmd.doclets, PathBuf::from("doclets.json"));
        assert_eq!(cmd.config, Some(PathBuf::from("conf.json")));
        assert_eq!(cmd.out_dir, Some(PathBuf::from("types")));
        assert_eq!(cmd.public_types, Some(PathBuf::from("public.json")));
        assert!(cmd.deny_warnings);
    }

    #[test]
    fn test_parse_errors() {
        assert!(GenerateCommand::parse(&args(&[])).is_err());
        assert!(GenerateCommand::parse(&args(&["a.json", "--config"])).is_err());
        assert!(GenerateCommand::parse(&args(&["a.json", "--bogus"])).is_err());
        assert!(GenerateCommand::parse(&args(&["a.json", "b.json"])).is_err());
        assert!(GenerateCommand::parse(&args(&["--help"])).unwrap().is_none());
    }

    #[test]
    fn test_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let doclets = dir.path().join("doclets.json");
        fs::write(
            &doclets,
            r#"[
                {"name": "ol", "longname": "ol", "kind": "namespace"},
                {"name": "Map", "longname": "ol.Map", "kind": "class", "memberof": "ol",
                 "tags": [{"originalTitle": "api", "title": "api", "text": ""}],
                 "params": [{"type": {"names": ["olx.MapOptions"]}, "name": "options"}]},
                {"name": "MapOptions", "longname": "olx.MapOptions", "kind": "typedef", "memberof": "olx",
                 "type": {"names": ["Object"]},
                 "properties": [{"type": {"names": ["number"]}, "name": "zoom", "optional": true}]},
                {"kind": "package", "longname": "package:undefined", "files": ["/src/ol/Map.js"]}
            ]"#,
        )
        .unwrap();
        let config = dir.path().join("conf.json");
        fs::write(
            &config,
            r#"{"typescript": {"rootModuleName": "ol", "publicAnnotation": "api"}}"#,
        )
        .unwrap();
        let out_dir = dir.path().join("out");
        let dump = out_dir.join("public.json");

        run(&args(&[
            doclets.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
            "-o",
            out_dir.to_str().unwrap(),
            "--public-types",
            dump.to_str().unwrap(),
        ]))
        .unwrap();

        let dts = fs::read_to_string(out_dir.join("ol.d.ts")).unwrap();
        assert!(dts.contains("declare module ol {"));
        assert!(dts.contains("constructor(options: olx.MapOptions);"));
        assert!(dts.contains("declare module olx {"));
        assert!(dts.contains("zoom?: number;"));

        let public: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dump).unwrap()).unwrap();
        assert_eq!(public.as_array().map(Vec::len), Some(2));
    }
}
