use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tempfile::Builder;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use xjconv::{convert, validate, Direction};

const USAGE: &str = "Input two files in the format <input-file> <output-file>";

#[derive(Debug, Parser)]
#[command(
    name = "xjconv",
    version,
    about = "Convert AddressBook XML to JSON and JSON to XML"
)]
struct Args {
    /// File to convert; a `.xml` suffix selects XML input, anything else is read as JSON
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// File to write the converted document to
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            debug!(%err, "invalid arguments");
            println!("{USAGE}");
            return Ok(());
        }
    };

    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let input = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read input file {}", args.input.display()))?;

    let direction = Direction::from_path(&args.input);
    info!(input = %args.input.display(), ?direction, "converting");

    if direction == Direction::XmlToJson {
        let validation = validate(&input);
        println!("{}", validation.message());
        if !validation.is_valid() {
            println!("Not a valid xml schema");
            return Ok(());
        }
    }

    let output = convert(&input, direction)
        .with_context(|| format!("failed to convert {}", args.input.display()))?;
    write_output(&args.output, &output)?;

    println!(
        "Conversion completed successfully. File saved at {}",
        args.output.display()
    );
    Ok(())
}

/// Write through a temporary file in the destination directory, then move it into place.
/// A new file gets the usual umask-derived mode; a replaced file keeps its mode.
fn write_output(path: &Path, data: &str) -> Result<()> {
    let dir = output_dir(path);
    let existing = fs::metadata(path).ok().map(|meta| meta.permissions());

    let mut builder = Builder::new();
    default_permissions(&mut builder);
    let mut file = builder
        .tempfile_in(dir)
        .with_context(|| format!("failed to create a temporary file in {}", dir.display()))?;
    file.write_all(data.as_bytes())
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    if let Some(perms) = existing {
        file.as_file()
            .set_permissions(perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }
    file.persist(path)
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    Ok(())
}

#[cfg(unix)]
fn default_permissions(builder: &mut Builder<'_, '_>) {
    use std::os::unix::fs::PermissionsExt;
    // the umask is applied on creation, as for fs::write
    builder.permissions(fs::Permissions::from_mode(0o666));
}

#[cfg(not(unix))]
fn default_permissions(_builder: &mut Builder<'_, '_>) {}

fn output_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir_defaults_to_current() {
        assert_eq!(output_dir(Path::new("out.json")), Path::new("."));
        assert_eq!(output_dir(Path::new("dir/out.json")), Path::new("dir"));
    }

    #[test]
    fn test_write_output_replaces_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.xml");
        fs::write(&path, "stale contents that are longer")?;

        write_output(&path, "<a>1</a>\n")?;
        assert_eq!(fs::read_to_string(&path)?, "<a>1</a>\n");
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_new_output_gets_default_mode() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let reference = dir.path().join("reference.json");
        fs::write(&reference, "{}")?;
        let path = dir.path().join("out.json");

        write_output(&path, "{}")?;
        let mode = fs::metadata(&path)?.permissions().mode() & 0o777;
        assert_eq!(mode, fs::metadata(&reference)?.permissions().mode() & 0o777);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_replaced_output_keeps_mode() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.xml");
        fs::write(&path, "old")?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640))?;

        write_output(&path, "<a/>\n")?;
        assert_eq!(fs::metadata(&path)?.permissions().mode() & 0o777, 0o640);
        assert_eq!(fs::read_to_string(&path)?, "<a/>\n");
        Ok(())
    }
}
