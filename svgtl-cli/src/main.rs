//! svgtl CLI entry point: config file in, SVG document out

use std::{fs, path::PathBuf, process};

use clap::Parser;
use log::{debug, error, info};
use svgtl_core::{generate, parse_config, GenerateError, ParseError};

/// Generate an SVG timeline from a config file
#[derive(Debug, Parser)]
#[command(name = "svgtl", version, about)]
struct Args {
    /// Input config file
    #[arg(short, long)]
    input: PathBuf,

    /// External CSS file replacing the embedded default stylesheet
    #[arg(short, long)]
    style: Option<PathBuf>,

    /// Output SVG file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    debug!(input = args.input.display().to_string(); "starting svgtl");

    if let Err(err) = run(&args) {
        error!("{err}");
        eprintln!("svgtl: {err}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let input = fs::read_to_string(&args.input).map_err(|source| CliError::Read {
        path: args.input.clone(),
        source,
    })?;

    let (timeline, mut config) = parse_config(&input)?;

    if let Some(path) = &args.style {
        config.style = fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?;
    }

    let svg = generate(&timeline, &config)?;

    match &args.output {
        Some(path) => {
            fs::write(path, &svg).map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            info!(path = path.display().to_string(); "timeline written");
        }
        None => println!("{svg}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const SAMPLE: &str = "\
@timeline
id=demo
@row 30 5
@task
text=fetch
duration=1.5s
";

    #[test]
    fn test_run_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("timeline.cfg");
        let output = dir.path().join("timeline.svg");
        fs::write(&input, SAMPLE).unwrap();

        let args = Args {
            input: input.clone(),
            style: None,
            output: Some(output.clone()),
        };
        run(&args).unwrap();

        let svg = fs::read_to_string(&output).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("fetch"));
    }

    #[test]
    fn test_external_stylesheet_replaces_default() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("timeline.cfg");
        let style = dir.path().join("style.css");
        let output = dir.path().join("timeline.svg");
        fs::write(&input, SAMPLE).unwrap();

        let mut css = fs::File::create(&style).unwrap();
        writeln!(css, ".tl-event rect {{ fill: tomato; }}").unwrap();

        let args = Args {
            input,
            style: Some(style),
            output: Some(output.clone()),
        };
        run(&args).unwrap();

        let svg = fs::read_to_string(&output).unwrap();
        assert!(svg.contains("tomato"));
        assert!(!svg.contains("#7aa2d4"));
    }

    #[test]
    fn test_parse_failure_surfaces_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.cfg");
        fs::write(&input, "@timeline\nwidth=wide\n").unwrap();

        let args = Args {
            input,
            style: None,
            output: None,
        };
        let err = run(&args).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_missing_input_file() {
        let args = Args {
            input: PathBuf::from("/nonexistent/timeline.cfg"),
            style: None,
            output: None,
        };
        let err = run(&args).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
