use std::process::ExitCode;

use storyspin::engine::pipeline::{load_source, StoryError};
use storyspin::render::layout::TextMeasurer;
use storyspin::{storyspin, Environment, ImpressPage, Options};

const USAGE: &str = "\
usage: storyspin <INPUT> [options]

INPUT is a markdown file (.md), an HTML page holding the story in its root
element, or an http(s) URL to either.

options:
  -o, --output FILE      write the presentation here instead of stdout
      --options FILE     JSON options (rootId, squareSideLen, squareFittingLens, stepFont)
      --user-agent UA    user agent of the target device
      --script SRC       impress.js script location
      --geometry         print the showcase geometry as JSON instead of HTML
  -h, --help             show this help";

#[derive(Debug, Default)]
struct Args {
    input: String,
    output: Option<String>,
    options: Option<String>,
    user_agent: Option<String>,
    script: Option<String>,
    geometry: bool,
}

fn usage_error(message: impl Into<String>) -> StoryError {
    StoryError {
        message: message.into(),
        phase: "args",
    }
}

/// Parse command-line arguments. `Ok(None)` means help was requested.
fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Option<Args>, StoryError> {
    let mut args = Args::default();
    let mut input = None;

    while let Some(arg) = argv.next() {
        let mut value = |flag: &str| {
            argv.next()
                .ok_or_else(|| usage_error(format!("{} needs a value", flag)))
        };
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-o" | "--output" => args.output = Some(value(&arg)?),
            "--options" => args.options = Some(value(&arg)?),
            "--user-agent" => args.user_agent = Some(value(&arg)?),
            "--script" => args.script = Some(value(&arg)?),
            "--geometry" => args.geometry = true,
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(usage_error(format!("unknown option {}", flag)))
            }
            _ if input.is_none() => input = Some(arg.clone()),
            _ => return Err(usage_error(format!("unexpected argument {}", arg))),
        }
    }

    args.input = input.ok_or_else(|| usage_error("missing INPUT"))?;
    Ok(Some(args))
}

fn load_options(args: &Args) -> Result<Options, StoryError> {
    let mut options = match args.options {
        Some(ref path) => {
            let json = std::fs::read_to_string(path).map_err(|e| StoryError {
                message: format!("{}: {}", path, e),
                phase: "options",
            })?;
            Options::from_json(&json).map_err(|e| StoryError {
                message: format!("{}: {}", path, e),
                phase: "options",
            })?
        }
        None => Options::default(),
    };
    if let Some(ref src) = args.script {
        options = options.with_impress_script(src.clone());
    }
    Ok(options.normalized())
}

fn run(args: Args) -> Result<(), StoryError> {
    let options = load_options(&args)?;
    let document = load_source(&args.input, &options.root_id)?;

    let mut env = Environment::headless();
    if let Some(ref ua) = args.user_agent {
        env = env.with_user_agent(ua.clone());
    }

    let script = options.impress_script.clone();
    let launch = storyspin(document, options, env).init(&mut TextMeasurer::default());
    log::info!("{} showcases", launch.geometry().len());

    let rendered = if args.geometry {
        serde_json::to_string_pretty(launch.geometry()).map_err(|e| StoryError {
            message: e.to_string(),
            phase: "write",
        })? + "\n"
    } else {
        let fallback = launch.document().to_html();
        launch
            .impress(&mut ImpressPage::new(script))
            .unwrap_or(fallback)
    };

    match args.output {
        Some(ref path) => std::fs::write(path, rendered).map_err(|e| StoryError {
            message: format!("{}: {}", path, e),
            phase: "write",
        }),
        None => {
            print!("{}", rendered);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("storyspin: {}\n\n{}", e, USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("storyspin: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> impl Iterator<Item = String> {
        args.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_flags() {
        let args = parse_args(argv(&["story.md", "-o", "out.html", "--geometry", "--user-agent", "x"]))
            .unwrap()
            .unwrap();
        assert_eq!(args.input, "story.md");
        assert_eq!(args.output.as_deref(), Some("out.html"));
        assert_eq!(args.user_agent.as_deref(), Some("x"));
        assert!(args.geometry);
    }

    #[test]
    fn help_and_errors() {
        assert!(parse_args(argv(&["--help"])).unwrap().is_none());
        assert_eq!(parse_args(argv(&[])).unwrap_err().phase, "args");
        assert!(parse_args(argv(&["a.md", "--bogus"])).is_err());
        assert!(parse_args(argv(&["a.md", "-o"])).is_err());
        assert!(parse_args(argv(&["a.md", "b.md"])).is_err());
    }
}
