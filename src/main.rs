use anyhow::Result;
use clap::{ArgGroup, Parser};
use message_snitch::{AnalysisRequest, AnalysisResult, Analyzer, Error};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "message-snitch")]
#[command(about = "Find out who was wrong, who gave unsolicited advice, and who was rude")]
#[command(group(ArgGroup::new("input").required(true).args(["text", "text_file", "image"])))]
struct CliArgs {
    /// Conversation text to analyze.
    #[arg(long)]
    text: Option<String>,

    /// Read the conversation text from a file.
    #[arg(long, value_name = "PATH")]
    text_file: Option<PathBuf>,

    /// Screenshot of the conversation.
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// MIME type of the screenshot. Detected from the file when omitted.
    #[arg(long, requires = "image")]
    mime: Option<String>,

    /// Print the raw JSON verdict instead of a report.
    #[arg(long)]
    json: bool,
}

fn read_input(path: &Path) -> message_snitch::Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| Error::Input(format!("Failed to read {}: {}", path.display(), e)))
}

fn read_request(args: &CliArgs) -> message_snitch::Result<AnalysisRequest> {
    if let Some(text) = &args.text {
        AnalysisRequest::text(text.as_str())
    } else if let Some(path) = &args.text_file {
        let text = String::from_utf8(read_input(path)?).map_err(|_| {
            Error::Input(format!("{} is not valid UTF-8 text", path.display()))
        })?;
        AnalysisRequest::text(text)
    } else if let Some(path) = &args.image {
        AnalysisRequest::image(read_input(path)?, args.mime.as_deref())
    } else {
        Err(Error::Input("Provide --text, --text-file or --image".to_string()))
    }
}

async fn run(args: &CliArgs) -> message_snitch::Result<AnalysisResult> {
    let request = read_request(args)?;
    Analyzer::from_env()?.analyze(request).await
}

fn render_report(result: &AnalysisResult) -> String {
    let section = |title: &str, names: &[String]| {
        let body = if names.is_empty() {
            "  No one".to_string()
        } else {
            names
                .iter()
                .map(|name| format!("  • {}", name))
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!("{}\n{}", title, body)
    };

    let mut report = vec![format!("Summary\n  {}", result.summary)];
    report.push(section("Who was wrong", &result.wrong));
    report.push(section("Unsolicited advice", &result.unsolicited_advice));
    report.push(section("Who was rude", &result.rude));
    if result.is_clean() {
        report.push("Everyone behaved.".to_string());
    }
    report.join("\n\n")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "message_snitch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    match run(&args).await {
        Ok(result) => {
            info!("Analysis finished");
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", render_report(&result));
            }
            Ok(())
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("{}", e.diagnostic());
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("message-snitch").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_requires_exactly_one_input() {
        assert!(CliArgs::try_parse_from(["message-snitch"]).is_err());
        assert!(
            CliArgs::try_parse_from(["message-snitch", "--text", "a", "--image", "b.png"]).is_err()
        );
        assert!(CliArgs::try_parse_from(["message-snitch", "--text", "a", "--mime", "image/png"])
            .is_err());
    }

    #[test]
    fn test_read_request_from_text_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Alex: it's tuesday\nJo: no, wednesday").unwrap();

        let path = file.path().to_string_lossy().to_string();
        let request = read_request(&args(&["--text-file", &path])).unwrap();
        assert_eq!(
            request,
            AnalysisRequest::Text {
                content: "Alex: it's tuesday\nJo: no, wednesday".to_string()
            }
        );
    }

    #[test]
    fn test_read_request_from_image_sniffs_mime() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]).unwrap();

        let path = file.path().to_string_lossy().to_string();
        let request = read_request(&args(&["--image", &path])).unwrap();
        assert!(
            matches!(request, AnalysisRequest::Image { ref mime_type, .. } if mime_type == "image/jpeg")
        );
    }

    #[test]
    fn test_blank_text_is_input_error() {
        let err = read_request(&args(&["--text", "   "])).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
        assert_eq!(err.diagnostic(), "Please paste or type the conversation text");
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("chat.txt");
        let path = missing.to_string_lossy().to_string();

        let err = read_request(&args(&["--text-file", &path])).unwrap_err();
        assert!(
            matches!(err, Error::Input(ref message) if message.starts_with(&format!("Failed to read {}", path)))
        );
    }

    #[test]
    fn test_non_image_file_is_input_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.7 hello").unwrap();

        let path = file.path().to_string_lossy().to_string();
        let err = read_request(&args(&["--image", &path])).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }

    #[test]
    fn test_render_report() {
        let report = render_report(&AnalysisResult {
            wrong: vec!["Alex".to_string()],
            unsolicited_advice: vec![],
            rude: vec!["Jo".to_string(), "Kim".to_string()],
            summary: "Alex mixed up the days.".to_string(),
        });

        assert!(report.starts_with("Summary\n  Alex mixed up the days."));
        assert!(report.contains("Who was wrong\n  • Alex"));
        assert!(report.contains("Unsolicited advice\n  No one"));
        assert!(report.contains("Who was rude\n  • Jo\n  • Kim"));
        assert!(!report.contains("Everyone behaved."));
    }
}
