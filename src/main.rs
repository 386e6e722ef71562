use clap::Parser;
use partnum_common::PointerEvent;
use partnum_rust::{capture, cli, config, interactive, pipeline, recognizer};
use cli::{Cli, Commands, DragArg, RectArg};
use config::Config;
use pipeline::Pipeline;
use recognizer::{RecognitionMode, TesseractCli};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG があればそちらを優先
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = Config::load()?;

    match cli.command {
        Commands::Ocr { image, rect, drag, advanced, json } => {
            let engine = TesseractCli::new(config.tesseract_cmd());
            let mut pipeline = Pipeline::from_config(engine, &config)?;
            pipeline.capture_file(&image)?;

            let stroke = match (rect, drag) {
                (Some(RectArg(r)), _) => Some(cli::rect_stroke(r)),
                (None, Some(DragArg { from, to })) => Some((from, to)),
                (None, None) => None,
            };
            if let Some((from, to)) = stroke {
                pipeline.pointer(PointerEvent::Down(from));
                pipeline.pointer(PointerEvent::Move(to));
                pipeline.pointer(PointerEvent::Up);
            }

            let mode = if advanced {
                RecognitionMode::Advanced
            } else {
                RecognitionMode::Standard
            };
            let text = pipeline.recognize(mode).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&text)?);
            } else {
                if let Some(rect) = pipeline.session().selection() {
                    println!("범위: {}", rect);
                }
                for (i, line) in text.lines.iter().enumerate() {
                    println!("{:>2}: {}", i + 1, line);
                }
                let candidates = pipeline.candidates();
                if !candidates.is_empty() {
                    println!("품번 후보: {}", candidates.join(", "));
                }
                if let Some(message) = pipeline.session().message() {
                    println!("⚠ {}", message);
                }
            }
        }

        Commands::Scan { images, gallery, output } => {
            println!("📷 partnum - 품번 스캔\n");
            let engine = TesseractCli::new(config.tesseract_cmd());
            let mut pipeline = Pipeline::from_config(engine, &config)?;
            let output = output
                .or_else(|| config.export_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));

            interactive::run_interactive_session(
                &mut pipeline,
                &images,
                gallery.as_deref(),
                &output,
            )
            .await?;
        }

        Commands::Gallery { folder } => {
            let entries = capture::scan_gallery(&folder)?;
            println!("🖼  {}장\n", entries.len());
            for (i, entry) in entries.iter().enumerate() {
                println!(
                    "[{}] {} {}",
                    i,
                    entry.file_name,
                    entry.date.as_deref().unwrap_or("-")
                );
            }
        }

        Commands::Config { set_tesseract, set_language, show } => {
            if let Some(cmd) = set_tesseract {
                config.set_tesseract_cmd(cmd)?;
                println!("✔ tesseract 명령을 설정했습니다");
            }
            if let Some(language) = set_language {
                config.set_language(language)?;
                println!("✔ 인식 언어를 설정했습니다");
            }
            if show {
                let engine = TesseractCli::new(config.tesseract_cmd());
                println!("설정: {}", Config::config_path()?.display());
                println!("  tesseract: {}", engine.command());
                match engine.version().await {
                    Ok(version) if !version.is_empty() => println!("  버전: {}", version),
                    _ => println!("  버전: (찾을 수 없음)"),
                }
                println!("  언어: {}", config.language);
                println!("  단위: {}", config.default_units.join(", "));
                println!("  최소 신뢰도: {}", config.min_confidence);
                if let Some(dir) = &config.export_dir {
                    println!("  저장 폴더: {}", dir.display());
                }
            }
        }
    }

    Ok(())
}
