//! # chatbook CLI
//!
//! Command-line interface for the chatbook library.

use std::fs;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use chatbook::ChatbookError;
use chatbook::archive::read_archive;
use chatbook::cli::Args;
use chatbook::parser::TranscriptParser;
use chatbook::parsers::WhatsAppParser;
use chatbook::render::BookStats;
use chatbook::resolver::MediaResolver;

fn main() {
    let args = <Args as ClapParser>::parse();
    init_logging(&args);

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<(), ChatbookError> {
    let total_start = Instant::now();

    // Print header
    println!("📚 chatbook v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📦 Archive: {}", args.archive.display());
    println!("💾 Output:  {}", args.output.display());
    if let Some(ref settings) = args.settings {
        println!("🎨 Style:   {}", settings.display());
    }
    println!("👤 Primary: {}", args.primary);
    println!();

    // Settings first, so a bad color fails before any real work
    let settings = args.book_settings()?;

    // Step 1: Extract
    println!("⏳ Extracting archive...");
    let extract_start = Instant::now();
    let extracted = read_archive(&args.archive)?;
    println!(
        "   Transcript {} + {} media files ({:.2}s)",
        extracted.transcript_name,
        extracted.media.len(),
        extract_start.elapsed().as_secs_f64()
    );

    // Step 2: Parse
    let parser = WhatsAppParser::with_config(args.parser_config());
    println!("⏳ Parsing {}...", parser.name());
    let parse_start = Instant::now();
    let outcome = parser.parse_str(&extracted.transcript);
    println!(
        "   Found {} messages ({:.2}s)",
        outcome.messages.len(),
        parse_start.elapsed().as_secs_f64()
    );
    for warning in &outcome.warnings {
        println!("   ⚠️  {}", warning);
    }
    let warning_count = outcome.warnings.len();

    // Step 3: Resolve
    println!("🔗 Resolving media...");
    let resolve_start = Instant::now();
    let resolution = MediaResolver::with_config(args.resolver_config())
        .resolve_with_report(outcome.messages, &extracted.media);
    let report = resolution.report;
    let messages = resolution.messages;
    println!(
        "   {} images inlined, {} codes generated ({:.2}s)",
        report.resolved_images(),
        report.codes,
        resolve_start.elapsed().as_secs_f64()
    );

    // Step 4: Render
    println!("🖋️  Rendering book...");
    let render_start = Instant::now();
    let html = args.primary.renderer().render(&messages, &settings)?;
    fs::write(&args.output, &html)?;
    println!(
        "   {} KB written in {:.2}s",
        html.len() / 1024,
        render_start.elapsed().as_secs_f64()
    );

    if let Some(ref path) = args.messages_json {
        let json = serde_json::to_string_pretty(&messages)?;
        fs::write(path, json)?;
        println!("🗂️  Messages saved to {}", path.display());
    }

    let total_time = total_start.elapsed();

    println!();
    println!("✅ Done! Book saved to {}", args.output.display());

    // Summary
    let stats = BookStats::collect(&messages);
    println!();
    println!("📊 Summary:");
    println!("   Messages:  {}", stats.messages);
    println!("   Senders:   {}", stats.senders);
    println!(
        "   Media:     {} photos • {} videos • {} audios",
        stats.photos, stats.videos, stats.audios
    );
    println!(
        "   Photos:    {} inlined, {} unavailable",
        stats.inlined_photos,
        stats.missing_photos()
    );
    if warning_count > 0 {
        println!("   Warnings:  {} lines with invalid dates", warning_count);
    }

    // Performance stats
    println!();
    println!("⚡ Performance:");
    println!("   Total time:  {:.2}s", total_time.as_secs_f64());

    Ok(())
}
