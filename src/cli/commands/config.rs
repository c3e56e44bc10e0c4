//! Show effective configuration.

use console::style;

use crate::config::Settings;

pub fn cmd_config(settings: &Settings) -> anyhow::Result<()> {
    println!("\n{}", style("storyreplies Configuration").bold());
    println!("{}", "-".repeat(50));
    println!(
        "{:<28} {}",
        "Config file:",
        settings
            .source_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(defaults)".to_string())
    );
    println!("{:<28} {}", "Top answers limit:", settings.top_answers_limit);
    println!(
        "{:<28} {}",
        "Low confidence threshold:", settings.low_confidence_threshold
    );
    println!("{:<28} {}", "Max text characters:", settings.max_text_chars);
    println!("{:<28} {}", "Batch concurrency:", settings.batch_concurrency);

    Ok(())
}
