//! UI helpers for the kubenap CLI.
//!
//! Provides consistent formatting for console output during cluster
//! lifecycle operations.

use colored::Colorize;

/// Print the kubenap banner.
pub fn print_banner() {
    println!();
    println!(
        "{}",
        r"
  _          _
 | | ___   _| |__   ___ _ __   __ _ _ __
 | |/ / | | | '_ \ / _ \ '_ \ / _` | '_ \
 |   <| |_| | |_) |  __/ | | | (_| | |_) |
 |_|\_\\__,_|_.__/ \___|_| |_|\__,_| .__/
                                   |_|
"
        .cyan()
    );
    println!("  {}", "Local Kubernetes Cluster Lifecycle".bright_black());
    println!();
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", "═".repeat(70).bright_black());
    println!("{}", title.cyan().bold());
    println!("{}", "═".repeat(70).bright_black());
    println!();
}

/// Print a step indicator with message.
pub fn print_step(message: &str) {
    println!("{} {}", "▶".cyan(), message.bold());
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Print an error message.
pub fn print_error(message: &str) {
    println!("{} {}", "✗".red().bold(), message.red());
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print prerequisite check result.
pub fn print_check_result(name: &str, passed: bool, message: Option<&str>) {
    let status = if passed { "✓".green() } else { "✗".red() };

    let text = if let Some(msg) = message {
        format!("{name} - {msg}")
    } else {
        name.to_string()
    };

    println!("  {status} {text}");
}

/// Print a key-value pair.
pub fn print_kv(key: &str, value: &str) {
    println!("  {} {}", format!("{key}:").bright_black(), value.green());
}

/// Print a list item.
pub fn print_list_item(item: &str) {
    println!("  {} {item}", "•".bright_black());
}

/// Print rollout wait progress.
pub fn print_wait_progress(ready: usize, total: usize) {
    let pct = if total > 0 { (ready * 100) / total } else { 0 };

    let bar_width = 30;
    let filled = (pct * bar_width) / 100;
    let empty = bar_width - filled;

    let bar = format!(
        "{}{}",
        "█".repeat(filled).green(),
        "░".repeat(empty).bright_black()
    );

    print!("\r  {} workloads: [{}] {}/{} ready", "⟳".cyan(), bar, ready, total);

    use std::io::Write;
    let _ = std::io::stdout().flush();

    if ready == total && total > 0 {
        println!();
    }
}
