//! Config command handler

use syllabus_core::config::Config;

/// Show the effective configuration
pub fn show_config(config: &Config) -> bool {
    println!("Syllabus Configuration");
    println!("======================");
    println!("Courses directory: {}", config.courses_dir.display());
    println!("Data directory: {}", config.data_dir().display());
    println!("Auto-expand on select: {}", config.auto_expand_on_select);
    println!("Remember position: {}", config.persist_position);
    match Config::config_path() {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!("Config file: {} (not created yet, run 'syllabus init')", path.display()),
        None => println!("Config file: (no config directory on this platform)"),
    }
    true
}
