//! Build script for rastrum-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates display.toml and turns it into `display_config.rs`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// RAM left for the framebuffer after stacks, executor and statics
const FRAMEBUFFER_RAM_BUDGET: usize = 248 * 1024;

fn main() {
    setup_linker();
    let display = validate_config();
    generate_display_config(&display);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// A display.toml that passed validation
struct Display {
    resolution: &'static str,
    packing: &'static str,
    width: usize,
    height: usize,
}

impl Display {
    /// `DisplayConfig` associated constant for this combination
    fn constant(&self) -> String {
        format!(
            "VGA_{}X{}_{}",
            self.width,
            self.height,
            self.packing.to_uppercase()
        )
    }

    fn word_type(&self) -> (&'static str, &'static str) {
        match self.packing {
            "wide" => ("u8", "AtomicU8"),
            _ => ("u32", "AtomicU32"),
        }
    }

    fn framebuffer_bytes(&self) -> usize {
        let pixels = self.width * self.height;
        match self.packing {
            "wide" => pixels,
            // five 6-bit pixels per 32-bit word
            _ => pixels.div_ceil(5) * 4,
        }
    }
}

/// Validate display.toml at compile time
fn validate_config() -> Display {
    println!("cargo:rerun-if-changed=display.toml");

    let config_path = Path::new("display.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: display.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a display.toml configuration file.        ║\n\
            ║  Please create one in the rastrum-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read display.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in display.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let display = validate_display(&config);
    println!(
        "cargo:warning=display.toml validated: {} {} ({} bytes of framebuffer)",
        display.resolution,
        display.packing,
        display.framebuffer_bytes()
    );
    display
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check the `[display]` section and collect every problem before failing
fn validate_display(config: &toml::Value) -> Display {
    let mut errors = Vec::new();

    let section = config.get("display");
    if section.is_none() {
        errors.push("Missing [display] section".to_string());
    }
    let field = |name: &str| section.and_then(|s| s.get(name)).and_then(|v| v.as_str());

    let resolution = match field("resolution") {
        Some("640x350") => Some(("640x350", 640, 350)),
        Some("640x480") => Some(("640x480", 640, 480)),
        Some(other) => {
            errors.push(format!(
                "display.resolution '{}' - must be \"640x350\" or \"640x480\"",
                other
            ));
            None
        }
        None => {
            errors.push("display.resolution missing or not a string".to_string());
            None
        }
    };

    let packing = match field("packing") {
        Some("wide") => Some("wide"),
        Some("dense") => Some("dense"),
        Some(other) => {
            errors.push(format!(
                "display.packing '{}' - must be \"wide\" or \"dense\"",
                other
            ));
            None
        }
        None => {
            errors.push("display.packing missing or not a string".to_string());
            None
        }
    };

    let display = match (resolution, packing) {
        (Some((resolution, width, height)), Some(packing)) => {
            let display = Display {
                resolution,
                packing,
                width,
                height,
            };
            let bytes = display.framebuffer_bytes();
            if bytes > FRAMEBUFFER_RAM_BUDGET {
                errors.push(format!(
                    "{} {} needs {} bytes of RAM, budget is {}",
                    resolution, packing, bytes, FRAMEBUFFER_RAM_BUDGET
                ));
            }
            Some(display)
        }
        _ => None,
    };

    match display {
        Some(display) if errors.is_empty() => display,
        _ => panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid display configuration                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        ),
    }
}

/// Write `display_config.rs` for `include!` from main.rs
fn generate_display_config(display: &Display) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let (word, cell) = display.word_type();

    let source = format!(
        "// Generated by build.rs from display.toml\n\
         \n\
         /// Display configuration selected in display.toml\n\
         pub const DISPLAY: rastrum_core::config::DisplayConfig =\n\
         \x20   rastrum_core::config::DisplayConfig::{constant};\n\
         \n\
         /// Framebuffer storage word\n\
         pub type FrameWord = {word};\n\
         \n\
         /// Atomic cell backing one [`FrameWord`]\n\
         pub type FrameCell = core::sync::atomic::{cell};\n\
         \n\
         /// Length of the framebuffer in words\n\
         pub const WORDS_PER_FRAME: usize =\n\
         \x20   DISPLAY.words_per_frame(<FrameWord as rastrum_core::framebuffer::StorageWord>::BITS);\n",
        constant = display.constant(),
        word = word,
        cell = cell,
    );

    fs::write(out_dir.join("display_config.rs"), source).unwrap();
}
