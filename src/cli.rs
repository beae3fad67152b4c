//! CLI argument parsing with clap.

use clap::Parser;

/// Generate four images from a prompt with Google ImageFX.
#[derive(Parser, Debug)]
#[command(name = "imagefx", version, about)]
pub struct Cli {
    /// Text prompt describing the desired image.
    #[arg(conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Path to a file containing the prompt text.
    #[arg(short = 'p', long, conflicts_with = "prompt")]
    pub prompt_file: Option<String>,

    /// Seed; -1 or 0 lets the server pick.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub seed: i64,

    /// Aspect ratio: LANDSCAPE, PORTRAIT, SQUARE, LANDSCAPE_FOUR_THREE,
    /// PORTRAIT_THREE_FOUR (or 16:9, 9:16, 1:1, 4:3, 3:4).
    #[arg(short, long)]
    pub aspect_ratio: Option<String>,

    /// Model name or alias (IMAGEN_3_1, imagen-3.1).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Number of candidates to request (1-10); at most four are returned.
    #[arg(short = 'n', long)]
    pub count: Option<u32>,

    /// Directory for the saved PNG files.
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Token file, replacing `ifx_config.auth` next to the executable.
    #[arg(long)]
    pub token_file: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the step-by-step log.
    #[arg(short, long)]
    pub debug: bool,
}

impl Cli {
    /// Resolve the prompt from either the positional argument or the file flag.
    ///
    /// # Errors
    ///
    /// Returns an error if neither is provided, the file cannot be read, or
    /// the prompt is blank.
    pub fn resolve_prompt(&self) -> Result<String, std::io::Error> {
        let prompt = if let Some(ref text) = self.prompt {
            text.clone()
        } else if let Some(ref path) = self.prompt_file {
            std::fs::read_to_string(path)?
        } else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Provide a prompt string or use -p/--prompt-file",
            ));
        };
        if prompt.trim().is_empty() {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "Prompt is empty"));
        }
        Ok(prompt.trim().to_string())
    }
}
