use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "titanic-agent", about = "Ask questions about the Titanic dataset", version)]
pub struct Cli {
    /// The question to answer (e.g. "What percentage of passengers were male?").
    #[arg(value_name = "QUESTION")]
    pub question: Option<String>,

    /// Path to the Titanic CSV (overrides DATA_PATH).
    #[arg(long)]
    pub data: Option<String>,

    /// Directory for generated chart images (overrides PLOT_DIR).
    #[arg(long = "plot-dir")]
    pub plot_dir: Option<String>,

    /// Extra model to try before the built-in cascade.
    #[arg(long)]
    pub model: Option<String>,

    /// Print the first rows of the dataset and exit.
    #[arg(long)]
    pub preview: bool,
}
