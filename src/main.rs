use anyhow::Result;

fn main() -> Result<()> {
    copilot_history_explorer::cli::run()
}
